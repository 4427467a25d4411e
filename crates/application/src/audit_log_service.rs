use std::sync::Arc;

use shopfront_core::{AppResult, Subject};
use shopfront_domain::{Action, ResourceKind, check_permission};

use crate::{AuditLogFilter, AuditRecord, AuditStore, Pagination};

/// Read side of the audit trail.
///
/// Administrators see every record; other subjects only ever see their own
/// actions, whatever filter they pass in.
pub struct AuditLogService {
    store: Arc<dyn AuditStore>,
}

impl AuditLogService {
    /// Creates a service over the shared audit store.
    #[must_use]
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Lists audit records visible to the subject with a total count.
    pub async fn list(
        &self,
        subject: &Subject,
        mut filter: AuditLogFilter,
        pagination: Pagination,
    ) -> AppResult<(u64, Vec<AuditRecord>)> {
        check_permission(Some(subject), ResourceKind::AuditLog, Action::Read)?;

        if !subject.is_superuser() {
            filter.actor_id = Some(subject.id());
        }

        let count = self.store.count(&filter).await?;
        let records = self.store.list(&filter, pagination.window()).await?;
        Ok((count, records))
    }
}
