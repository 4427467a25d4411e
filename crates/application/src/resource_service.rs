use std::sync::Arc;

use chrono::Utc;
use shopfront_core::{AppError, AppResult, Subject};
use shopfront_domain::{Action, ResourceKind, ScopePredicate, check_permission};
use uuid::Uuid;

use crate::{AuditEvent, AuditRecord, AuditStore, Identified, Pagination, ResourceGateway};

/// Generic authorization, persistence and audit composition wrapped around
/// one resource gateway.
///
/// A service is request-scoped: handlers construct one per request from the
/// shared gateway and audit store, so the recorded last operation never
/// leaks between concurrent requests.
pub struct ResourceService<G: ResourceGateway> {
    gateway: Arc<G>,
    audit_store: Arc<dyn AuditStore>,
    last_operation: Option<AuditEvent>,
}

impl<G: ResourceGateway> ResourceService<G> {
    /// Creates a request-scoped service over the shared gateway.
    #[must_use]
    pub fn new(gateway: Arc<G>, audit_store: Arc<dyn AuditStore>) -> Self {
        Self {
            gateway,
            audit_store,
            last_operation: None,
        }
    }

    /// Returns the resource kind this service manages.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.gateway.kind()
    }

    /// Checks the permission table for the subject and action.
    pub fn check_permission(&self, subject: Option<&Subject>, action: Action) -> AppResult<()> {
        check_permission(subject, self.gateway.kind(), action)
    }

    /// Counts rows matching the filter inside the scope.
    pub async fn try_count(&self, filter: &G::Filter, scope: &ScopePredicate) -> AppResult<u64> {
        self.gateway.count(filter, scope).await
    }

    /// Issues a count query and a windowed fetch for one page.
    ///
    /// The two sub-queries are not transactionally linked; the count may
    /// drift from the window under concurrent writes. Either sub-query
    /// failing fails the whole call so the pair stays consistent.
    pub async fn try_find_many_with_count(
        &mut self,
        pagination: Pagination,
        filter: &G::Filter,
        scope: &ScopePredicate,
    ) -> AppResult<(u64, Vec<G::Entity>)> {
        let count = self.gateway.count(filter, scope).await?;
        let rows = self
            .gateway
            .find_many(filter, scope, pagination.window())
            .await?;

        self.record(Action::Read, rows.iter().map(Identified::resource_id).collect());
        Ok((count, rows))
    }

    /// Returns one row by identifier or `NotFound`.
    pub async fn try_find_unique(
        &mut self,
        id: Uuid,
        scope: &ScopePredicate,
    ) -> AppResult<G::Entity> {
        let Some(entity) = self.gateway.find_unique(id, scope).await? else {
            return Err(self.not_found(id));
        };

        self.record(Action::Read, vec![entity.resource_id()]);
        Ok(entity)
    }

    /// Returns the first row matching the filter or `NotFound`.
    pub async fn try_find_first(
        &mut self,
        filter: &G::Filter,
        scope: &ScopePredicate,
    ) -> AppResult<G::Entity> {
        let Some(entity) = self.gateway.find_first(filter, scope).await? else {
            return Err(AppError::NotFound(format!(
                "{} not found",
                self.gateway.kind().as_str()
            )));
        };

        self.record(Action::Read, vec![entity.resource_id()]);
        Ok(entity)
    }

    /// Inserts a new row.
    pub async fn try_create(&mut self, input: G::CreateInput) -> AppResult<G::Entity> {
        let entity = self.gateway.create(input).await?;
        self.record(Action::Create, vec![entity.resource_id()]);
        Ok(entity)
    }

    /// Updates one row or `NotFound`.
    pub async fn try_update(
        &mut self,
        id: Uuid,
        input: G::UpdateInput,
        scope: &ScopePredicate,
    ) -> AppResult<G::Entity> {
        let Some(entity) = self.gateway.update(id, input, scope).await? else {
            return Err(self.not_found(id));
        };

        self.record(Action::Update, vec![entity.resource_id()]);
        Ok(entity)
    }

    /// Deletes one row or `NotFound`.
    pub async fn try_delete(&mut self, id: Uuid, scope: &ScopePredicate) -> AppResult<G::Entity> {
        let Some(entity) = self.gateway.delete(id, scope).await? else {
            return Err(self.not_found(id));
        };

        self.record(Action::Delete, vec![entity.resource_id()]);
        Ok(entity)
    }

    /// Deletes the given rows, returning the affected count.
    ///
    /// An empty id set short-circuits to `Ok(0)` without touching the
    /// gateway or the recorded operation, so no degenerate empty-id audit
    /// record can be derived from it.
    pub async fn try_delete_many(
        &mut self,
        ids: &[Uuid],
        scope: &ScopePredicate,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let deleted = self.gateway.delete_many(ids, scope).await?;
        self.record(
            Action::Delete,
            ids.iter().map(ToString::to_string).collect(),
        );
        Ok(deleted)
    }

    /// Appends an audit record for the last successful operation.
    ///
    /// The default event is the operation this service last recorded and is
    /// consumed by the call, so auditing twice without a new operation is an
    /// error. An explicit `event` overrides the default for call sites whose
    /// conceptual action differs from the literal persistence call, such as
    /// a sub-resource delete recorded as an update of its parent. A failed
    /// append surfaces as `Internal`; the already-committed mutation is not
    /// rolled back.
    pub async fn audit(
        &mut self,
        subject: &Subject,
        event: Option<AuditEvent>,
    ) -> AppResult<AuditRecord> {
        let recorded = self.last_operation.take();
        let Some(event) = event.or(recorded) else {
            return Err(AppError::Internal(format!(
                "audit requested without a completed {} operation",
                self.gateway.kind().as_str()
            )));
        };

        let record = AuditRecord {
            id: Uuid::new_v4(),
            actor_id: subject.id(),
            action: event.action,
            resource: self.gateway.kind(),
            resource_ids: event.resource_ids,
            created_at: Utc::now(),
        };

        self.audit_store.append(record.clone()).await?;
        Ok(record)
    }

    fn record(&mut self, action: Action, resource_ids: Vec<String>) {
        self.last_operation = Some(AuditEvent {
            action,
            resource_ids,
        });
    }

    fn not_found(&self, id: Uuid) -> AppError {
        AppError::NotFound(format!("{} '{id}' not found", self.gateway.kind().as_str()))
    }
}

#[cfg(test)]
mod tests;
