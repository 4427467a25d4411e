use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shopfront_core::{AppResult, UserId};
use shopfront_domain::{Action, ResourceKind, ScopePredicate, User};
use uuid::Uuid;

/// One-based pagination parameters supplied by the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// One-based page number.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
}

impl Pagination {
    /// Creates pagination from optional query values.
    #[must_use]
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(10).clamp(1, 200),
        }
    }

    /// Returns the offset/limit window for this page.
    #[must_use]
    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: u64::from(self.page - 1) * u64::from(self.page_size),
            limit: u64::from(self.page_size),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Offset/limit window passed to gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Rows skipped before the window.
    pub offset: u64,
    /// Maximum rows returned.
    pub limit: u64,
}

/// Entities that expose a stable identifier for audit trails.
pub trait Identified {
    /// Returns the stable identifier as its storage string.
    fn resource_id(&self) -> String;
}

/// Persistence gateway port implemented once per resource kind.
///
/// Gateways normalize driver-level failures themselves (unique violations
/// become `Conflict`, everything else `Internal`); absence is reported as
/// `None` and mapped to `NotFound` by [`crate::ResourceService`].
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// Row projection produced by this gateway.
    type Entity: Identified + Send + Sync;
    /// Payload accepted by `create`.
    type CreateInput: Send + Sync;
    /// Payload accepted by `update`.
    type UpdateInput: Send + Sync;
    /// Typed filter accepted by the query operations.
    type Filter: Send + Sync;

    /// Returns the resource kind this gateway persists.
    fn kind(&self) -> ResourceKind;

    /// Counts rows matching the filter inside the scope.
    async fn count(&self, filter: &Self::Filter, scope: &ScopePredicate) -> AppResult<u64>;

    /// Returns a stable-ordered window of rows matching the filter.
    async fn find_many(
        &self,
        filter: &Self::Filter,
        scope: &ScopePredicate,
        window: PageWindow,
    ) -> AppResult<Vec<Self::Entity>>;

    /// Returns one row by identifier, if present inside the scope.
    async fn find_unique(&self, id: Uuid, scope: &ScopePredicate)
    -> AppResult<Option<Self::Entity>>;

    /// Returns the first row matching the filter inside the scope.
    async fn find_first(
        &self,
        filter: &Self::Filter,
        scope: &ScopePredicate,
    ) -> AppResult<Option<Self::Entity>>;

    /// Inserts a new row.
    async fn create(&self, input: Self::CreateInput) -> AppResult<Self::Entity>;

    /// Updates one row inside the scope; `None` when no row matched.
    async fn update(
        &self,
        id: Uuid,
        input: Self::UpdateInput,
        scope: &ScopePredicate,
    ) -> AppResult<Option<Self::Entity>>;

    /// Deletes one row inside the scope; `None` when no row matched.
    async fn delete(&self, id: Uuid, scope: &ScopePredicate)
    -> AppResult<Option<Self::Entity>>;

    /// Deletes the given rows inside the scope, returning the affected count.
    async fn delete_many(&self, ids: &[Uuid], scope: &ScopePredicate) -> AppResult<u64>;
}

/// Canonical audit record appended after every successful authorized mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    /// Stable record identifier.
    pub id: Uuid,
    /// Subject that performed the action.
    pub actor_id: UserId,
    /// Action that was performed.
    pub action: Action,
    /// Resource kind targeted by the action.
    pub resource: ResourceKind,
    /// Affected resource identifiers, in operation order.
    pub resource_ids: Vec<String>,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}

/// Audit event payload used to override the derived default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Action to record.
    pub action: Action,
    /// Affected resource identifiers, in operation order.
    pub resource_ids: Vec<String>,
}

/// Filter for audit log listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogFilter {
    /// Restrict to one actor.
    pub actor_id: Option<UserId>,
    /// Restrict to one resource kind.
    pub resource: Option<ResourceKind>,
    /// Restrict to one action.
    pub action: Option<Action>,
}

/// Append-only sink for audit records.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends a single record.
    async fn append(&self, record: AuditRecord) -> AppResult<()>;

    /// Counts records matching the filter.
    async fn count(&self, filter: &AuditLogFilter) -> AppResult<u64>;

    /// Returns a window of records matching the filter, newest first.
    async fn list(
        &self,
        filter: &AuditLogFilter,
        window: PageWindow,
    ) -> AppResult<Vec<AuditRecord>>;
}

/// Repository port for subject resolution at the request boundary.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns one user account by identifier.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Returns one user account by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}
