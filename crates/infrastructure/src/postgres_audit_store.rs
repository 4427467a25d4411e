//! PostgreSQL-backed audit store.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use shopfront_application::{AuditLogFilter, AuditRecord, AuditStore, PageWindow};
use shopfront_core::{AppError, AppResult, UserId};
use shopfront_domain::{Action, ResourceKind};
use uuid::Uuid;

/// PostgreSQL implementation of the append-only audit store.
#[derive(Clone)]
pub struct PostgresAuditStore {
    pool: PgPool,
}

impl PostgresAuditStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    actor_id: Uuid,
    action: String,
    resource: String,
    resource_ids: Vec<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<AuditRow> for AuditRecord {
    type Error = AppError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            actor_id: UserId::from_uuid(row.actor_id),
            action: Action::from_str(row.action.as_str())?,
            resource: ResourceKind::from_str(row.resource.as_str())?,
            resource_ids: row.resource_ids,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn append(&self, record: AuditRecord) -> AppResult<()> {
        // TEXT[] keeps the identifiers in operation order.
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, actor_id, action, resource, resource_ids, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.actor_id.as_uuid())
        .bind(record.action.as_str())
        .bind(record.resource.as_str())
        .bind(&record.resource_ids)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit record: {error}")))?;

        Ok(())
    }

    async fn count(&self, filter: &AuditLogFilter) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM audit_logs
            WHERE ($1::UUID IS NULL OR actor_id = $1)
                AND ($2::TEXT IS NULL OR resource = $2)
                AND ($3::TEXT IS NULL OR action = $3)
            "#,
        )
        .bind(filter.actor_id.map(|actor| actor.as_uuid()))
        .bind(filter.resource.map(|resource| resource.as_str()))
        .bind(filter.action.map(|action| action.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count audit records: {error}")))?;

        Ok(count.max(0) as u64)
    }

    async fn list(
        &self,
        filter: &AuditLogFilter,
        window: PageWindow,
    ) -> AppResult<Vec<AuditRecord>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, actor_id, action, resource, resource_ids, created_at
            FROM audit_logs
            WHERE ($1::UUID IS NULL OR actor_id = $1)
                AND ($2::TEXT IS NULL OR resource = $2)
                AND ($3::TEXT IS NULL OR action = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            OFFSET $5
            "#,
        )
        .bind(filter.actor_id.map(|actor| actor.as_uuid()))
        .bind(filter.resource.map(|resource| resource.as_str()))
        .bind(filter.action.map(|action| action.as_str()))
        .bind(window.limit.min(i64::MAX as u64) as i64)
        .bind(window.offset.min(i64::MAX as u64) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list audit records: {error}")))?;

        rows.into_iter().map(AuditRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests;
