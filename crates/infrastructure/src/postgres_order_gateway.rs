//! PostgreSQL-backed order gateway.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use shopfront_application::{CreateOrderInput, OrderFilter, OrderPatch, PageWindow, ResourceGateway};
use shopfront_core::{AppError, AppResult, ProviderId, UserId};
use shopfront_domain::{LifecycleState, Order, OrderStatus, ResourceKind, ScopePredicate};
use uuid::Uuid;

/// PostgreSQL implementation of the order gateway port.
#[derive(Clone)]
pub struct PostgresOrderGateway {
    pool: PgPool,
}

impl PostgresOrderGateway {
    /// Creates a gateway with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    status: String,
    total_price: i64,
    customer_id: Option<Uuid>,
    provider_id: Option<Uuid>,
    remark: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            status: OrderStatus::from_str(row.status.as_str())?,
            total_price: row.total_price,
            customer_id: row.customer_id.map(UserId::from_uuid),
            provider_id: row.provider_id.map(ProviderId::from_uuid),
            remark: row.remark,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn scope_uuid(scope: &ScopePredicate) -> Option<Uuid> {
    scope.provider_filter().map(|provider| provider.as_uuid())
}

#[async_trait]
impl ResourceGateway for PostgresOrderGateway {
    type Entity = Order;
    type CreateInput = CreateOrderInput;
    type UpdateInput = OrderPatch;
    type Filter = OrderFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Order
    }

    async fn count(&self, filter: &OrderFilter, scope: &ScopePredicate) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM orders
            WHERE ($1::UUID IS NULL OR provider_id IS NULL OR provider_id = $1)
                AND ($2::TEXT IS NULL OR status = $2)
                AND ($3::UUID IS NULL OR customer_id = $3)
            "#,
        )
        .bind(scope_uuid(scope))
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.customer_id.map(|customer| customer.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count orders: {error}")))?;

        Ok(count.max(0) as u64)
    }

    async fn find_many(
        &self,
        filter: &OrderFilter,
        scope: &ScopePredicate,
        window: PageWindow,
    ) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, status, total_price, customer_id, provider_id, remark,
                   created_at, updated_at
            FROM orders
            WHERE ($1::UUID IS NULL OR provider_id IS NULL OR provider_id = $1)
                AND ($2::TEXT IS NULL OR status = $2)
                AND ($3::UUID IS NULL OR customer_id = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            OFFSET $5
            "#,
        )
        .bind(scope_uuid(scope))
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.customer_id.map(|customer| customer.as_uuid()))
        .bind(window.limit.min(i64::MAX as u64) as i64)
        .bind(window.offset.min(i64::MAX as u64) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list orders: {error}")))?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn find_unique(&self, id: Uuid, scope: &ScopePredicate) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, status, total_price, customer_id, provider_id, remark,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
                AND ($2::UUID IS NULL OR provider_id IS NULL OR provider_id = $2)
            "#,
        )
        .bind(id)
        .bind(scope_uuid(scope))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load order: {error}")))?;

        row.map(Order::try_from).transpose()
    }

    async fn find_first(
        &self,
        filter: &OrderFilter,
        scope: &ScopePredicate,
    ) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, status, total_price, customer_id, provider_id, remark,
                   created_at, updated_at
            FROM orders
            WHERE ($1::UUID IS NULL OR provider_id IS NULL OR provider_id = $1)
                AND ($2::TEXT IS NULL OR status = $2)
                AND ($3::UUID IS NULL OR customer_id = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(scope_uuid(scope))
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.customer_id.map(|customer| customer.as_uuid()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load order: {error}")))?;

        row.map(Order::try_from).transpose()
    }

    async fn create(&self, input: CreateOrderInput) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (id, status, total_price, customer_id, provider_id, remark)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, status, total_price, customer_id, provider_id, remark,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(OrderStatus::Pending.as_str())
        .bind(input.total_price)
        .bind(input.customer_id.map(|customer| customer.as_uuid()))
        .bind(input.provider_id.map(|provider| provider.as_uuid()))
        .bind(input.remark)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create order: {error}")))?;

        Order::try_from(row)
    }

    async fn update(
        &self,
        id: Uuid,
        input: OrderPatch,
        scope: &ScopePredicate,
    ) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE orders
            SET total_price = $2, remark = $3, status = $4, updated_at = now()
            WHERE id = $1
                AND status = $5
                AND ($6::UUID IS NULL OR provider_id IS NULL OR provider_id = $6)
            RETURNING id, status, total_price, customer_id, provider_id, remark,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.total_price)
        .bind(input.remark)
        .bind(input.status.as_str())
        .bind(input.expected_status.as_str())
        .bind(scope_uuid(scope))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update order: {error}")))?;

        row.map(Order::try_from).transpose()
    }

    async fn delete(&self, id: Uuid, scope: &ScopePredicate) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            DELETE FROM orders
            WHERE id = $1
                AND ($2::UUID IS NULL OR provider_id IS NULL OR provider_id = $2)
            RETURNING id, status, total_price, customer_id, provider_id, remark,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(scope_uuid(scope))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete order: {error}")))?;

        row.map(Order::try_from).transpose()
    }

    async fn delete_many(&self, ids: &[Uuid], scope: &ScopePredicate) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM orders
            WHERE id = ANY($1)
                AND ($2::UUID IS NULL OR provider_id IS NULL OR provider_id = $2)
            "#,
        )
        .bind(ids)
        .bind(scope_uuid(scope))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete orders: {error}")))?;

        Ok(result.rows_affected())
    }
}
