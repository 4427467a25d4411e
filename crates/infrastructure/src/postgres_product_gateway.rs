//! PostgreSQL-backed product gateway.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use shopfront_application::{
    CreateProductInput, PageWindow, ProductFilter, ProductPatch, ResourceGateway,
};
use shopfront_core::{AppError, AppResult, ProviderId, UserId};
use shopfront_domain::{LifecycleState, Product, ProductStatus, ResourceKind, ScopePredicate};
use uuid::Uuid;

/// PostgreSQL implementation of the product gateway port.
#[derive(Clone)]
pub struct PostgresProductGateway {
    pool: PgPool,
}

impl PostgresProductGateway {
    /// Creates a gateway with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    title: String,
    price: i64,
    quantity: i32,
    status: String,
    brand_id: Option<Uuid>,
    creator_id: Uuid,
    provider_id: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            price: row.price,
            quantity: row.quantity,
            status: ProductStatus::from_str(row.status.as_str())?,
            brand_id: row.brand_id,
            creator_id: UserId::from_uuid(row.creator_id),
            provider_id: row.provider_id.map(ProviderId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn scope_uuid(scope: &ScopePredicate) -> Option<Uuid> {
    scope.provider_filter().map(|provider| provider.as_uuid())
}

#[async_trait]
impl ResourceGateway for PostgresProductGateway {
    type Entity = Product;
    type CreateInput = CreateProductInput;
    type UpdateInput = ProductPatch;
    type Filter = ProductFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Product
    }

    async fn count(&self, filter: &ProductFilter, scope: &ScopePredicate) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::UUID IS NULL OR provider_id IS NULL OR provider_id = $1)
                AND ($2::TEXT IS NULL OR title ILIKE '%' || $2 || '%')
                AND ($3::TEXT IS NULL OR status = $3)
                AND ($4::UUID IS NULL OR brand_id = $4)
            "#,
        )
        .bind(scope_uuid(scope))
        .bind(filter.title.as_deref())
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.brand_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count products: {error}")))?;

        Ok(count.max(0) as u64)
    }

    async fn find_many(
        &self,
        filter: &ProductFilter,
        scope: &ScopePredicate,
        window: PageWindow,
    ) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, title, price, quantity, status, brand_id, creator_id,
                   provider_id, created_at, updated_at
            FROM products
            WHERE ($1::UUID IS NULL OR provider_id IS NULL OR provider_id = $1)
                AND ($2::TEXT IS NULL OR title ILIKE '%' || $2 || '%')
                AND ($3::TEXT IS NULL OR status = $3)
                AND ($4::UUID IS NULL OR brand_id = $4)
            ORDER BY created_at DESC, id DESC
            LIMIT $5
            OFFSET $6
            "#,
        )
        .bind(scope_uuid(scope))
        .bind(filter.title.as_deref())
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.brand_id)
        .bind(window.limit.min(i64::MAX as u64) as i64)
        .bind(window.offset.min(i64::MAX as u64) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list products: {error}")))?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn find_unique(&self, id: Uuid, scope: &ScopePredicate) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, title, price, quantity, status, brand_id, creator_id,
                   provider_id, created_at, updated_at
            FROM products
            WHERE id = $1
                AND ($2::UUID IS NULL OR provider_id IS NULL OR provider_id = $2)
            "#,
        )
        .bind(id)
        .bind(scope_uuid(scope))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load product: {error}")))?;

        row.map(Product::try_from).transpose()
    }

    async fn find_first(
        &self,
        filter: &ProductFilter,
        scope: &ScopePredicate,
    ) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, title, price, quantity, status, brand_id, creator_id,
                   provider_id, created_at, updated_at
            FROM products
            WHERE ($1::UUID IS NULL OR provider_id IS NULL OR provider_id = $1)
                AND ($2::TEXT IS NULL OR title ILIKE '%' || $2 || '%')
                AND ($3::TEXT IS NULL OR status = $3)
                AND ($4::UUID IS NULL OR brand_id = $4)
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(scope_uuid(scope))
        .bind(filter.title.as_deref())
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.brand_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load product: {error}")))?;

        row.map(Product::try_from).transpose()
    }

    async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (id, title, price, quantity, status, brand_id,
                                  creator_id, provider_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, price, quantity, status, brand_id, creator_id,
                      provider_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.title)
        .bind(input.price)
        .bind(input.quantity)
        .bind(input.status.as_str())
        .bind(input.brand_id)
        .bind(input.creator_id.as_uuid())
        .bind(input.provider_id.map(|provider| provider.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create product: {error}")))?;

        Product::try_from(row)
    }

    async fn update(
        &self,
        id: Uuid,
        input: ProductPatch,
        scope: &ScopePredicate,
    ) -> AppResult<Option<Product>> {
        // The status predicate is the compare-and-swap: a row whose status
        // moved since the caller's read no longer matches and no row is
        // updated.
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET title = $2, price = $3, quantity = $4, brand_id = $5,
                status = $6, updated_at = now()
            WHERE id = $1
                AND status = $7
                AND ($8::UUID IS NULL OR provider_id IS NULL OR provider_id = $8)
            RETURNING id, title, price, quantity, status, brand_id, creator_id,
                      provider_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.title)
        .bind(input.price)
        .bind(input.quantity)
        .bind(input.brand_id)
        .bind(input.status.as_str())
        .bind(input.expected_status.as_str())
        .bind(scope_uuid(scope))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update product: {error}")))?;

        row.map(Product::try_from).transpose()
    }

    async fn delete(&self, id: Uuid, scope: &ScopePredicate) -> AppResult<Option<Product>> {
        // Only drafts are deletable; a row that left draft after the
        // service read it must not match, mirroring the CAS in `update`.
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            DELETE FROM products
            WHERE id = $1
                AND status = 'draft'
                AND ($2::UUID IS NULL OR provider_id IS NULL OR provider_id = $2)
            RETURNING id, title, price, quantity, status, brand_id, creator_id,
                      provider_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(scope_uuid(scope))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete product: {error}")))?;

        row.map(Product::try_from).transpose()
    }

    async fn delete_many(&self, ids: &[Uuid], scope: &ScopePredicate) -> AppResult<u64> {
        // Batch deletion only ever removes drafts; rows that moved past
        // draft are silently skipped rather than failing the batch.
        let result = sqlx::query(
            r#"
            DELETE FROM products
            WHERE id = ANY($1)
                AND status = 'draft'
                AND ($2::UUID IS NULL OR provider_id IS NULL OR provider_id = $2)
            "#,
        )
        .bind(ids)
        .bind(scope_uuid(scope))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete products: {error}")))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests;
