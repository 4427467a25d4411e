//! PostgreSQL-backed brand gateway.

use async_trait::async_trait;
use sqlx::PgPool;

use shopfront_application::{BrandFilter, BrandPatch, CreateBrandInput, PageWindow, ResourceGateway};
use shopfront_core::{AppError, AppResult};
use shopfront_domain::{Brand, ResourceKind, ScopePredicate};
use uuid::Uuid;

/// PostgreSQL implementation of the brand gateway port.
///
/// Brands are platform-wide; the provider scope never narrows them.
#[derive(Clone)]
pub struct PostgresBrandGateway {
    pool: PgPool,
}

impl PostgresBrandGateway {
    /// Creates a gateway with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BrandRow {
    id: Uuid,
    name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn map_write_error(error: sqlx::Error, name: &str) -> AppError {
    if error
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation())
    {
        return AppError::Conflict(format!("brand '{name}' already exists"));
    }

    AppError::Internal(format!("failed to write brand: {error}"))
}

#[async_trait]
impl ResourceGateway for PostgresBrandGateway {
    type Entity = Brand;
    type CreateInput = CreateBrandInput;
    type UpdateInput = BrandPatch;
    type Filter = BrandFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Brand
    }

    async fn count(&self, filter: &BrandFilter, _scope: &ScopePredicate) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM brands
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            "#,
        )
        .bind(filter.name.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count brands: {error}")))?;

        Ok(count.max(0) as u64)
    }

    async fn find_many(
        &self,
        filter: &BrandFilter,
        _scope: &ScopePredicate,
        window: PageWindow,
    ) -> AppResult<Vec<Brand>> {
        let rows = sqlx::query_as::<_, BrandRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM brands
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name ASC, id ASC
            LIMIT $2
            OFFSET $3
            "#,
        )
        .bind(filter.name.as_deref())
        .bind(window.limit.min(i64::MAX as u64) as i64)
        .bind(window.offset.min(i64::MAX as u64) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list brands: {error}")))?;

        Ok(rows.into_iter().map(Brand::from).collect())
    }

    async fn find_unique(&self, id: Uuid, _scope: &ScopePredicate) -> AppResult<Option<Brand>> {
        let row = sqlx::query_as::<_, BrandRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM brands
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load brand: {error}")))?;

        Ok(row.map(Brand::from))
    }

    async fn find_first(
        &self,
        filter: &BrandFilter,
        _scope: &ScopePredicate,
    ) -> AppResult<Option<Brand>> {
        let row = sqlx::query_as::<_, BrandRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM brands
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(filter.name.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load brand: {error}")))?;

        Ok(row.map(Brand::from))
    }

    async fn create(&self, input: CreateBrandInput) -> AppResult<Brand> {
        let row = sqlx::query_as::<_, BrandRow>(
            r#"
            INSERT INTO brands (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_write_error(error, input.name.as_str()))?;

        Ok(Brand::from(row))
    }

    async fn update(
        &self,
        id: Uuid,
        input: BrandPatch,
        _scope: &ScopePredicate,
    ) -> AppResult<Option<Brand>> {
        let row = sqlx::query_as::<_, BrandRow>(
            r#"
            UPDATE brands
            SET name = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_write_error(error, input.name.as_str()))?;

        Ok(row.map(Brand::from))
    }

    async fn delete(&self, id: Uuid, _scope: &ScopePredicate) -> AppResult<Option<Brand>> {
        let row = sqlx::query_as::<_, BrandRow>(
            r#"
            DELETE FROM brands
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete brand: {error}")))?;

        Ok(row.map(Brand::from))
    }

    async fn delete_many(&self, ids: &[Uuid], _scope: &ScopePredicate) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM brands
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete brands: {error}")))?;

        Ok(result.rows_affected())
    }
}
