//! PostgreSQL-backed category gateway.

use async_trait::async_trait;
use sqlx::PgPool;

use shopfront_application::{
    CategoryFilter, CategoryPatch, CreateCategoryInput, PageWindow, ResourceGateway,
};
use shopfront_core::{AppError, AppResult};
use shopfront_domain::{Category, ResourceKind, ScopePredicate};
use uuid::Uuid;

/// PostgreSQL implementation of the category gateway port.
///
/// Categories are platform-wide; the provider scope never narrows them.
#[derive(Clone)]
pub struct PostgresCategoryGateway {
    pool: PgPool,
}

impl PostgresCategoryGateway {
    /// Creates a gateway with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
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
        return AppError::Conflict(format!("category '{name}' already exists"));
    }

    AppError::Internal(format!("failed to write category: {error}"))
}

#[async_trait]
impl ResourceGateway for PostgresCategoryGateway {
    type Entity = Category;
    type CreateInput = CreateCategoryInput;
    type UpdateInput = CategoryPatch;
    type Filter = CategoryFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Category
    }

    async fn count(&self, filter: &CategoryFilter, _scope: &ScopePredicate) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM categories
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            "#,
        )
        .bind(filter.name.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count categories: {error}")))?;

        Ok(count.max(0) as u64)
    }

    async fn find_many(
        &self,
        filter: &CategoryFilter,
        _scope: &ScopePredicate,
        window: PageWindow,
    ) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
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
        .map_err(|error| AppError::Internal(format!("failed to list categories: {error}")))?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_unique(&self, id: Uuid, _scope: &ScopePredicate) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load category: {error}")))?;

        Ok(row.map(Category::from))
    }

    async fn find_first(
        &self,
        filter: &CategoryFilter,
        _scope: &ScopePredicate,
    ) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(filter.name.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load category: {error}")))?;

        Ok(row.map(Category::from))
    }

    async fn create(&self, input: CreateCategoryInput) -> AppResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_write_error(error, input.name.as_str()))?;

        Ok(Category::from(row))
    }

    async fn update(
        &self,
        id: Uuid,
        input: CategoryPatch,
        _scope: &ScopePredicate,
    ) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
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

        Ok(row.map(Category::from))
    }

    async fn delete(&self, id: Uuid, _scope: &ScopePredicate) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            DELETE FROM categories
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete category: {error}")))?;

        Ok(row.map(Category::from))
    }

    async fn delete_many(&self, ids: &[Uuid], _scope: &ScopePredicate) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete categories: {error}")))?;

        Ok(result.rows_affected())
    }
}
