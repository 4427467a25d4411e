//! PostgreSQL-backed user address gateway.

use async_trait::async_trait;
use sqlx::PgPool;

use shopfront_application::{
    CreateUserAddressInput, PageWindow, ResourceGateway, UserAddressFilter, UserAddressPatch,
};
use shopfront_core::{AppError, AppResult, UserId};
use shopfront_domain::{ResourceKind, ScopePredicate, UserAddress};
use uuid::Uuid;

/// PostgreSQL implementation of the user address gateway port.
///
/// Addresses are user-owned rather than provider-owned; callers pin the
/// filter to the requesting user, so the provider scope never narrows them.
#[derive(Clone)]
pub struct PostgresUserAddressGateway {
    pool: PgPool,
}

impl PostgresUserAddressGateway {
    /// Creates a gateway with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserAddressRow {
    id: Uuid,
    user_id: Uuid,
    full_address: String,
    township: String,
    region: String,
    phone: String,
    is_default: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserAddressRow> for UserAddress {
    fn from(row: UserAddressRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            full_address: row.full_address,
            township: row.township,
            region: row.region,
            phone: row.phone,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ResourceGateway for PostgresUserAddressGateway {
    type Entity = UserAddress;
    type CreateInput = CreateUserAddressInput;
    type UpdateInput = UserAddressPatch;
    type Filter = UserAddressFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::UserAddress
    }

    async fn count(&self, filter: &UserAddressFilter, _scope: &ScopePredicate) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM user_addresses
            WHERE ($1::UUID IS NULL OR user_id = $1)
            "#,
        )
        .bind(filter.user_id.map(|user| user.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count addresses: {error}")))?;

        Ok(count.max(0) as u64)
    }

    async fn find_many(
        &self,
        filter: &UserAddressFilter,
        _scope: &ScopePredicate,
        window: PageWindow,
    ) -> AppResult<Vec<UserAddress>> {
        let rows = sqlx::query_as::<_, UserAddressRow>(
            r#"
            SELECT id, user_id, full_address, township, region, phone, is_default,
                   created_at, updated_at
            FROM user_addresses
            WHERE ($1::UUID IS NULL OR user_id = $1)
            ORDER BY is_default DESC, created_at DESC, id DESC
            LIMIT $2
            OFFSET $3
            "#,
        )
        .bind(filter.user_id.map(|user| user.as_uuid()))
        .bind(window.limit.min(i64::MAX as u64) as i64)
        .bind(window.offset.min(i64::MAX as u64) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list addresses: {error}")))?;

        Ok(rows.into_iter().map(UserAddress::from).collect())
    }

    async fn find_unique(
        &self,
        id: Uuid,
        _scope: &ScopePredicate,
    ) -> AppResult<Option<UserAddress>> {
        let row = sqlx::query_as::<_, UserAddressRow>(
            r#"
            SELECT id, user_id, full_address, township, region, phone, is_default,
                   created_at, updated_at
            FROM user_addresses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load address: {error}")))?;

        Ok(row.map(UserAddress::from))
    }

    async fn find_first(
        &self,
        filter: &UserAddressFilter,
        _scope: &ScopePredicate,
    ) -> AppResult<Option<UserAddress>> {
        let row = sqlx::query_as::<_, UserAddressRow>(
            r#"
            SELECT id, user_id, full_address, township, region, phone, is_default,
                   created_at, updated_at
            FROM user_addresses
            WHERE ($1::UUID IS NULL OR user_id = $1)
            ORDER BY is_default DESC, created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(filter.user_id.map(|user| user.as_uuid()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load address: {error}")))?;

        Ok(row.map(UserAddress::from))
    }

    async fn create(&self, input: CreateUserAddressInput) -> AppResult<UserAddress> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin address transaction: {error}"))
        })?;

        // A new default displaces the previous one.
        if input.is_default {
            sqlx::query(
                r#"
                UPDATE user_addresses
                SET is_default = FALSE, updated_at = now()
                WHERE user_id = $1 AND is_default = TRUE
                "#,
            )
            .bind(input.user_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear default address: {error}"))
            })?;
        }

        let row = sqlx::query_as::<_, UserAddressRow>(
            r#"
            INSERT INTO user_addresses (id, user_id, full_address, township, region,
                                        phone, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, full_address, township, region, phone, is_default,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.user_id.as_uuid())
        .bind(input.full_address)
        .bind(input.township)
        .bind(input.region)
        .bind(input.phone)
        .bind(input.is_default)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create address: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit address transaction: {error}"))
        })?;

        Ok(UserAddress::from(row))
    }

    async fn update(
        &self,
        id: Uuid,
        input: UserAddressPatch,
        _scope: &ScopePredicate,
    ) -> AppResult<Option<UserAddress>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin address transaction: {error}"))
        })?;

        if input.is_default {
            sqlx::query(
                r#"
                UPDATE user_addresses
                SET is_default = FALSE, updated_at = now()
                WHERE is_default = TRUE
                    AND user_id = (SELECT user_id FROM user_addresses WHERE id = $1)
                    AND id <> $1
                "#,
            )
            .bind(id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear default address: {error}"))
            })?;
        }

        let row = sqlx::query_as::<_, UserAddressRow>(
            r#"
            UPDATE user_addresses
            SET full_address = $2, township = $3, region = $4, phone = $5,
                is_default = $6, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, full_address, township, region, phone, is_default,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.full_address)
        .bind(input.township)
        .bind(input.region)
        .bind(input.phone)
        .bind(input.is_default)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update address: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit address transaction: {error}"))
        })?;

        Ok(row.map(UserAddress::from))
    }

    async fn delete(&self, id: Uuid, _scope: &ScopePredicate) -> AppResult<Option<UserAddress>> {
        let row = sqlx::query_as::<_, UserAddressRow>(
            r#"
            DELETE FROM user_addresses
            WHERE id = $1
            RETURNING id, user_id, full_address, township, region, phone, is_default,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete address: {error}")))?;

        Ok(row.map(UserAddress::from))
    }

    async fn delete_many(&self, ids: &[Uuid], _scope: &ScopePredicate) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_addresses
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete addresses: {error}")))?;

        Ok(result.rows_affected())
    }
}
