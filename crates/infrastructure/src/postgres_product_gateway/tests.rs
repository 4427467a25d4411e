use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use shopfront_application::{CreateProductInput, ResourceGateway};
use shopfront_core::UserId;
use shopfront_domain::{ProductStatus, ScopePredicate};

use super::PostgresProductGateway;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for product gateway tests: {error}");
    }

    Some(pool)
}

async fn seed_user(pool: &PgPool) -> UserId {
    let user_id = UserId::new();
    let inserted = sqlx::query(
        r#"
        INSERT INTO users (id, name, email, role)
        VALUES ($1, 'Gateway Tester', $2, 'shopowner')
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(format!("{}@gateway.test", Uuid::new_v4()))
    .execute(pool)
    .await;
    assert!(inserted.is_ok());
    user_id
}

fn input(creator_id: UserId, status: ProductStatus) -> CreateProductInput {
    CreateProductInput {
        title: "Walnut desk".to_owned(),
        price: 45_000,
        quantity: 3,
        status,
        brand_id: None,
        creator_id,
        provider_id: None,
    }
}

#[tokio::test]
async fn delete_only_removes_draft_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let gateway = PostgresProductGateway::new(pool.clone());
    let creator_id = seed_user(&pool).await;

    let published = gateway
        .create(input(creator_id, ProductStatus::Published))
        .await;
    let Ok(published) = published else {
        panic!("failed to create published product");
    };

    // A row that left draft between the caller's read and the delete must
    // survive, same as a lost compare-and-swap on update.
    let deleted = gateway
        .delete(published.id, &ScopePredicate::Unrestricted)
        .await;
    assert!(matches!(deleted, Ok(None)));

    let remaining = gateway
        .find_unique(published.id, &ScopePredicate::Unrestricted)
        .await;
    assert!(matches!(remaining, Ok(Some(_))));

    let draft = gateway.create(input(creator_id, ProductStatus::Draft)).await;
    let Ok(draft) = draft else {
        panic!("failed to create draft product");
    };

    let deleted = gateway.delete(draft.id, &ScopePredicate::Unrestricted).await;
    let Ok(Some(removed)) = deleted else {
        panic!("expected the draft row to be deleted");
    };
    assert_eq!(removed.id, draft.id);
}
