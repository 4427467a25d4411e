use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use shopfront_application::{AuditLogFilter, AuditRecord, AuditStore, PageWindow};
use shopfront_core::UserId;
use shopfront_domain::{Action, ResourceKind};

use super::PostgresAuditStore;

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
        panic!("failed to run migrations for audit store tests: {error}");
    }

    Some(pool)
}

fn record(actor_id: UserId, action: Action, ids: Vec<String>) -> AuditRecord {
    AuditRecord {
        id: Uuid::new_v4(),
        actor_id,
        action,
        resource: ResourceKind::Product,
        resource_ids: ids,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn append_preserves_resource_id_order() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let store = PostgresAuditStore::new(pool);
    let actor_id = UserId::new();
    let ids = vec![
        Uuid::new_v4().to_string(),
        Uuid::new_v4().to_string(),
        Uuid::new_v4().to_string(),
    ];

    let appended = store
        .append(record(actor_id, Action::Delete, ids.clone()))
        .await;
    assert!(appended.is_ok());

    let filter = AuditLogFilter {
        actor_id: Some(actor_id),
        ..AuditLogFilter::default()
    };
    let listed = store
        .list(&filter, PageWindow { offset: 0, limit: 10 })
        .await;
    let Ok(records) = listed else {
        panic!("failed to list audit records");
    };
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].resource_ids, ids);
    assert_eq!(records[0].action, Action::Delete);
}

#[tokio::test]
async fn filters_narrow_counts_by_actor_and_action() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let store = PostgresAuditStore::new(pool);
    let actor_id = UserId::new();

    for action in [Action::Create, Action::Update, Action::Update] {
        let appended = store
            .append(record(actor_id, action, vec![Uuid::new_v4().to_string()]))
            .await;
        assert!(appended.is_ok());
    }

    let filter = AuditLogFilter {
        actor_id: Some(actor_id),
        action: Some(Action::Update),
        ..AuditLogFilter::default()
    };
    assert_eq!(store.count(&filter).await.ok(), Some(2));

    let all_for_actor = AuditLogFilter {
        actor_id: Some(actor_id),
        ..AuditLogFilter::default()
    };
    assert_eq!(store.count(&all_for_actor).await.ok(), Some(3));
}
