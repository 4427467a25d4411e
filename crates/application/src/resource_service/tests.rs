use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shopfront_core::{AppError, AppResult, Role, Subject, UserId};
use shopfront_domain::{Action, Category, ResourceKind, ScopePredicate};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    AuditLogFilter, AuditRecord, AuditStore, CategoryFilter, CategoryPatch, CreateCategoryInput,
    PageWindow, Pagination, ResourceGateway,
};

use super::{AuditEvent, ResourceService};

#[derive(Default)]
struct FakeAuditStore {
    records: Mutex<Vec<AuditRecord>>,
    fail_append: bool,
}

impl FakeAuditStore {
    fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_append: true,
        }
    }
}

#[async_trait]
impl AuditStore for FakeAuditStore {
    async fn append(&self, record: AuditRecord) -> AppResult<()> {
        if self.fail_append {
            return Err(AppError::Internal("audit sink unavailable".to_owned()));
        }
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn count(&self, _filter: &AuditLogFilter) -> AppResult<u64> {
        Ok(self.records.lock().await.len() as u64)
    }

    async fn list(
        &self,
        _filter: &AuditLogFilter,
        _window: PageWindow,
    ) -> AppResult<Vec<AuditRecord>> {
        Ok(self.records.lock().await.clone())
    }
}

#[derive(Default)]
struct FakeCategoryGateway {
    rows: Mutex<Vec<Category>>,
}

impl FakeCategoryGateway {
    async fn seed(&self, names: &[&str]) -> Vec<Uuid> {
        let mut ids = Vec::new();
        let mut rows = self.rows.lock().await;
        for name in names {
            let id = Uuid::new_v4();
            rows.push(Category {
                id,
                name: (*name).to_owned(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
            ids.push(id);
        }
        ids
    }

    async fn contains(&self, id: Uuid) -> bool {
        self.rows.lock().await.iter().any(|row| row.id == id)
    }
}

#[async_trait]
impl ResourceGateway for FakeCategoryGateway {
    type Entity = Category;
    type CreateInput = CreateCategoryInput;
    type UpdateInput = CategoryPatch;
    type Filter = CategoryFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Category
    }

    async fn count(&self, filter: &CategoryFilter, _scope: &ScopePredicate) -> AppResult<u64> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|row| matches(row, filter))
            .count() as u64)
    }

    async fn find_many(
        &self,
        filter: &CategoryFilter,
        _scope: &ScopePredicate,
        window: PageWindow,
    ) -> AppResult<Vec<Category>> {
        let rows = self.rows.lock().await;
        let mut matched: Vec<Category> = rows
            .iter()
            .filter(|row| matches(row, filter))
            .cloned()
            .collect();
        matched.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(matched
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect())
    }

    async fn find_unique(&self, id: Uuid, _scope: &ScopePredicate) -> AppResult<Option<Category>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn find_first(
        &self,
        filter: &CategoryFilter,
        _scope: &ScopePredicate,
    ) -> AppResult<Option<Category>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|row| matches(row, filter)).cloned())
    }

    async fn create(&self, input: CreateCategoryInput) -> AppResult<Category> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|row| row.name == input.name) {
            return Err(AppError::Conflict(format!(
                "category '{}' already exists",
                input.name
            )));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        rows.push(category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        id: Uuid,
        input: CategoryPatch,
        _scope: &ScopePredicate,
    ) -> AppResult<Option<Category>> {
        let mut rows = self.rows.lock().await;
        let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
            return Ok(None);
        };
        row.name = input.name;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid, _scope: &ScopePredicate) -> AppResult<Option<Category>> {
        let mut rows = self.rows.lock().await;
        let Some(position) = rows.iter().position(|row| row.id == id) else {
            return Ok(None);
        };
        Ok(Some(rows.remove(position)))
    }

    async fn delete_many(&self, ids: &[Uuid], _scope: &ScopePredicate) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|row| !ids.contains(&row.id));
        Ok((before - rows.len()) as u64)
    }
}

fn matches(row: &Category, filter: &CategoryFilter) -> bool {
    filter
        .name
        .as_ref()
        .is_none_or(|name| row.name.contains(name.as_str()))
}

fn admin() -> Subject {
    Subject::new(UserId::new(), Role::Admin, None, false, false)
}

fn service(
    gateway: Arc<FakeCategoryGateway>,
    audit_store: Arc<FakeAuditStore>,
) -> ResourceService<FakeCategoryGateway> {
    ResourceService::new(gateway, audit_store)
}

#[tokio::test]
async fn find_many_with_count_returns_second_page_window() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    let names: Vec<String> = (1..=25).map(|n| format!("category-{n:02}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    gateway.seed(&name_refs).await;

    let mut service = service(gateway, Arc::new(FakeAuditStore::default()));
    let result = service
        .try_find_many_with_count(
            Pagination::new(Some(2), Some(10)),
            &CategoryFilter::default(),
            &ScopePredicate::Unrestricted,
        )
        .await;
    let Ok((count, rows)) = result else {
        panic!("unexpected error");
    };

    assert_eq!(count, 25);
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0].name, "category-11");
    assert_eq!(rows[9].name, "category-20");
}

#[tokio::test]
async fn find_unique_maps_absence_to_not_found() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    let mut service = service(gateway, Arc::new(FakeAuditStore::default()));

    let result = service
        .try_find_unique(Uuid::new_v4(), &ScopePredicate::Unrestricted)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn create_then_audit_appends_exactly_one_record() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    let audit_store = Arc::new(FakeAuditStore::default());
    let mut service = service(gateway, audit_store.clone());
    let actor = admin();

    let created = service
        .try_create(CreateCategoryInput {
            name: "electronics".to_owned(),
        })
        .await;
    assert!(created.is_ok());

    let record = service.audit(&actor, None).await;
    assert!(record.is_ok());

    let records = audit_store.records.lock().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, Action::Create);
    assert_eq!(records[0].resource, ResourceKind::Category);
    assert_eq!(records[0].actor_id, actor.id());
    assert_eq!(records[0].resource_ids.len(), 1);
}

#[tokio::test]
async fn failed_create_leaves_nothing_to_audit() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    gateway.seed(&["electronics"]).await;
    let audit_store = Arc::new(FakeAuditStore::default());
    let mut service = service(gateway, audit_store.clone());

    let result = service
        .try_create(CreateCategoryInput {
            name: "electronics".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let audit = service.audit(&admin(), None).await;
    assert!(matches!(audit, Err(AppError::Internal(_))));
    assert!(audit_store.records.lock().await.is_empty());
}

#[tokio::test]
async fn audit_default_event_is_consumed_once() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    let audit_store = Arc::new(FakeAuditStore::default());
    let mut service = service(gateway, audit_store.clone());
    let actor = admin();

    let _created = service
        .try_create(CreateCategoryInput {
            name: "books".to_owned(),
        })
        .await;

    assert!(service.audit(&actor, None).await.is_ok());
    assert!(service.audit(&actor, None).await.is_err());
    assert_eq!(audit_store.records.lock().await.len(), 1);
}

#[tokio::test]
async fn explicit_event_overrides_recorded_operation() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    let ids = gateway.seed(&["stationery"]).await;
    let audit_store = Arc::new(FakeAuditStore::default());
    let mut service = service(gateway, audit_store.clone());
    let actor = admin();

    let _deleted = service.try_delete(ids[0], &ScopePredicate::Unrestricted).await;
    let parent_id = Uuid::new_v4().to_string();
    let record = service
        .audit(
            &actor,
            Some(AuditEvent {
                action: Action::Update,
                resource_ids: vec![parent_id.clone()],
            }),
        )
        .await;

    assert!(record.is_ok());
    let records = audit_store.records.lock().await;
    assert_eq!(records[0].action, Action::Update);
    assert_eq!(records[0].resource_ids, vec![parent_id]);
}

#[tokio::test]
async fn delete_many_preserves_id_order_in_audit_trail() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    let ids = gateway.seed(&["a", "b", "c"]).await;
    let audit_store = Arc::new(FakeAuditStore::default());
    let mut service = service(gateway, audit_store.clone());

    let ordered = vec![ids[2], ids[0], ids[1]];
    let deleted = service
        .try_delete_many(&ordered, &ScopePredicate::Unrestricted)
        .await;
    assert_eq!(deleted.ok(), Some(3));

    let _record = service.audit(&admin(), None).await;
    let records = audit_store.records.lock().await;
    let expected: Vec<String> = ordered.iter().map(ToString::to_string).collect();
    assert_eq!(records[0].resource_ids, expected);
}

#[tokio::test]
async fn empty_delete_many_is_a_noop() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    gateway.seed(&["kept"]).await;
    let audit_store = Arc::new(FakeAuditStore::default());
    let mut service = service(gateway.clone(), audit_store.clone());

    let deleted = service
        .try_delete_many(&[], &ScopePredicate::Unrestricted)
        .await;
    assert_eq!(deleted.ok(), Some(0));

    // No operation was recorded, so a follow-up audit has nothing to emit.
    assert!(service.audit(&admin(), None).await.is_err());
    assert!(audit_store.records.lock().await.is_empty());
}

#[tokio::test]
async fn audit_failure_does_not_roll_back_the_mutation() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    let audit_store = Arc::new(FakeAuditStore::failing());
    let mut service = ResourceService::new(gateway.clone(), audit_store);

    let created = service
        .try_create(CreateCategoryInput {
            name: "garden".to_owned(),
        })
        .await;
    let Ok(category) = created else {
        panic!("create failed");
    };

    let audit = service.audit(&admin(), None).await;
    assert!(matches!(audit, Err(AppError::Internal(_))));
    assert!(gateway.contains(category.id).await);
}

#[tokio::test]
async fn check_permission_consults_the_rule_table() {
    let gateway = Arc::new(FakeCategoryGateway::default());
    let service = service(gateway, Arc::new(FakeAuditStore::default()));

    let customer = Subject::new(UserId::new(), Role::Customer, None, false, false);
    assert!(service.check_permission(Some(&customer), Action::Read).is_ok());
    assert!(service.check_permission(Some(&customer), Action::Create).is_err());
    assert!(service.check_permission(None, Action::Read).is_ok());
}
