use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shopfront_core::{AppError, AppResult, ProviderId, Role, Subject, UserId};
use shopfront_domain::{Action, Order, OrderStatus, ResourceKind, ScopePredicate};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    AuditLogFilter, AuditRecord, AuditStore, CreateOrderInput, NewOrder, OrderFilter, OrderPatch,
    PageWindow, ResourceGateway, UpdateOrderInput,
};

use super::OrderService;

#[derive(Default)]
struct FakeAuditStore {
    records: Mutex<Vec<AuditRecord>>,
}

#[async_trait]
impl AuditStore for FakeAuditStore {
    async fn append(&self, record: AuditRecord) -> AppResult<()> {
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
struct FakeOrderGateway {
    rows: Mutex<Vec<Order>>,
    sabotage: Mutex<Option<(Uuid, OrderStatus)>>,
}

impl FakeOrderGateway {
    async fn seed(&self, status: OrderStatus, provider_id: Option<ProviderId>) -> Uuid {
        let id = Uuid::new_v4();
        self.rows.lock().await.push(Order {
            id,
            status,
            total_price: 4_200,
            customer_id: None,
            provider_id,
            remark: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    async fn sabotage_status(&self, id: Uuid, status: OrderStatus) {
        *self.sabotage.lock().await = Some((id, status));
    }

    async fn status_of(&self, id: Uuid) -> Option<OrderStatus> {
        self.rows
            .lock()
            .await
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.status)
    }
}

#[async_trait]
impl ResourceGateway for FakeOrderGateway {
    type Entity = Order;
    type CreateInput = CreateOrderInput;
    type UpdateInput = OrderPatch;
    type Filter = OrderFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Order
    }

    async fn count(&self, filter: &OrderFilter, scope: &ScopePredicate) -> AppResult<u64> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|row| matches(row, filter) && scope.allows(row.provider_id))
            .count() as u64)
    }

    async fn find_many(
        &self,
        filter: &OrderFilter,
        scope: &ScopePredicate,
        window: PageWindow,
    ) -> AppResult<Vec<Order>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|row| matches(row, filter) && scope.allows(row.provider_id))
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_unique(&self, id: Uuid, scope: &ScopePredicate) -> AppResult<Option<Order>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|row| row.id == id && scope.allows(row.provider_id))
            .cloned())
    }

    async fn find_first(
        &self,
        filter: &OrderFilter,
        scope: &ScopePredicate,
    ) -> AppResult<Option<Order>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|row| matches(row, filter) && scope.allows(row.provider_id))
            .cloned())
    }

    async fn create(&self, input: CreateOrderInput) -> AppResult<Order> {
        let order = Order {
            id: Uuid::new_v4(),
            status: OrderStatus::Pending,
            total_price: input.total_price,
            customer_id: input.customer_id,
            provider_id: input.provider_id,
            remark: input.remark,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.rows.lock().await.push(order.clone());
        Ok(order)
    }

    async fn update(
        &self,
        id: Uuid,
        input: OrderPatch,
        scope: &ScopePredicate,
    ) -> AppResult<Option<Order>> {
        let mut rows = self.rows.lock().await;
        if let Some((target, status)) = self.sabotage.lock().await.take()
            && let Some(row) = rows.iter_mut().find(|row| row.id == target)
        {
            row.status = status;
        }

        let Some(row) = rows.iter_mut().find(|row| {
            row.id == id && scope.allows(row.provider_id) && row.status == input.expected_status
        }) else {
            return Ok(None);
        };

        row.total_price = input.total_price;
        row.remark = input.remark;
        row.status = input.status;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid, scope: &ScopePredicate) -> AppResult<Option<Order>> {
        let mut rows = self.rows.lock().await;
        let Some(position) = rows
            .iter()
            .position(|row| row.id == id && scope.allows(row.provider_id))
        else {
            return Ok(None);
        };
        Ok(Some(rows.remove(position)))
    }

    async fn delete_many(&self, ids: &[Uuid], scope: &ScopePredicate) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|row| !(ids.contains(&row.id) && scope.allows(row.provider_id)));
        Ok((before - rows.len()) as u64)
    }
}

fn matches(row: &Order, filter: &OrderFilter) -> bool {
    filter.status.is_none_or(|status| row.status == status)
        && filter
            .customer_id
            .is_none_or(|customer| row.customer_id == Some(customer))
}

fn customer() -> Subject {
    Subject::new(UserId::new(), Role::Customer, None, false, false)
}

fn shopowner(provider_id: ProviderId) -> Subject {
    Subject::new(UserId::new(), Role::Shopowner, Some(provider_id), false, false)
}

fn admin() -> Subject {
    Subject::new(UserId::new(), Role::Admin, None, true, false)
}

fn harness() -> (
    Arc<FakeOrderGateway>,
    Arc<FakeAuditStore>,
    OrderService<FakeOrderGateway>,
) {
    let gateway = Arc::new(FakeOrderGateway::default());
    let audit_store = Arc::new(FakeAuditStore::default());
    let service = OrderService::new(gateway.clone(), audit_store.clone());
    (gateway, audit_store, service)
}

fn update_to(status: Option<OrderStatus>) -> UpdateOrderInput {
    UpdateOrderInput {
        total_price: 4_200,
        remark: None,
        status,
    }
}

fn new_order() -> NewOrder {
    NewOrder {
        total_price: 4_200,
        provider_id: None,
        remark: Some("leave at the door".to_owned()),
    }
}

#[tokio::test]
async fn guest_checkout_creates_without_audit() {
    let (gateway, audit_store, mut service) = harness();

    let result = service.create(None, new_order()).await;
    let Ok(order) = result else {
        panic!("create failed");
    };
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.customer_id, None);
    assert_eq!(gateway.rows.lock().await.len(), 1);
    assert!(audit_store.records.lock().await.is_empty());
}

#[tokio::test]
async fn customer_checkout_is_attributed_and_audited() {
    let (_gateway, audit_store, mut service) = harness();
    let buyer = customer();

    let result = service.create(Some(&buyer), new_order()).await;
    let Ok(order) = result else {
        panic!("create failed");
    };
    assert_eq!(order.customer_id, Some(buyer.id()));

    let records = audit_store.records.lock().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].actor_id, buyer.id());
    assert_eq!(records[0].action, Action::Create);
    assert_eq!(records[0].resource, ResourceKind::Order);
    assert_eq!(records[0].resource_ids, vec![order.id.to_string()]);
}

#[tokio::test]
async fn customers_cannot_update_orders() {
    let (gateway, _audit_store, mut service) = harness();
    let id = gateway.seed(OrderStatus::Pending, None).await;

    let result = service
        .update(&customer(), id, update_to(Some(OrderStatus::Processing)))
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn pending_order_moves_to_processing() {
    let (gateway, audit_store, mut service) = harness();
    let id = gateway.seed(OrderStatus::Pending, None).await;

    let result = service
        .update(&admin(), id, update_to(Some(OrderStatus::Processing)))
        .await;
    assert_eq!(result.map(|o| o.status).ok(), Some(OrderStatus::Processing));
    assert_eq!(audit_store.records.lock().await.len(), 1);
}

#[tokio::test]
async fn shipped_order_cannot_return_to_pending() {
    let (gateway, _audit_store, mut service) = harness();
    let id = gateway.seed(OrderStatus::Shipped, None).await;

    let result = service
        .update(&admin(), id, update_to(Some(OrderStatus::Pending)))
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
    assert_eq!(gateway.status_of(id).await, Some(OrderStatus::Shipped));
}

#[tokio::test]
async fn reachability_is_not_transitive() {
    let (gateway, _audit_store, mut service) = harness();
    let id = gateway.seed(OrderStatus::Pending, None).await;

    // Shipped is two hops away via Processing; a direct jump is rejected.
    let result = service
        .update(&admin(), id, update_to(Some(OrderStatus::Shipped)))
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
}

#[tokio::test]
async fn self_transition_is_rejected() {
    let (gateway, _audit_store, mut service) = harness();
    let id = gateway.seed(OrderStatus::Pending, None).await;

    let result = service
        .update(&admin(), id, update_to(Some(OrderStatus::Pending)))
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
}

#[tokio::test]
async fn update_without_status_keeps_current_state() {
    let (gateway, _audit_store, mut service) = harness();
    let id = gateway.seed(OrderStatus::Delivered, None).await;

    let result = service.update(&admin(), id, update_to(None)).await;
    assert_eq!(result.map(|o| o.status).ok(), Some(OrderStatus::Delivered));
}

#[tokio::test]
async fn concurrent_transition_surfaces_as_conflict() {
    let (gateway, audit_store, mut service) = harness();
    let id = gateway.seed(OrderStatus::Pending, None).await;

    gateway.sabotage_status(id, OrderStatus::Cancelled).await;
    let result = service
        .update(&admin(), id, update_to(Some(OrderStatus::Processing)))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(audit_store.records.lock().await.is_empty());
}

#[tokio::test]
async fn cross_provider_update_is_denied() {
    let (gateway, _audit_store, mut service) = harness();
    let id = gateway
        .seed(OrderStatus::Pending, Some(ProviderId::new()))
        .await;

    let intruder = shopowner(ProviderId::new());
    let result = service
        .update(&intruder, id, update_to(Some(OrderStatus::Processing)))
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn shopowners_cannot_delete_orders() {
    let (gateway, _audit_store, mut service) = harness();
    let provider_id = ProviderId::new();
    let id = gateway.seed(OrderStatus::Cancelled, Some(provider_id)).await;

    let result = service.delete(&shopowner(provider_id), id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn admin_delete_is_audited() {
    let (gateway, audit_store, mut service) = harness();
    let id = gateway.seed(OrderStatus::Cancelled, None).await;

    let result = service.delete(&admin(), id).await;
    assert!(result.is_ok());
    assert_eq!(gateway.status_of(id).await, None);

    let records = audit_store.records.lock().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, Action::Delete);
}

#[tokio::test]
async fn provider_scope_limits_listing() {
    let (gateway, _audit_store, mut service) = harness();
    let mine = ProviderId::new();
    gateway.seed(OrderStatus::Pending, Some(mine)).await;
    gateway.seed(OrderStatus::Pending, Some(ProviderId::new())).await;

    let owner = shopowner(mine);
    let result = service
        .list(Some(&owner), &OrderFilter::default(), crate::Pagination::default())
        .await;
    let Ok((count, rows)) = result else {
        panic!("list failed");
    };
    assert_eq!(count, 1);
    assert_eq!(rows.len(), 1);
}
