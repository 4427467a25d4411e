use std::sync::Arc;

use shopfront_core::{AppError, AppResult, Subject};
use shopfront_domain::{Action, LifecycleGuard, Order, ScopePredicate};
use uuid::Uuid;

use crate::{
    AuditStore, CreateOrderInput, NewOrder, OrderFilter, OrderPatch, Pagination, ResourceGateway,
    ResourceService, UpdateOrderInput,
};

/// Fulfilment workflow composed over the order gateway.
///
/// Order creation is open to anonymous checkouts, while status changes
/// are validated against the fulfilment lifecycle and persisted with a
/// compare-and-swap on the previously read status.
pub struct OrderService<G>
where
    G: ResourceGateway<
            Entity = Order,
            CreateInput = CreateOrderInput,
            UpdateInput = OrderPatch,
            Filter = OrderFilter,
        >,
{
    service: ResourceService<G>,
}

impl<G> OrderService<G>
where
    G: ResourceGateway<
            Entity = Order,
            CreateInput = CreateOrderInput,
            UpdateInput = OrderPatch,
            Filter = OrderFilter,
        >,
{
    /// Creates a request-scoped order service.
    #[must_use]
    pub fn new(gateway: Arc<G>, audit_store: Arc<dyn AuditStore>) -> Self {
        Self {
            service: ResourceService::new(gateway, audit_store),
        }
    }

    /// Lists orders visible to the subject with a total count.
    pub async fn list(
        &mut self,
        subject: Option<&Subject>,
        filter: &OrderFilter,
        pagination: Pagination,
    ) -> AppResult<(u64, Vec<Order>)> {
        self.service.check_permission(subject, Action::Read)?;
        let scope = ScopePredicate::for_subject(subject);
        self.service
            .try_find_many_with_count(pagination, filter, &scope)
            .await
    }

    /// Returns one order, recording an audited read for known subjects.
    pub async fn get(&mut self, subject: Option<&Subject>, id: Uuid) -> AppResult<Order> {
        self.service.check_permission(subject, Action::Read)?;
        let scope = ScopePredicate::for_subject(subject);
        let order = self.service.try_find_unique(id, &scope).await?;

        if let Some(subject) = subject {
            self.service.audit(subject, None).await?;
        }
        Ok(order)
    }

    /// Places an order; anonymous guest checkouts carry no customer and
    /// leave no audit trail.
    pub async fn create(&mut self, subject: Option<&Subject>, order: NewOrder) -> AppResult<Order> {
        self.service.check_permission(subject, Action::Create)?;

        let created = self
            .service
            .try_create(CreateOrderInput {
                total_price: order.total_price,
                customer_id: subject.map(Subject::id),
                provider_id: order.provider_id,
                remark: order.remark,
            })
            .await?;

        if let Some(subject) = subject {
            self.service.audit(subject, None).await?;
        }
        Ok(created)
    }

    /// Updates an order, validating any status change against the
    /// fulfilment lifecycle.
    ///
    /// Only directly reachable transitions are accepted; a status that is
    /// reachable in two hops is still rejected. A concurrent transition
    /// between the read and the write surfaces as `Conflict`.
    pub async fn update(
        &mut self,
        subject: &Subject,
        id: Uuid,
        input: UpdateOrderInput,
    ) -> AppResult<Order> {
        self.service.check_permission(Some(subject), Action::Update)?;

        let current = self
            .service
            .try_find_unique(id, &ScopePredicate::Unrestricted)
            .await?;
        let scope = ScopePredicate::for_subject(Some(subject));
        scope.ensure_owned(current.provider_id)?;

        let status = match input.status {
            Some(requested) => LifecycleGuard::new(current.status).change_state(requested)?,
            None => current.status,
        };

        let patch = OrderPatch {
            total_price: input.total_price,
            remark: input.remark,
            status,
            expected_status: current.status,
        };

        let updated = self
            .service
            .try_update(id, patch, &scope)
            .await
            .map_err(|error| match error {
                AppError::NotFound(_) => AppError::Conflict(format!(
                    "order '{id}' changed concurrently, re-read and retry"
                )),
                other => other,
            })?;

        self.service.audit(subject, None).await?;
        Ok(updated)
    }

    /// Deletes an order inside the subject's provider scope.
    pub async fn delete(&mut self, subject: &Subject, id: Uuid) -> AppResult<Order> {
        self.service.check_permission(Some(subject), Action::Delete)?;

        let current = self
            .service
            .try_find_unique(id, &ScopePredicate::Unrestricted)
            .await?;
        let scope = ScopePredicate::for_subject(Some(subject));
        scope.ensure_owned(current.provider_id)?;

        let deleted = self.service.try_delete(id, &scope).await?;
        self.service.audit(subject, None).await?;
        Ok(deleted)
    }

    /// Deletes a batch of orders inside the subject's scope.
    pub async fn delete_many(&mut self, subject: &Subject, ids: &[Uuid]) -> AppResult<u64> {
        self.service.check_permission(Some(subject), Action::Delete)?;
        if ids.is_empty() {
            return Ok(0);
        }

        let scope = ScopePredicate::for_subject(Some(subject));
        let deleted = self.service.try_delete_many(ids, &scope).await?;
        self.service.audit(subject, None).await?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests;
