use std::sync::Arc;

use shopfront_core::{AppError, AppResult, Subject};
use shopfront_domain::{Action, LifecycleGuard, Product, ProductStatus, ScopePredicate};
use uuid::Uuid;

use crate::{
    AuditStore, CreateProductInput, NewProduct, Pagination, ProductFilter, ProductPatch,
    ResourceGateway, ResourceService, UpdateProductInput,
};

/// Lifecycle-aware composition over the product gateway.
///
/// The generic [`ResourceService`] handles permissions, persistence mapping
/// and audit; this service adds the product-specific rules composed around
/// it: the publication lifecycle, the superuser publish gate, the
/// draft-only deletion rule and the provider ownership refinement.
pub struct ProductService<G>
where
    G: ResourceGateway<
            Entity = Product,
            CreateInput = CreateProductInput,
            UpdateInput = ProductPatch,
            Filter = ProductFilter,
        >,
{
    service: ResourceService<G>,
}

impl<G> ProductService<G>
where
    G: ResourceGateway<
            Entity = Product,
            CreateInput = CreateProductInput,
            UpdateInput = ProductPatch,
            Filter = ProductFilter,
        >,
{
    /// Creates a request-scoped product service.
    #[must_use]
    pub fn new(gateway: Arc<G>, audit_store: Arc<dyn AuditStore>) -> Self {
        Self {
            service: ResourceService::new(gateway, audit_store),
        }
    }

    /// Lists products visible to the subject with a total count.
    pub async fn list(
        &mut self,
        subject: Option<&Subject>,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> AppResult<(u64, Vec<Product>)> {
        self.service.check_permission(subject, Action::Read)?;
        let scope = ScopePredicate::for_subject(subject);
        self.service
            .try_find_many_with_count(pagination, filter, &scope)
            .await
    }

    /// Returns one product, recording an audited read for known subjects.
    pub async fn get(&mut self, subject: Option<&Subject>, id: Uuid) -> AppResult<Product> {
        self.service.check_permission(subject, Action::Read)?;
        let scope = ScopePredicate::for_subject(subject);
        let product = self.service.try_find_unique(id, &scope).await?;

        if let Some(subject) = subject {
            self.service.audit(subject, None).await?;
        }
        Ok(product)
    }

    /// Creates a product owned by the subject's provider.
    pub async fn create(&mut self, subject: &Subject, draft: NewProduct) -> AppResult<Product> {
        self.service.check_permission(Some(subject), Action::Create)?;

        let product = self
            .service
            .try_create(CreateProductInput {
                title: draft.title,
                price: draft.price,
                quantity: draft.quantity,
                status: draft.status,
                brand_id: draft.brand_id,
                creator_id: subject.id(),
                provider_id: subject.provider_id(),
            })
            .await?;

        self.service.audit(subject, None).await?;
        Ok(product)
    }

    /// Updates a product, validating any status change against the lifecycle.
    ///
    /// Publishing is graph-legal from Draft and Pending but additionally
    /// requires a superuser; the two checks are deliberately separate. The
    /// persisted update compares-and-swaps on the previously read status, so
    /// a concurrent transition surfaces as `Conflict`.
    pub async fn update(
        &mut self,
        subject: &Subject,
        id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        self.service.check_permission(Some(subject), Action::Update)?;

        let current = self
            .service
            .try_find_unique(id, &ScopePredicate::Unrestricted)
            .await?;
        let scope = ScopePredicate::for_subject(Some(subject));
        scope.ensure_owned(current.provider_id)?;

        let status = match input.status {
            Some(requested) => {
                let next = LifecycleGuard::new(current.status).change_state(requested)?;
                if next == ProductStatus::Published && !subject.is_superuser() {
                    return Err(AppError::Forbidden(
                        "publishing products requires a superuser".to_owned(),
                    ));
                }
                next
            }
            None => current.status,
        };

        let patch = ProductPatch {
            title: input.title,
            price: input.price,
            quantity: input.quantity,
            brand_id: input.brand_id,
            status,
            expected_status: current.status,
        };

        let updated = self
            .service
            .try_update(id, patch, &scope)
            .await
            .map_err(|error| match error {
                AppError::NotFound(_) => AppError::Conflict(format!(
                    "product '{id}' changed concurrently, re-read and retry"
                )),
                other => other,
            })?;

        self.service.audit(subject, None).await?;
        Ok(updated)
    }

    /// Deletes a product; only drafts owned by the subject's provider.
    ///
    /// The gateway delete re-checks the draft status, so a row that left
    /// draft after the read here surfaces as `Conflict`, not a deletion.
    pub async fn delete(&mut self, subject: &Subject, id: Uuid) -> AppResult<Product> {
        self.service.check_permission(Some(subject), Action::Delete)?;

        let current = self
            .service
            .try_find_unique(id, &ScopePredicate::Unrestricted)
            .await?;
        let scope = ScopePredicate::for_subject(Some(subject));
        scope.ensure_owned(current.provider_id)?;

        if current.status != ProductStatus::Draft {
            return Err(AppError::Validation(
                "deletion is restricted to draft products".to_owned(),
            ));
        }

        let deleted = self
            .service
            .try_delete(id, &scope)
            .await
            .map_err(|error| match error {
                AppError::NotFound(_) => AppError::Conflict(format!(
                    "product '{id}' changed concurrently, re-read and retry"
                )),
                other => other,
            })?;
        self.service.audit(subject, None).await?;
        Ok(deleted)
    }

    /// Deletes a batch of draft products inside the subject's scope.
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
