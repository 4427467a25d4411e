use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shopfront_application::{
    CategoryFilter, CategoryPatch, CreateCategoryInput, Pagination, ResourceService,
};
use shopfront_domain::{Action, ScopePredicate};
use shopfront_infrastructure::PostgresCategoryGateway;
use uuid::Uuid;

use crate::dto::{
    CatalogNameQuery, CategoryResponse, DeleteManyRequest, DeletedCountResponse, PagedResponse,
    SaveCategoryRequest,
};
use crate::error::ApiResult;
use crate::middleware::{CurrentSubject, MaybeSubject};
use crate::state::AppState;

fn service(state: &AppState) -> ResourceService<PostgresCategoryGateway> {
    ResourceService::new(state.category_gateway.clone(), state.audit_store.clone())
}

pub async fn list_categories_handler(
    State(state): State<AppState>,
    Extension(MaybeSubject(subject)): Extension<MaybeSubject>,
    Query(query): Query<CatalogNameQuery>,
) -> ApiResult<Json<PagedResponse<CategoryResponse>>> {
    let mut service = service(&state);
    service.check_permission(subject.as_ref(), Action::Read)?;

    let filter = CategoryFilter { name: query.name };
    let (total, categories) = service
        .try_find_many_with_count(
            Pagination::new(query.page, query.page_size),
            &filter,
            &ScopePredicate::for_subject(subject.as_ref()),
        )
        .await?;

    Ok(Json(PagedResponse {
        total,
        items: categories.into_iter().map(CategoryResponse::from).collect(),
    }))
}

pub async fn get_category_handler(
    State(state): State<AppState>,
    Extension(MaybeSubject(subject)): Extension<MaybeSubject>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CategoryResponse>> {
    let mut service = service(&state);
    service.check_permission(subject.as_ref(), Action::Read)?;

    let category = service
        .try_find_unique(id, &ScopePredicate::for_subject(subject.as_ref()))
        .await?;

    if let Some(subject) = subject.as_ref() {
        service.audit(subject, None).await?;
    }
    Ok(Json(CategoryResponse::from(category)))
}

pub async fn create_category_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Json(payload): Json<SaveCategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Create)?;

    let category = service
        .try_create(CreateCategoryInput { name: payload.name })
        .await?;
    service.audit(&subject, None).await?;

    Ok(Json(CategoryResponse::from(category)))
}

pub async fn update_category_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveCategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Update)?;

    let category = service
        .try_update(
            id,
            CategoryPatch { name: payload.name },
            &ScopePredicate::for_subject(Some(&subject)),
        )
        .await?;
    service.audit(&subject, None).await?;

    Ok(Json(CategoryResponse::from(category)))
}

pub async fn delete_category_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CategoryResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Delete)?;

    let category = service
        .try_delete(id, &ScopePredicate::for_subject(Some(&subject)))
        .await?;
    service.audit(&subject, None).await?;

    Ok(Json(CategoryResponse::from(category)))
}

pub async fn delete_categories_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Json(payload): Json<DeleteManyRequest>,
) -> ApiResult<Json<DeletedCountResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Delete)?;

    if payload.ids.is_empty() {
        return Ok(Json(DeletedCountResponse { deleted: 0 }));
    }

    let deleted = service
        .try_delete_many(&payload.ids, &ScopePredicate::for_subject(Some(&subject)))
        .await?;
    service.audit(&subject, None).await?;

    Ok(Json(DeletedCountResponse { deleted }))
}
