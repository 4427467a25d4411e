use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shopfront_application::{BrandFilter, BrandPatch, CreateBrandInput, Pagination, ResourceService};
use shopfront_domain::{Action, ScopePredicate};
use shopfront_infrastructure::PostgresBrandGateway;
use uuid::Uuid;

use crate::dto::{
    BrandResponse, CatalogNameQuery, DeleteManyRequest, DeletedCountResponse, PagedResponse,
    SaveBrandRequest,
};
use crate::error::ApiResult;
use crate::middleware::{CurrentSubject, MaybeSubject};
use crate::state::AppState;

fn service(state: &AppState) -> ResourceService<PostgresBrandGateway> {
    ResourceService::new(state.brand_gateway.clone(), state.audit_store.clone())
}

pub async fn list_brands_handler(
    State(state): State<AppState>,
    Extension(MaybeSubject(subject)): Extension<MaybeSubject>,
    Query(query): Query<CatalogNameQuery>,
) -> ApiResult<Json<PagedResponse<BrandResponse>>> {
    let mut service = service(&state);
    service.check_permission(subject.as_ref(), Action::Read)?;

    let filter = BrandFilter { name: query.name };
    let (total, brands) = service
        .try_find_many_with_count(
            Pagination::new(query.page, query.page_size),
            &filter,
            &ScopePredicate::for_subject(subject.as_ref()),
        )
        .await?;

    Ok(Json(PagedResponse {
        total,
        items: brands.into_iter().map(BrandResponse::from).collect(),
    }))
}

pub async fn get_brand_handler(
    State(state): State<AppState>,
    Extension(MaybeSubject(subject)): Extension<MaybeSubject>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BrandResponse>> {
    let mut service = service(&state);
    service.check_permission(subject.as_ref(), Action::Read)?;

    let brand = service
        .try_find_unique(id, &ScopePredicate::for_subject(subject.as_ref()))
        .await?;

    if let Some(subject) = subject.as_ref() {
        service.audit(subject, None).await?;
    }
    Ok(Json(BrandResponse::from(brand)))
}

pub async fn create_brand_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Json(payload): Json<SaveBrandRequest>,
) -> ApiResult<Json<BrandResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Create)?;

    let brand = service
        .try_create(CreateBrandInput { name: payload.name })
        .await?;
    service.audit(&subject, None).await?;

    Ok(Json(BrandResponse::from(brand)))
}

pub async fn update_brand_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveBrandRequest>,
) -> ApiResult<Json<BrandResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Update)?;

    let brand = service
        .try_update(
            id,
            BrandPatch { name: payload.name },
            &ScopePredicate::for_subject(Some(&subject)),
        )
        .await?;
    service.audit(&subject, None).await?;

    Ok(Json(BrandResponse::from(brand)))
}

pub async fn delete_brand_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BrandResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Delete)?;

    let brand = service
        .try_delete(id, &ScopePredicate::for_subject(Some(&subject)))
        .await?;
    service.audit(&subject, None).await?;

    Ok(Json(BrandResponse::from(brand)))
}

pub async fn delete_brands_handler(
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
