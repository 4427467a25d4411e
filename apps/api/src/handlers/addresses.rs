use axum::Json;
use axum::extract::{Path, Query, State};
use shopfront_application::{
    CreateUserAddressInput, ResourceService, UserAddressFilter, UserAddressPatch,
};
use shopfront_core::{AppError, Role, Subject};
use shopfront_domain::{Action, ScopePredicate, UserAddress};
use shopfront_infrastructure::PostgresUserAddressGateway;
use uuid::Uuid;

use crate::dto::{PageQuery, PagedResponse, SaveUserAddressRequest, UserAddressResponse};
use crate::error::ApiResult;
use crate::middleware::CurrentSubject;
use crate::state::AppState;

fn service(state: &AppState) -> ResourceService<PostgresUserAddressGateway> {
    ResourceService::new(state.address_gateway.clone(), state.audit_store.clone())
}

/// Addresses are user-owned; only administrators may touch someone else's.
fn ensure_own(subject: &Subject, address: &UserAddress) -> Result<(), AppError> {
    if subject.is_superuser() || subject.role() == Role::Admin || address.user_id == subject.id() {
        return Ok(());
    }

    Err(AppError::Forbidden(
        "address belongs to another user".to_owned(),
    ))
}

pub async fn list_addresses_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<PagedResponse<UserAddressResponse>>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Read)?;

    let filter = UserAddressFilter {
        user_id: Some(subject.id()),
    };
    let (total, addresses) = service
        .try_find_many_with_count(
            query.pagination(),
            &filter,
            &ScopePredicate::for_subject(Some(&subject)),
        )
        .await?;

    Ok(Json(PagedResponse {
        total,
        items: addresses
            .into_iter()
            .map(UserAddressResponse::from)
            .collect(),
    }))
}

pub async fn get_address_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserAddressResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Read)?;

    let address = service
        .try_find_unique(id, &ScopePredicate::for_subject(Some(&subject)))
        .await?;
    ensure_own(&subject, &address)?;

    service.audit(&subject, None).await?;
    Ok(Json(UserAddressResponse::from(address)))
}

pub async fn create_address_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Json(payload): Json<SaveUserAddressRequest>,
) -> ApiResult<Json<UserAddressResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Create)?;

    let address = service
        .try_create(CreateUserAddressInput {
            user_id: subject.id(),
            full_address: payload.full_address,
            township: payload.township,
            region: payload.region,
            phone: payload.phone,
            is_default: payload.is_default,
        })
        .await?;
    service.audit(&subject, None).await?;

    Ok(Json(UserAddressResponse::from(address)))
}

pub async fn update_address_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveUserAddressRequest>,
) -> ApiResult<Json<UserAddressResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Update)?;

    let scope = ScopePredicate::for_subject(Some(&subject));
    let current = service.try_find_unique(id, &scope).await?;
    ensure_own(&subject, &current)?;

    let address = service
        .try_update(
            id,
            UserAddressPatch {
                full_address: payload.full_address,
                township: payload.township,
                region: payload.region,
                phone: payload.phone,
                is_default: payload.is_default,
            },
            &scope,
        )
        .await?;
    service.audit(&subject, None).await?;

    Ok(Json(UserAddressResponse::from(address)))
}

pub async fn delete_address_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserAddressResponse>> {
    let mut service = service(&state);
    service.check_permission(Some(&subject), Action::Delete)?;

    let scope = ScopePredicate::for_subject(Some(&subject));
    let current = service.try_find_unique(id, &scope).await?;
    ensure_own(&subject, &current)?;

    let address = service.try_delete(id, &scope).await?;
    service.audit(&subject, None).await?;

    Ok(Json(UserAddressResponse::from(address)))
}
