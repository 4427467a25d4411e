use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shopfront_application::{NewOrder, OrderFilter, OrderService, Pagination, UpdateOrderInput};
use shopfront_core::{ProviderId, Role};
use uuid::Uuid;

use crate::dto::{
    CreateOrderRequest, DeleteManyRequest, DeletedCountResponse, OrderQuery, OrderResponse,
    PagedResponse, UpdateOrderRequest,
};
use crate::error::ApiResult;
use crate::middleware::{CurrentSubject, MaybeSubject};
use crate::state::AppState;

fn service(state: &AppState) -> OrderService<shopfront_infrastructure::PostgresOrderGateway> {
    OrderService::new(state.order_gateway.clone(), state.audit_store.clone())
}

pub async fn list_orders_handler(
    State(state): State<AppState>,
    Extension(MaybeSubject(subject)): Extension<MaybeSubject>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Json<PagedResponse<OrderResponse>>> {
    // Customers only ever see their own orders.
    let customer_id = subject
        .as_ref()
        .filter(|subject| subject.role() == Role::Customer && !subject.is_superuser())
        .map(|subject| subject.id());
    let filter = OrderFilter {
        status: query.status,
        customer_id,
    };

    let (total, orders) = service(&state)
        .list(
            subject.as_ref(),
            &filter,
            Pagination::new(query.page, query.page_size),
        )
        .await?;

    Ok(Json(PagedResponse {
        total,
        items: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}

pub async fn get_order_handler(
    State(state): State<AppState>,
    Extension(MaybeSubject(subject)): Extension<MaybeSubject>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderResponse>> {
    let order = service(&state).get(subject.as_ref(), id).await?;
    Ok(Json(OrderResponse::from(order)))
}

pub async fn create_order_handler(
    State(state): State<AppState>,
    Extension(MaybeSubject(subject)): Extension<MaybeSubject>,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let order = NewOrder {
        total_price: payload.total_price,
        provider_id: payload.provider_id.map(ProviderId::from_uuid),
        remark: payload.remark,
    };

    let created = service(&state).create(subject.as_ref(), order).await?;
    Ok(Json(OrderResponse::from(created)))
}

pub async fn update_order_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let input = UpdateOrderInput {
        total_price: payload.total_price,
        remark: payload.remark,
        status: payload.status,
    };

    let order = service(&state).update(&subject, id, input).await?;
    Ok(Json(OrderResponse::from(order)))
}

pub async fn delete_order_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderResponse>> {
    let order = service(&state).delete(&subject, id).await?;
    Ok(Json(OrderResponse::from(order)))
}

pub async fn delete_orders_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Json(payload): Json<DeleteManyRequest>,
) -> ApiResult<Json<DeletedCountResponse>> {
    let deleted = service(&state).delete_many(&subject, &payload.ids).await?;
    Ok(Json(DeletedCountResponse { deleted }))
}
