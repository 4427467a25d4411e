use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shopfront_application::{
    NewProduct, Pagination, ProductFilter, ProductService, UpdateProductInput,
};
use shopfront_domain::ProductStatus;
use uuid::Uuid;

use crate::dto::{
    CreateProductRequest, DeleteManyRequest, DeletedCountResponse, PagedResponse, ProductQuery,
    ProductResponse, UpdateProductRequest,
};
use crate::error::ApiResult;
use crate::middleware::{CurrentSubject, MaybeSubject};
use crate::state::AppState;

fn service(state: &AppState) -> ProductService<shopfront_infrastructure::PostgresProductGateway> {
    ProductService::new(state.product_gateway.clone(), state.audit_store.clone())
}

pub async fn list_products_handler(
    State(state): State<AppState>,
    Extension(MaybeSubject(subject)): Extension<MaybeSubject>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<PagedResponse<ProductResponse>>> {
    let filter = ProductFilter {
        title: query.title,
        status: query.status,
        brand_id: query.brand_id,
    };
    let (total, products) = service(&state)
        .list(
            subject.as_ref(),
            &filter,
            Pagination::new(query.page, query.page_size),
        )
        .await?;

    Ok(Json(PagedResponse {
        total,
        items: products.into_iter().map(ProductResponse::from).collect(),
    }))
}

pub async fn get_product_handler(
    State(state): State<AppState>,
    Extension(MaybeSubject(subject)): Extension<MaybeSubject>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProductResponse>> {
    let product = service(&state).get(subject.as_ref(), id).await?;
    Ok(Json(ProductResponse::from(product)))
}

pub async fn create_product_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let draft = NewProduct {
        title: payload.title,
        price: payload.price,
        quantity: payload.quantity,
        status: ProductStatus::Draft,
        brand_id: payload.brand_id,
    };

    let product = service(&state).create(&subject, draft).await?;
    Ok(Json(ProductResponse::from(product)))
}

pub async fn update_product_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let input = UpdateProductInput {
        title: payload.title,
        price: payload.price,
        quantity: payload.quantity,
        brand_id: payload.brand_id,
        status: payload.status,
    };

    let product = service(&state).update(&subject, id, input).await?;
    Ok(Json(ProductResponse::from(product)))
}

pub async fn delete_product_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProductResponse>> {
    let product = service(&state).delete(&subject, id).await?;
    Ok(Json(ProductResponse::from(product)))
}

pub async fn delete_products_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Json(payload): Json<DeleteManyRequest>,
) -> ApiResult<Json<DeletedCountResponse>> {
    let deleted = service(&state).delete_many(&subject, &payload.ids).await?;
    Ok(Json(DeletedCountResponse { deleted }))
}
