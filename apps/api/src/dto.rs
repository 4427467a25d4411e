//! Request and response payloads for the HTTP boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_application::{AuditRecord, Pagination};
use shopfront_domain::{
    Action, Brand, Category, Order, OrderStatus, Product, ProductStatus, ResourceKind, User,
    UserAddress,
};
use uuid::Uuid;

/// Health check payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Development login request validated against the bootstrap token.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub token: String,
    pub email: String,
}

/// Authenticated account payload.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub provider_id: Option<Uuid>,
    pub is_superuser: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_uuid(),
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_owned(),
            provider_id: user.provider_id.map(|provider| provider.as_uuid()),
            is_superuser: user.is_superuser,
        }
    }
}

/// One-based pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

/// One page of rows together with the unpaged total.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub total: u64,
    pub items: Vec<T>,
}

/// Batch deletion request.
#[derive(Debug, Deserialize)]
pub struct DeleteManyRequest {
    pub ids: Vec<Uuid>,
}

/// Batch deletion result.
#[derive(Debug, Serialize)]
pub struct DeletedCountResponse {
    pub deleted: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub price: i64,
    pub quantity: i32,
    pub brand_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub title: String,
    pub price: i64,
    pub quantity: i32,
    pub brand_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub title: Option<String>,
    pub status: Option<ProductStatus>,
    pub brand_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub title: String,
    pub price: i64,
    pub quantity: i32,
    pub status: ProductStatus,
    pub brand_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            quantity: product.quantity,
            status: product.status,
            brand_id: product.brand_id,
            provider_id: product.provider_id.map(|provider| provider.as_uuid()),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub total_price: i64,
    pub provider_id: Option<Uuid>,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub total_price: i64,
    pub remark: Option<String>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total_price: i64,
    pub customer_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
            total_price: order.total_price,
            customer_id: order.customer_id.map(|customer| customer.as_uuid()),
            provider_id: order.provider_id.map(|provider| provider.as_uuid()),
            remark: order.remark,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogNameQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveBrandRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BrandResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Brand> for BrandResponse {
    fn from(brand: Brand) -> Self {
        Self {
            id: brand.id,
            name: brand.name,
            created_at: brand.created_at,
            updated_at: brand.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveUserAddressRequest {
    pub full_address: String,
    pub township: String,
    pub region: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Serialize)]
pub struct UserAddressResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_address: String,
    pub township: String,
    pub region: String,
    pub phone: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserAddress> for UserAddressResponse {
    fn from(address: UserAddress) -> Self {
        Self {
            id: address.id,
            user_id: address.user_id.as_uuid(),
            full_address: address.full_address,
            township: address.township,
            region: address.region,
            phone: address.phone,
            is_default: address.is_default,
            created_at: address.created_at,
            updated_at: address.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub actor_id: Option<Uuid>,
    pub resource: Option<ResourceKind>,
    pub action: Option<Action>,
}

#[derive(Debug, Serialize)]
pub struct AuditRecordResponse {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: Action,
    pub resource: ResourceKind,
    pub resource_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditRecord> for AuditRecordResponse {
    fn from(record: AuditRecord) -> Self {
        Self {
            id: record.id,
            actor_id: record.actor_id.as_uuid(),
            action: record.action,
            resource: record.resource,
            resource_ids: record.resource_ids,
            created_at: record.created_at,
        }
    }
}
