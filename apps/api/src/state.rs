use std::sync::Arc;

use shopfront_application::{AuditStore, UserRepository};
use shopfront_infrastructure::{
    PostgresBrandGateway, PostgresCategoryGateway, PostgresOrderGateway, PostgresProductGateway,
    PostgresUserAddressGateway,
};

/// Shared application state.
///
/// Gateways and stores are shared; the per-resource services composed over
/// them are constructed per request inside the handlers.
#[derive(Clone)]
pub struct AppState {
    pub product_gateway: Arc<PostgresProductGateway>,
    pub order_gateway: Arc<PostgresOrderGateway>,
    pub category_gateway: Arc<PostgresCategoryGateway>,
    pub brand_gateway: Arc<PostgresBrandGateway>,
    pub address_gateway: Arc<PostgresUserAddressGateway>,
    pub audit_store: Arc<dyn AuditStore>,
    pub user_repository: Arc<dyn UserRepository>,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
