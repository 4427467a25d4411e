//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod postgres_audit_store;
mod postgres_brand_gateway;
mod postgres_category_gateway;
mod postgres_order_gateway;
mod postgres_product_gateway;
mod postgres_user_address_gateway;
mod postgres_user_repository;

pub use postgres_audit_store::PostgresAuditStore;
pub use postgres_brand_gateway::PostgresBrandGateway;
pub use postgres_category_gateway::PostgresCategoryGateway;
pub use postgres_order_gateway::PostgresOrderGateway;
pub use postgres_product_gateway::PostgresProductGateway;
pub use postgres_user_address_gateway::PostgresUserAddressGateway;
pub use postgres_user_repository::PostgresUserRepository;
