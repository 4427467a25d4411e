//! Application services and ports.

#![forbid(unsafe_code)]

mod address_ports;
mod audit_log_service;
mod catalog_ports;
mod order_ports;
mod order_service;
mod ports;
mod product_service;
mod resource_service;

pub use address_ports::{CreateUserAddressInput, UserAddressFilter, UserAddressPatch};
pub use audit_log_service::AuditLogService;
pub use catalog_ports::{
    BrandFilter, BrandPatch, CategoryFilter, CategoryPatch, CreateBrandInput, CreateCategoryInput,
    CreateProductInput, NewProduct, ProductFilter, ProductPatch, UpdateProductInput,
};
pub use order_ports::{CreateOrderInput, NewOrder, OrderFilter, OrderPatch, UpdateOrderInput};
pub use order_service::OrderService;
pub use ports::{
    AuditEvent, AuditLogFilter, AuditRecord, AuditStore, Identified, PageWindow, Pagination,
    ResourceGateway, UserRepository,
};
pub use product_service::ProductService;
pub use resource_service::ResourceService;
