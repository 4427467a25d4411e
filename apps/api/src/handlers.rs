//! HTTP handlers, one module per resource.

pub mod addresses;
pub mod audit_logs;
pub mod brands;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
