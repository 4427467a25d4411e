//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod address;
mod catalog;
mod lifecycle;
mod order;
mod product;
mod scope;
mod user;

pub use access::{AccessRule, Action, PermissionRule, ResourceKind, check_permission};
pub use address::UserAddress;
pub use catalog::{Brand, Category};
pub use lifecycle::{LifecycleGuard, LifecycleState, OrderStatus, ProductStatus};
pub use order::Order;
pub use product::Product;
pub use scope::ScopePredicate;
pub use user::User;
