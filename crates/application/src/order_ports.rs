use shopfront_core::{ProviderId, UserId};
use shopfront_domain::{Order, OrderStatus};

use crate::Identified;

impl Identified for Order {
    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

/// Boundary payload for order creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Order total in the smallest currency denomination.
    pub total_price: i64,
    /// Provider fulfilling the order.
    pub provider_id: Option<ProviderId>,
    /// Free-form remark.
    pub remark: Option<String>,
}

/// Gateway-facing order insert with the customer resolved from the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderInput {
    /// Order total in the smallest currency denomination.
    pub total_price: i64,
    /// Customer placing the order; `None` for guest checkouts.
    pub customer_id: Option<UserId>,
    /// Provider fulfilling the order.
    pub provider_id: Option<ProviderId>,
    /// Free-form remark.
    pub remark: Option<String>,
}

/// Boundary payload for order updates.
///
/// `status: None` leaves the current status untouched; `Some` is validated
/// against the order lifecycle before any persistence side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOrderInput {
    /// New order total.
    pub total_price: i64,
    /// New remark.
    pub remark: Option<String>,
    /// Requested fulfilment status, if changing.
    pub status: Option<OrderStatus>,
}

/// Gateway-facing order update resolved by the order service.
///
/// `expected_status` is the status read before validation; the gateway
/// compares-and-swaps on it so concurrent conflicting transitions surface
/// as a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPatch {
    /// New order total.
    pub total_price: i64,
    /// New remark.
    pub remark: Option<String>,
    /// Status to persist.
    pub status: OrderStatus,
    /// Status the row must still hold for the update to apply.
    pub expected_status: OrderStatus,
}

/// Typed filter for order queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Restrict to one fulfilment status.
    pub status: Option<OrderStatus>,
    /// Restrict to one customer.
    pub customer_id: Option<UserId>,
}
