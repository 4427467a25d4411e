use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shopfront_core::{AppError, AppResult};

use crate::ResourceKind;

/// Status enum participating in a per-resource transition table.
pub trait LifecycleState: Copy + Eq + Sized + 'static {
    /// Resource kind whose status field this lifecycle governs.
    const KIND: ResourceKind;

    /// Returns a stable storage value for this state.
    fn as_str(&self) -> &'static str;

    /// Returns the states reachable from this state.
    ///
    /// Pairs absent from the returned slice are denied, self-transitions
    /// included: re-submitting the current state would repeat side effects
    /// such as an inventory decrement.
    fn allowed_transitions(self) -> &'static [Self];
}

/// Validates one requested status change against the transition table.
///
/// The guard only decides graph legality. Whether the subject may perform
/// the transition at all (for example publishing a product) is a separate
/// authorization concern composed around it by the calling service.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleGuard<S: LifecycleState> {
    current: S,
}

impl<S: LifecycleState> LifecycleGuard<S> {
    /// Creates a guard bound to the status a resource currently holds.
    #[must_use]
    pub fn new(current: S) -> Self {
        Self { current }
    }

    /// Returns the current state the guard was constructed with.
    #[must_use]
    pub fn current(&self) -> S {
        self.current
    }

    /// Validates the transition to `requested`.
    pub fn change_state(&self, requested: S) -> AppResult<S> {
        if self.current.allowed_transitions().contains(&requested) {
            return Ok(requested);
        }

        Err(AppError::InvalidTransition {
            resource: S::KIND.as_str().to_owned(),
            from: self.current.as_str().to_owned(),
            to: requested.as_str().to_owned(),
        })
    }
}

/// Order fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, not yet picked up by an operator.
    Pending,
    /// Order accepted and being prepared.
    Processing,
    /// Order handed to the carrier.
    Shipped,
    /// Order received by the customer. Terminal.
    Delivered,
    /// Order cancelled. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Returns every declared order status.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::Pending,
            Self::Processing,
            Self::Shipped,
            Self::Delivered,
            Self::Cancelled,
        ]
    }
}

impl LifecycleState for OrderStatus {
    const KIND: ResourceKind = ResourceKind::Order;

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Cancelled => &[],
        }
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "unknown order status '{value}'"
            ))),
        }
    }
}

/// Product publication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Editable working copy, invisible to the storefront.
    Draft,
    /// Submitted for review.
    Pending,
    /// Visible to the storefront.
    Published,
}

impl ProductStatus {
    /// Returns every declared product status.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Draft, Self::Pending, Self::Published]
    }
}

impl LifecycleState for ProductStatus {
    const KIND: ResourceKind = ResourceKind::Product;

    fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Published => "published",
        }
    }

    fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Pending, Self::Published],
            Self::Pending => &[Self::Draft, Self::Published],
            Self::Published => &[Self::Draft],
        }
    }
}

impl FromStr for ProductStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "published" => Ok(Self::Published),
            _ => Err(AppError::Validation(format!(
                "unknown product status '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use shopfront_core::AppError;

    use super::{LifecycleGuard, LifecycleState, OrderStatus, ProductStatus};

    #[test]
    fn declared_order_transitions_are_allowed() {
        let allowed = [
            (OrderStatus::Pending, OrderStatus::Processing),
            (OrderStatus::Pending, OrderStatus::Cancelled),
            (OrderStatus::Processing, OrderStatus::Shipped),
            (OrderStatus::Processing, OrderStatus::Cancelled),
            (OrderStatus::Shipped, OrderStatus::Delivered),
        ];
        for (current, requested) in allowed {
            let result = LifecycleGuard::new(current).change_state(requested);
            assert_eq!(result.ok(), Some(requested));
        }
    }

    #[test]
    fn shipped_order_cannot_return_to_pending() {
        let result = LifecycleGuard::new(OrderStatus::Shipped).change_state(OrderStatus::Pending);
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
    }

    #[test]
    fn terminal_order_states_have_no_outgoing_edges() {
        for current in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            for requested in OrderStatus::all() {
                let result = LifecycleGuard::new(current).change_state(*requested);
                assert!(result.is_err());
            }
        }
    }

    #[test]
    fn self_transitions_are_denied() {
        for status in OrderStatus::all() {
            assert!(LifecycleGuard::new(*status).change_state(*status).is_err());
        }
        for status in ProductStatus::all() {
            assert!(LifecycleGuard::new(*status).change_state(*status).is_err());
        }
    }

    #[test]
    fn published_product_can_only_return_to_draft() {
        let guard = LifecycleGuard::new(ProductStatus::Published);
        assert!(guard.change_state(ProductStatus::Draft).is_ok());
        assert!(guard.change_state(ProductStatus::Pending).is_err());
    }

    #[test]
    fn invalid_transition_reports_both_states() {
        let result = LifecycleGuard::new(OrderStatus::Shipped).change_state(OrderStatus::Pending);
        let Err(AppError::InvalidTransition { resource, from, to }) = result else {
            panic!("expected invalid transition");
        };
        assert_eq!(resource, "order");
        assert_eq!(from, "shipped");
        assert_eq!(to, "pending");
    }

    proptest! {
        #[test]
        fn order_guard_matches_transition_table(
            current_index in 0usize..5,
            requested_index in 0usize..5,
        ) {
            let current = OrderStatus::all()[current_index];
            let requested = OrderStatus::all()[requested_index];
            let listed = current.allowed_transitions().contains(&requested);
            let result = LifecycleGuard::new(current).change_state(requested);
            prop_assert_eq!(result.is_ok(), listed);
        }

        #[test]
        fn product_guard_matches_transition_table(
            current_index in 0usize..3,
            requested_index in 0usize..3,
        ) {
            let current = ProductStatus::all()[current_index];
            let requested = ProductStatus::all()[requested_index];
            let listed = current.allowed_transitions().contains(&requested);
            let result = LifecycleGuard::new(current).change_state(requested);
            prop_assert_eq!(result.is_ok(), listed);
        }
    }
}
