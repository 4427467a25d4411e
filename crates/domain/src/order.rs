use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_core::{ProviderId, UserId};
use uuid::Uuid;

use crate::OrderStatus;

/// Customer order row projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Stable order identifier.
    pub id: Uuid,
    /// Fulfilment status governed by the order lifecycle.
    pub status: OrderStatus,
    /// Order total in the smallest currency denomination.
    pub total_price: i64,
    /// Customer that placed the order; `None` for guest checkouts.
    pub customer_id: Option<UserId>,
    /// Provider fulfilling the order, if provider-scoped.
    pub provider_id: Option<ProviderId>,
    /// Free-form operator remark.
    pub remark: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
