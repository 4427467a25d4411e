use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_core::UserId;
use uuid::Uuid;

/// Customer delivery or billing address row projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAddress {
    /// Stable address identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Street address including house number.
    pub full_address: String,
    /// Township name.
    pub township: String,
    /// Region name.
    pub region: String,
    /// Contact phone number.
    pub phone: String,
    /// Whether this is the user's default address.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
