use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_core::{ProviderId, UserId};
use uuid::Uuid;

use crate::ProductStatus;

/// Catalog product row projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product identifier.
    pub id: Uuid,
    /// Display title shown in the storefront.
    pub title: String,
    /// Unit price in the smallest currency denomination.
    pub price: i64,
    /// Units available in stock.
    pub quantity: i32,
    /// Publication status governed by the product lifecycle.
    pub status: ProductStatus,
    /// Owning brand, if assigned.
    pub brand_id: Option<Uuid>,
    /// User that created the product.
    pub creator_id: UserId,
    /// Provider owning the product; `None` for platform-owned products.
    pub provider_id: Option<ProviderId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
