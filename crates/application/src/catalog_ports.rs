use shopfront_core::{ProviderId, UserId};
use shopfront_domain::{Brand, Category, Product, ProductStatus};
use uuid::Uuid;

use crate::Identified;

impl Identified for Product {
    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

impl Identified for Category {
    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

impl Identified for Brand {
    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

/// Boundary payload for product creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Display title.
    pub title: String,
    /// Unit price in the smallest currency denomination.
    pub price: i64,
    /// Units available in stock.
    pub quantity: i32,
    /// Initial publication status.
    pub status: ProductStatus,
    /// Owning brand, if assigned.
    pub brand_id: Option<Uuid>,
}

/// Gateway-facing product insert with ownership resolved from the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductInput {
    /// Display title.
    pub title: String,
    /// Unit price in the smallest currency denomination.
    pub price: i64,
    /// Units available in stock.
    pub quantity: i32,
    /// Initial publication status.
    pub status: ProductStatus,
    /// Owning brand, if assigned.
    pub brand_id: Option<Uuid>,
    /// Creating user, resolved from the subject.
    pub creator_id: UserId,
    /// Owning provider, resolved from the subject.
    pub provider_id: Option<ProviderId>,
}

/// Boundary payload for product updates.
///
/// `status: None` leaves the current status untouched; `Some` is validated
/// against the product lifecycle before any persistence side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProductInput {
    /// New display title.
    pub title: String,
    /// New unit price.
    pub price: i64,
    /// New stock quantity.
    pub quantity: i32,
    /// New owning brand.
    pub brand_id: Option<Uuid>,
    /// Requested publication status, if changing.
    pub status: Option<ProductStatus>,
}

/// Gateway-facing product update resolved by the product service.
///
/// `expected_status` is the status read before validation; the gateway
/// compares-and-swaps on it so a concurrent transition loses with a
/// conflict instead of silently winning last-write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPatch {
    /// New display title.
    pub title: String,
    /// New unit price.
    pub price: i64,
    /// New stock quantity.
    pub quantity: i32,
    /// New owning brand.
    pub brand_id: Option<Uuid>,
    /// Status to persist.
    pub status: ProductStatus,
    /// Status the row must still hold for the update to apply.
    pub expected_status: ProductStatus,
}

/// Typed filter for product queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Restrict to a title substring match.
    pub title: Option<String>,
    /// Restrict to one publication status.
    pub status: Option<ProductStatus>,
    /// Restrict to one brand.
    pub brand_id: Option<Uuid>,
}

/// Boundary payload for category creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCategoryInput {
    /// Unique category name.
    pub name: String,
}

/// Boundary payload for category updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPatch {
    /// New category name.
    pub name: String,
}

/// Typed filter for category queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Restrict to a name substring match.
    pub name: Option<String>,
}

/// Boundary payload for brand creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBrandInput {
    /// Unique brand name.
    pub name: String,
}

/// Boundary payload for brand updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandPatch {
    /// New brand name.
    pub name: String,
}

/// Typed filter for brand queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandFilter {
    /// Restrict to a name substring match.
    pub name: Option<String>,
}
