//! Catalog domain types: categories, vendor stores, and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use markethub_core::{CategoryId, ProductId, ProductStatus, UserId, VendorStoreId};

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    /// Parent category for nested trees; top-level categories have none.
    pub parent_id: Option<CategoryId>,
    /// Number of active products in this category (filled by list queries).
    pub product_count: i64,
}

/// A vendor's store profile.
#[derive(Debug, Clone)]
pub struct VendorStore {
    pub id: VendorStoreId,
    /// The vendor user who owns this store.
    pub vendor_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Number of active products listed by this store (filled by list queries).
    pub product_count: i64,
}

/// A full product row (detail pages, checkout).
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub vendor_id: UserId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    /// Original price when the product is on sale.
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active && self.stock_quantity > 0
    }
}

/// A product as it appears in listings, joined with its category and store.
#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub category_name: String,
    pub category_slug: String,
    pub store_name: String,
    pub store_slug: String,
}

impl ProductSummary {
    /// Whether the product can currently be added to a cart.
    ///
    /// Listings only contain active products, so stock is the only check.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.stock_quantity > 0
    }
}
