//! Cart and wishlist domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use markethub_core::{CartItemId, ProductId, UserId, WishlistItemId};

/// Who owns a cart or wishlist row.
///
/// Logged-in customers own rows by user id; guests own rows by the random
/// token held in their session. On login the guest rows are merged into
/// the user's rows.
#[derive(Debug, Clone)]
pub enum CartOwner {
    /// A logged-in user.
    User(UserId),
    /// An anonymous session, identified by its cart token.
    Guest(String),
}

/// One cart line joined with its product.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    /// Vendor who sells the product (snapshotted onto order items).
    pub vendor_id: UserId,
    pub product_name: String,
    pub product_slug: String,
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    /// Current stock, used to clamp quantity updates in the UI.
    pub stock_quantity: i32,
}

impl CartLine {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// One wishlist entry joined with its product.
#[derive(Debug, Clone)]
pub struct WishlistEntry {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let line = CartLine {
            id: CartItemId::new(1),
            product_id: ProductId::new(2),
            vendor_id: UserId::new(9),
            product_name: "Walnut Desk Organizer".to_owned(),
            product_slug: "walnut-desk-organizer".to_owned(),
            image_url: None,
            unit_price: Decimal::new(1250, 2), // 12.50
            quantity: 3,
            stock_quantity: 10,
        };
        assert_eq!(line.line_total(), Decimal::new(3750, 2));
    }
}
