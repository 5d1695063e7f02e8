//! Checkout service: turns a cart into an order.
//!
//! The flow is the one the storefront has always had: validate the shipping
//! form, snapshot the cart lines into order items, and hand the whole batch
//! to `OrderRepository::create`, which commits the order, the stock
//! decrements, and the cart clear in one transaction.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use crate::db::{CartRepository, OrderRepository, RepositoryError};
use crate::models::cart::{CartLine, CartOwner};
use crate::models::order::{NewOrder, NewOrderItem, Order};
use crate::models::user::User;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A shipping form field failed validation.
    #[error("invalid {0}")]
    Validation(&'static str),

    /// A product no longer has enough stock; nothing was committed.
    #[error("{0}")]
    OutOfStock(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Shipping details captured from the checkout form.
#[derive(Debug, Clone)]
pub struct ShippingDetails {
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingDetails {
    /// Validate that all required fields are present.
    fn validate(&self) -> Result<(), CheckoutError> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::Validation("name"));
        }
        if self.address1.trim().is_empty() {
            return Err(CheckoutError::Validation("address"));
        }
        if self.city.trim().is_empty() {
            return Err(CheckoutError::Validation("city"));
        }
        if self.postal_code.trim().is_empty() {
            return Err(CheckoutError::Validation("postal code"));
        }
        if self.country.trim().is_empty() {
            return Err(CheckoutError::Validation("country"));
        }
        Ok(())
    }
}

/// Checkout service.
pub struct CheckoutService<'a> {
    cart: CartRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            cart: CartRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order from the user's current cart.
    ///
    /// On success the cart is empty, stock is decremented, and the returned
    /// order carries the price/name snapshots.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there is nothing to buy.
    /// Returns `CheckoutError::Validation` if a shipping field is missing.
    /// Returns `CheckoutError::OutOfStock` if any line exceeds current stock
    /// (the transaction rolls back; the cart is untouched).
    pub async fn place_order(
        &self,
        user: &User,
        shipping: &ShippingDetails,
    ) -> Result<Order, CheckoutError> {
        shipping.validate()?;

        let lines = self.cart.items(&CartOwner::User(user.id)).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let items = order_items_from_lines(&lines);
        let subtotal = order_subtotal(&items);

        let new_order = NewOrder {
            user_id: user.id,
            order_number: generate_order_number(),
            email: user.email.as_str().to_owned(),
            shipping_name: shipping.name.trim().to_owned(),
            shipping_address1: shipping.address1.trim().to_owned(),
            shipping_address2: shipping
                .address2
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned),
            shipping_city: shipping.city.trim().to_owned(),
            shipping_postal_code: shipping.postal_code.trim().to_owned(),
            shipping_country: shipping.country.trim().to_owned(),
            subtotal,
            total: subtotal,
        };

        let order = self
            .orders
            .create(&new_order, &items)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => CheckoutError::OutOfStock(msg),
                other => CheckoutError::Repository(other),
            })?;

        tracing::info!(
            order_number = %order.order_number,
            user_id = %order.user_id,
            total = %order.total,
            "Order placed"
        );

        Ok(order)
    }
}

/// Snapshot cart lines into order items.
fn order_items_from_lines(lines: &[CartLine]) -> Vec<NewOrderItem> {
    lines
        .iter()
        .map(|line| NewOrderItem {
            product_id: line.product_id,
            vendor_id: line.vendor_id,
            product_name: line.product_name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total(),
        })
        .collect()
}

/// Sum of line totals.
fn order_subtotal(items: &[NewOrderItem]) -> Decimal {
    items.iter().map(|item| item.line_total).sum()
}

/// Generate a public order number, e.g. "MH-20260806-4F7K2".
///
/// The random suffix avoids guessable sequential references; uniqueness is
/// enforced by the database constraint.
fn generate_order_number() -> String {
    use rand::Rng;

    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    let mut rng = rand::rng();
    let suffix: String = (0..5)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            char::from(ALPHABET[idx])
        })
        .collect();

    let date = chrono::Utc::now().format("%Y%m%d");
    format!("MH-{date}-{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use markethub_core::{CartItemId, ProductId, UserId};

    use super::*;

    fn line(product: i32, unit_cents: i64, quantity: i32) -> CartLine {
        CartLine {
            id: CartItemId::new(product),
            product_id: ProductId::new(product),
            vendor_id: UserId::new(50),
            product_name: format!("Product {product}"),
            product_slug: format!("product-{product}"),
            image_url: None,
            unit_price: Decimal::new(unit_cents, 2),
            quantity,
            stock_quantity: 100,
        }
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            name: "Jo March".to_owned(),
            address1: "1 Orchard House".to_owned(),
            address2: None,
            city: "Concord".to_owned(),
            postal_code: "01742".to_owned(),
            country: "US".to_owned(),
        }
    }

    #[test]
    fn test_order_items_snapshot_cart_lines() {
        let lines = vec![line(1, 1250, 2), line(2, 399, 1)];
        let items = order_items_from_lines(&lines);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_name, "Product 1");
        assert_eq!(items[0].line_total, Decimal::new(2500, 2));
        assert_eq!(items[1].line_total, Decimal::new(399, 2));
    }

    #[test]
    fn test_subtotal_sums_line_totals() {
        let items = order_items_from_lines(&[line(1, 1250, 2), line(2, 399, 1)]);
        assert_eq!(order_subtotal(&items), Decimal::new(2899, 2));
    }

    #[test]
    fn test_shipping_validation_rejects_blank_fields() {
        let mut details = shipping();
        details.city = "   ".to_owned();
        assert!(matches!(
            details.validate(),
            Err(CheckoutError::Validation("city"))
        ));

        assert!(shipping().validate().is_ok());
    }

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number();
        let mut parts = number.split('-');

        assert_eq!(parts.next(), Some("MH"));
        let date = parts.next().unwrap();
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));
        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), 5);
        assert!(parts.next().is_none());
    }
}
