//! Order domain types.
//!
//! Order items snapshot the product name and unit price at purchase time;
//! later catalog edits never change what an order shows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use markethub_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Public order reference shown to the customer (e.g., "MH-20260806-4F7K2").
    pub order_number: String,
    pub status: OrderStatus,
    /// Contact email for the confirmation.
    pub email: String,
    pub shipping_name: String,
    pub shipping_address1: String,
    pub shipping_address2: Option<String>,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A line on a placed order.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Vendor who sold this line.
    pub vendor_id: UserId,
    /// Product name at purchase time.
    pub product_name: String,
    /// Unit price at purchase time.
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

/// Data for a new order row.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub order_number: String,
    pub email: String,
    pub shipping_name: String,
    pub shipping_address1: String,
    pub shipping_address2: Option<String>,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub subtotal: Decimal,
    pub total: Decimal,
}

/// Data for a new order line.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub vendor_id: UserId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}
