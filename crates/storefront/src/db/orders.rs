//! Order repository.
//!
//! `create` is the checkout transaction: the order row, its item rows, the
//! stock decrements, and the cart clear all commit or roll back together.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use markethub_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{NewOrder, NewOrderItem, Order, OrderItem};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    order_number: String,
    status: String,
    email: String,
    shipping_name: String,
    shipping_address1: String,
    shipping_address2: Option<String>,
    shipping_city: String,
    shipping_postal_code: String,
    shipping_country: String,
    subtotal: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            order_number: self.order_number,
            status,
            email: self.email,
            shipping_name: self.shipping_name,
            shipping_address1: self.shipping_address1,
            shipping_address2: self.shipping_address2,
            shipping_city: self.shipping_city,
            shipping_postal_code: self.shipping_postal_code,
            shipping_country: self.shipping_country,
            subtotal: self.subtotal,
            total: self.total,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    vendor_id: i32,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
    line_total: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            vendor_id: UserId::new(row.vendor_id),
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
            line_total: row.line_total,
        }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, order_number, status, email, shipping_name, \
     shipping_address1, shipping_address2, shipping_city, shipping_postal_code, \
     shipping_country, subtotal, total, created_at";

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order: insert the order and its items, decrement stock, and
    /// clear the buyer's cart, all in one transaction.
    ///
    /// Stock is decremented with a conditional UPDATE
    /// (`... WHERE stock_quantity >= quantity`), so two concurrent checkouts
    /// can never drive stock negative; the later one fails and rolls back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` with the product name if any item
    /// no longer has sufficient stock (the whole order rolls back).
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(
        &self,
        new_order: &NewOrder,
        items: &[NewOrderItem],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (user_id, order_number, status, email, shipping_name, \
                                 shipping_address1, shipping_address2, shipping_city, \
                                 shipping_postal_code, shipping_country, subtotal, total) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new_order.user_id.as_i32())
        .bind(&new_order.order_number)
        .bind(OrderStatus::Pending.as_str())
        .bind(&new_order.email)
        .bind(&new_order.shipping_name)
        .bind(&new_order.shipping_address1)
        .bind(&new_order.shipping_address2)
        .bind(&new_order.shipping_city)
        .bind(&new_order.shipping_postal_code)
        .bind(&new_order.shipping_country)
        .bind(new_order.subtotal)
        .bind(new_order.total)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            // Conditional decrement: refuses to oversell under concurrency
            let result = sqlx::query(
                "UPDATE products \
                 SET stock_quantity = stock_quantity - $2, updated_at = now() \
                 WHERE id = $1 AND stock_quantity >= $2",
            )
            .bind(item.product_id.as_i32())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls everything back
                return Err(RepositoryError::Conflict(format!(
                    "insufficient stock for {}",
                    item.product_name
                )));
            }

            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, vendor_id, product_name, \
                                          unit_price, quantity, line_total) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(order_row.id)
            .bind(item.product_id.as_i32())
            .bind(item.vendor_id.as_i32())
            .bind(&item.product_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(new_order.user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        order_row.into_order()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Get one of the user's orders by its public order number, with items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_number_for_user(
        &self,
        order_number: &str,
        user_id: UserId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1 AND user_id = $2"
        ))
        .bind(order_number)
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = row.into_order()?;

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT id, order_id, product_id, vendor_id, product_name, unit_price, \
                    quantity, line_total \
             FROM order_items WHERE order_id = $1 ORDER BY id ASC",
        )
        .bind(order.id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some((
            order,
            item_rows.into_iter().map(OrderItem::from).collect(),
        )))
    }

    /// Number of orders a user has placed (dashboard stat).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id.as_i32())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
