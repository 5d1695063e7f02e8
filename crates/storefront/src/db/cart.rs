//! Cart repository.
//!
//! Cart rows are owned either by a user id (logged in) or by the session's
//! cart token (guest). `CartOwner` picks the column; everything else is
//! plain row CRUD.

use sqlx::{PgPool, Postgres, QueryBuilder};

use markethub_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{CartLine, CartOwner};

/// Append the ownership predicate for `owner` (no leading WHERE/AND).
fn push_owner<'args>(qb: &mut QueryBuilder<'args, Postgres>, owner: &'args CartOwner) {
    match owner {
        CartOwner::User(id) => {
            qb.push("user_id = ");
            qb.push_bind(id.as_i32());
        }
        CartOwner::Guest(token) => {
            qb.push("cart_token = ");
            qb.push_bind(token);
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    product_id: i32,
    vendor_id: i32,
    product_name: String,
    product_slug: String,
    image_url: Option<String>,
    unit_price: rust_decimal::Decimal,
    quantity: i32,
    stock_quantity: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            vendor_id: UserId::new(row.vendor_id),
            product_name: row.product_name,
            product_slug: row.product_slug,
            image_url: row.image_url,
            unit_price: row.unit_price,
            quantity: row.quantity,
            stock_quantity: row.stock_quantity,
        }
    }
}

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the owner's cart lines joined with their products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, owner: &CartOwner) -> Result<Vec<CartLine>, RepositoryError> {
        let mut qb = QueryBuilder::new(
            "SELECT ci.id, ci.product_id, p.vendor_id, p.name AS product_name, p.slug AS product_slug, \
                    p.image_url, p.price AS unit_price, ci.quantity, p.stock_quantity \
             FROM cart_items ci \
             JOIN products p ON p.id = ci.product_id \
             WHERE ci.",
        );
        push_owner(&mut qb, owner);
        qb.push(" ORDER BY ci.created_at ASC, ci.id ASC");

        let rows: Vec<CartLineRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Add a product to the cart, summing quantities if it is already there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("SELECT id FROM cart_items WHERE product_id = ");
        qb.push_bind(product_id.as_i32());
        qb.push(" AND ");
        push_owner(&mut qb, owner);
        let existing: Option<i32> = qb.build_query_scalar().fetch_optional(self.pool).await?;

        if let Some(item_id) = existing {
            sqlx::query(
                "UPDATE cart_items SET quantity = quantity + $2, updated_at = now() WHERE id = $1",
            )
            .bind(item_id)
            .bind(quantity)
            .execute(self.pool)
            .await?;
            return Ok(());
        }

        match owner {
            CartOwner::User(user_id) => {
                sqlx::query(
                    "INSERT INTO cart_items (user_id, product_id, quantity) VALUES ($1, $2, $3)",
                )
                .bind(user_id.as_i32())
                .bind(product_id.as_i32())
                .bind(quantity)
                .execute(self.pool)
                .await?;
            }
            CartOwner::Guest(token) => {
                sqlx::query(
                    "INSERT INTO cart_items (cart_token, product_id, quantity) VALUES ($1, $2, $3)",
                )
                .bind(token)
                .bind(product_id.as_i32())
                .bind(quantity)
                .execute(self.pool)
                .await?;
            }
        }

        Ok(())
    }

    /// Set the quantity for a product; a quantity of zero removes the row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_quantity(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if quantity <= 0 {
            return self.remove(owner, product_id).await;
        }

        let mut qb = QueryBuilder::new("UPDATE cart_items SET quantity = ");
        qb.push_bind(quantity);
        qb.push(", updated_at = now() WHERE product_id = ");
        qb.push_bind(product_id.as_i32());
        qb.push(" AND ");
        push_owner(&mut qb, owner);

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a product from the cart. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("DELETE FROM cart_items WHERE product_id = ");
        qb.push_bind(product_id.as_i32());
        qb.push(" AND ");
        push_owner(&mut qb, owner);

        qb.build().execute(self.pool).await?;
        Ok(())
    }

    /// Delete every row in the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, owner: &CartOwner) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("DELETE FROM cart_items WHERE ");
        push_owner(&mut qb, owner);

        qb.build().execute(self.pool).await?;
        Ok(())
    }

    /// Total quantity across the owner's cart (for the header badge).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, owner: &CartOwner) -> Result<i64, RepositoryError> {
        let mut qb =
            QueryBuilder::new("SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE ");
        push_owner(&mut qb, owner);

        let count: i64 = qb.build_query_scalar().fetch_one(self.pool).await?;
        Ok(count)
    }

    /// Fold a guest cart into a user's cart after login.
    ///
    /// Quantities are summed where both carts hold the same product;
    /// remaining guest rows are reassigned to the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn merge_guest_into_user(
        &self,
        cart_token: &str,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Sum quantities into rows the user already has
        sqlx::query(
            "UPDATE cart_items AS u \
             SET quantity = u.quantity + g.quantity, updated_at = now() \
             FROM cart_items AS g \
             WHERE u.user_id = $1 AND g.cart_token = $2 AND u.product_id = g.product_id",
        )
        .bind(user_id.as_i32())
        .bind(cart_token)
        .execute(&mut *tx)
        .await?;

        // Drop guest rows that were just merged
        sqlx::query(
            "DELETE FROM cart_items AS g \
             WHERE g.cart_token = $2 \
               AND EXISTS (SELECT 1 FROM cart_items AS u \
                           WHERE u.user_id = $1 AND u.product_id = g.product_id)",
        )
        .bind(user_id.as_i32())
        .bind(cart_token)
        .execute(&mut *tx)
        .await?;

        // Claim whatever is left
        sqlx::query(
            "UPDATE cart_items SET user_id = $1, cart_token = NULL, updated_at = now() \
             WHERE cart_token = $2",
        )
        .bind(user_id.as_i32())
        .bind(cart_token)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
