//! Wishlist repository.
//!
//! Same dual ownership model as the cart, without quantities.

use sqlx::{PgPool, Postgres, QueryBuilder};

use markethub_core::{ProductId, UserId, WishlistItemId};

use super::RepositoryError;
use crate::models::cart::{CartOwner, WishlistEntry};

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
struct WishlistEntryRow {
    id: i32,
    product_id: i32,
    product_name: String,
    product_slug: String,
    image_url: Option<String>,
    price: rust_decimal::Decimal,
    stock_quantity: i32,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<WishlistEntryRow> for WishlistEntry {
    fn from(row: WishlistEntryRow) -> Self {
        Self {
            id: WishlistItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            product_slug: row.product_slug,
            image_url: row.image_url,
            price: row.price,
            stock_quantity: row.stock_quantity,
            created_at: row.created_at,
        }
    }
}

/// Repository for wishlist operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the owner's wishlist entries joined with their products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, owner: &CartOwner) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let mut qb = QueryBuilder::new(
            "SELECT w.id, w.product_id, p.name AS product_name, p.slug AS product_slug, \
                    p.image_url, p.price, p.stock_quantity, w.created_at \
             FROM wishlist_items w \
             JOIN products p ON p.id = w.product_id \
             WHERE w.",
        );
        push_owner(&mut qb, owner);
        qb.push(" ORDER BY w.created_at DESC, w.id DESC");

        let rows: Vec<WishlistEntryRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(WishlistEntry::from).collect())
    }

    /// Save a product to the wishlist. Saving twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("SELECT id FROM wishlist_items WHERE product_id = ");
        qb.push_bind(product_id.as_i32());
        qb.push(" AND ");
        push_owner(&mut qb, owner);
        let existing: Option<i32> = qb.build_query_scalar().fetch_optional(self.pool).await?;

        if existing.is_some() {
            return Ok(());
        }

        match owner {
            CartOwner::User(user_id) => {
                sqlx::query("INSERT INTO wishlist_items (user_id, product_id) VALUES ($1, $2)")
                    .bind(user_id.as_i32())
                    .bind(product_id.as_i32())
                    .execute(self.pool)
                    .await?;
            }
            CartOwner::Guest(token) => {
                sqlx::query("INSERT INTO wishlist_items (cart_token, product_id) VALUES ($1, $2)")
                    .bind(token)
                    .bind(product_id.as_i32())
                    .execute(self.pool)
                    .await?;
            }
        }

        Ok(())
    }

    /// Remove a product from the wishlist. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("DELETE FROM wishlist_items WHERE product_id = ");
        qb.push_bind(product_id.as_i32());
        qb.push(" AND ");
        push_owner(&mut qb, owner);

        qb.build().execute(self.pool).await?;
        Ok(())
    }

    /// Number of saved products (for the header badge).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, owner: &CartOwner) -> Result<i64, RepositoryError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM wishlist_items WHERE ");
        push_owner(&mut qb, owner);

        let count: i64 = qb.build_query_scalar().fetch_one(self.pool).await?;
        Ok(count)
    }

    /// Fold a guest wishlist into a user's wishlist after login.
    ///
    /// Duplicate products are dropped; remaining guest rows are reassigned.
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

        sqlx::query(
            "DELETE FROM wishlist_items AS g \
             WHERE g.cart_token = $2 \
               AND EXISTS (SELECT 1 FROM wishlist_items AS u \
                           WHERE u.user_id = $1 AND u.product_id = g.product_id)",
        )
        .bind(user_id.as_i32())
        .bind(cart_token)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE wishlist_items SET user_id = $1, cart_token = NULL WHERE cart_token = $2",
        )
        .bind(user_id.as_i32())
        .bind(cart_token)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
