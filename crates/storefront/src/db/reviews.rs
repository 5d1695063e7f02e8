//! Product review repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use markethub_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::review::{RatingSummary, Review};

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    user_id: i32,
    reviewer_name: String,
    rating: i16,
    title: Option<String>,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            reviewer_name: row.reviewer_name,
            rating: row.rating,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List reviews for a product, newest first, with reviewer names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            "SELECT r.id, r.product_id, r.user_id, \
                    TRIM(u.first_name || ' ' || u.last_name) AS reviewer_name, \
                    r.rating, r.title, r.body, r.created_at \
             FROM product_reviews r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.product_id = $1 \
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(product_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Average rating and review count for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<RatingSummary, RepositoryError> {
        let row: (Option<Decimal>, i64) = sqlx::query_as(
            "SELECT AVG(rating), COUNT(*) FROM product_reviews WHERE product_id = $1",
        )
        .bind(product_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(RatingSummary {
            average: row.0,
            count: row.1,
        })
    }

    /// Create or replace the user's review for a product.
    ///
    /// One review per (product, user): a second submission overwrites the
    /// first instead of adding a row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: i16,
        title: Option<&str>,
        body: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product_reviews (product_id, user_id, rating, title, body) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (product_id, user_id) \
             DO UPDATE SET rating = EXCLUDED.rating, title = EXCLUDED.title, \
                           body = EXCLUDED.body, created_at = now()",
        )
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .bind(rating)
        .bind(title)
        .bind(body)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
