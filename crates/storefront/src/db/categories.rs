//! Category repository.

use sqlx::PgPool;

use markethub_core::{CategoryId, ProductStatus};

use super::RepositoryError;
use crate::models::catalog::Category;

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    slug: String,
    parent_id: Option<i32>,
    product_count: i64,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            parent_id: row.parent_id.map(CategoryId::new),
            product_count: row.product_count,
        }
    }
}

/// Repository for category queries.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories with their active product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT c.id, c.name, c.slug, c.parent_id, \
                    COUNT(p.id) FILTER (WHERE p.status = $1) AS product_count \
             FROM categories c \
             LEFT JOIN products p ON p.category_id = c.id \
             GROUP BY c.id, c.name, c.slug, c.parent_id \
             ORDER BY c.name ASC",
        )
        .bind(ProductStatus::Active.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT c.id, c.name, c.slug, c.parent_id, \
                    COUNT(p.id) FILTER (WHERE p.status = $1) AS product_count \
             FROM categories c \
             LEFT JOIN products p ON p.category_id = c.id \
             WHERE c.slug = $2 \
             GROUP BY c.id, c.name, c.slug, c.parent_id",
        )
        .bind(ProductStatus::Active.as_str())
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Category::from))
    }
}
