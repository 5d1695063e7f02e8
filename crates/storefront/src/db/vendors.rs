//! Vendor store repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use markethub_core::{ProductStatus, UserId, VendorStoreId};

use super::RepositoryError;
use crate::models::catalog::VendorStore;

#[derive(sqlx::FromRow)]
struct VendorStoreRow {
    id: i32,
    vendor_id: i32,
    name: String,
    slug: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    product_count: i64,
}

impl From<VendorStoreRow> for VendorStore {
    fn from(row: VendorStoreRow) -> Self {
        Self {
            id: VendorStoreId::new(row.id),
            vendor_id: UserId::new(row.vendor_id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
            product_count: row.product_count,
        }
    }
}

const STORE_SELECT: &str = "SELECT s.id, s.vendor_id, s.name, s.slug, s.description, s.created_at, \
     COUNT(p.id) FILTER (WHERE p.status = $1) AS product_count \
     FROM vendor_stores s \
     LEFT JOIN products p ON p.vendor_id = s.vendor_id";

/// Repository for vendor store queries.
pub struct VendorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VendorRepository<'a> {
    /// Create a new vendor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all vendor stores with their active product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<VendorStore>, RepositoryError> {
        let rows: Vec<VendorStoreRow> = sqlx::query_as(&format!(
            "{STORE_SELECT} \
             GROUP BY s.id, s.vendor_id, s.name, s.slug, s.description, s.created_at \
             ORDER BY s.name ASC"
        ))
        .bind(ProductStatus::Active.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(VendorStore::from).collect())
    }

    /// Get a vendor store by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<VendorStore>, RepositoryError> {
        let row: Option<VendorStoreRow> = sqlx::query_as(&format!(
            "{STORE_SELECT} \
             WHERE s.slug = $2 \
             GROUP BY s.id, s.vendor_id, s.name, s.slug, s.description, s.created_at"
        ))
        .bind(ProductStatus::Active.as_str())
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(VendorStore::from))
    }
}
