//! Product repository: catalog listing, filtering, and detail queries.
//!
//! Listing queries are assembled with `sqlx::QueryBuilder`, appending a
//! clause per present filter. Sort keys map to fixed `ORDER BY` fragments;
//! user input is only ever bound, never spliced into the SQL text.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use markethub_core::{CategoryId, ProductId, ProductStatus, UserId, VendorStoreId};

use super::RepositoryError;
use crate::models::catalog::{Category, Product, ProductSummary, VendorStore};

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    /// Parse a `sort` query parameter, defaulting to newest-first.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "name" => Self::Name,
            _ => Self::Newest,
        }
    }

    /// The `sort` query parameter value.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Name => "name",
        }
    }

    /// The ORDER BY fragment for this sort. Always a fixed string.
    const fn order_clause(&self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC, p.id DESC",
            Self::PriceAsc => "p.price ASC, p.id ASC",
            Self::PriceDesc => "p.price DESC, p.id ASC",
            Self::Name => "p.name ASC, p.id ASC",
        }
    }
}

/// Filters for catalog listing queries.
///
/// Every field is optional; absent fields append no SQL.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to a category by slug.
    pub category_slug: Option<String>,
    /// Restrict to a vendor store by slug.
    pub store_slug: Option<String>,
    /// Keyword search over name and description (ILIKE).
    pub query: Option<String>,
    /// Minimum price, inclusive.
    pub min_price: Option<Decimal>,
    /// Maximum price, inclusive.
    pub max_price: Option<Decimal>,
    /// Sort order.
    pub sort: ProductSort,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
}

impl ProductFilter {
    /// Default page size for catalog pages.
    pub const DEFAULT_PER_PAGE: u32 = 12;

    /// Effective page (1-based; zero is treated as the first page).
    #[must_use]
    pub const fn page(&self) -> u32 {
        if self.page == 0 { 1 } else { self.page }
    }

    /// Effective page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        if self.per_page == 0 {
            Self::DEFAULT_PER_PAGE
        } else {
            self.per_page
        }
    }

    /// OFFSET for the effective page.
    const fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.per_page() as i64
    }
}

const SUMMARY_SELECT: &str = "SELECT p.id, p.name, p.slug, p.price, p.compare_at_price, \
     p.stock_quantity, p.image_url, \
     c.name AS category_name, c.slug AS category_slug, \
     s.name AS store_name, s.slug AS store_slug \
     FROM products p \
     JOIN categories c ON c.id = p.category_id \
     JOIN vendor_stores s ON s.vendor_id = p.vendor_id";

/// Append the WHERE clauses implied by `filter` to a listing query.
///
/// Shared between the listing and the count query so both always agree.
fn push_filters<'args>(qb: &mut QueryBuilder<'args, Postgres>, filter: &'args ProductFilter) {
    qb.push(" WHERE p.status = ");
    qb.push_bind(ProductStatus::Active.as_str());

    if let Some(category) = &filter.category_slug {
        qb.push(" AND c.slug = ");
        qb.push_bind(category);
    }
    if let Some(store) = &filter.store_slug {
        qb.push(" AND s.slug = ");
        qb.push_bind(store);
    }
    if let Some(query) = &filter.query {
        let pattern = format!("%{query}%");
        qb.push(" AND (p.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND p.price >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND p.price <= ");
        qb.push_bind(max);
    }
}

/// Build the full listing query for a filter.
fn build_list_query(filter: &ProductFilter) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(SUMMARY_SELECT);
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY ");
    qb.push(filter.sort.order_clause());
    qb.push(" LIMIT ");
    qb.push_bind(i64::from(filter.per_page()));
    qb.push(" OFFSET ");
    qb.push_bind(filter.offset());
    qb
}

/// Build the matching COUNT query for a filter.
fn build_count_query(filter: &ProductFilter) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT COUNT(*) FROM products p \
         JOIN categories c ON c.id = p.category_id \
         JOIN vendor_stores s ON s.vendor_id = p.vendor_id",
    );
    push_filters(&mut qb, filter);
    qb
}

/// Raw listing row.
#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i32,
    name: String,
    slug: String,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    stock_quantity: i32,
    image_url: Option<String>,
    category_name: String,
    category_slug: String,
    store_name: String,
    store_slug: String,
}

impl From<SummaryRow> for ProductSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug: row.slug,
            price: row.price,
            compare_at_price: row.compare_at_price,
            stock_quantity: row.stock_quantity,
            image_url: row.image_url,
            category_name: row.category_name,
            category_slug: row.category_slug,
            store_name: row.store_name,
            store_slug: row.store_slug,
        }
    }
}

/// Raw `products` row.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    vendor_id: i32,
    category_id: i32,
    name: String,
    slug: String,
    description: String,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    stock_quantity: i32,
    status: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let status: ProductStatus = self
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;

        Ok(Product {
            id: ProductId::new(self.id),
            vendor_id: UserId::new(self.vendor_id),
            category_id: CategoryId::new(self.category_id),
            name: self.name,
            slug: self.slug,
            description: self.description,
            price: self.price,
            compare_at_price: self.compare_at_price,
            stock_quantity: self.stock_quantity,
            status,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, vendor_id, category_id, name, slug, description, price, \
     compare_at_price, stock_quantity, status, image_url, created_at, updated_at";

/// Detail row joining the product with its category and store.
#[derive(sqlx::FromRow)]
struct DetailRow {
    #[sqlx(flatten)]
    product: ProductRow,
    c_name: String,
    c_slug: String,
    c_parent_id: Option<i32>,
    s_id: i32,
    s_name: String,
    s_slug: String,
    s_description: Option<String>,
    s_created_at: DateTime<Utc>,
}

/// A product detail page's data: the product plus its category and store.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub category: Category,
    pub store: VendorStore,
}

/// Repository for catalog queries.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products matching a filter, paginated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<ProductSummary>, RepositoryError> {
        let mut qb = build_list_query(filter);
        let rows: Vec<SummaryRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(ProductSummary::from).collect())
    }

    /// Count active products matching a filter (ignores pagination).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let mut qb = build_count_query(filter);
        let count: i64 = qb.build_query_scalar().fetch_one(self.pool).await?;
        Ok(count)
    }

    /// Get a product with its category and store by slug.
    ///
    /// Inactive products are not returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored status is invalid.
    pub async fn get_detail_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, DetailRow>(
            "SELECT p.id, p.vendor_id, p.category_id, p.name, p.slug, p.description, \
                    p.price, p.compare_at_price, p.stock_quantity, p.status, p.image_url, \
                    p.created_at, p.updated_at, \
                    c.name AS c_name, c.slug AS c_slug, c.parent_id AS c_parent_id, \
                    s.id AS s_id, s.name AS s_name, s.slug AS s_slug, \
                    s.description AS s_description, s.created_at AS s_created_at \
             FROM products p \
             JOIN categories c ON c.id = p.category_id \
             JOIN vendor_stores s ON s.vendor_id = p.vendor_id \
             WHERE p.slug = $1 AND p.status = $2",
        )
        .bind(slug)
        .bind(ProductStatus::Active.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let category = Category {
            id: CategoryId::new(row.product.category_id),
            name: row.c_name,
            slug: row.c_slug,
            parent_id: row.c_parent_id.map(CategoryId::new),
            product_count: 0,
        };
        let store = VendorStore {
            id: VendorStoreId::new(row.s_id),
            vendor_id: UserId::new(row.product.vendor_id),
            name: row.s_name,
            slug: row.s_slug,
            description: row.s_description,
            created_at: row.s_created_at,
            product_count: 0,
        };
        let product = row.product.into_product()?;

        Ok(Some(ProductDetail {
            product,
            category,
            store,
        }))
    }

    /// Get a product row by ID (any status).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored status is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// List active products by ID, preserving no particular order.
    ///
    /// Used by the comparison page to join the session-held ID list
    /// against the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows: Vec<SummaryRow> = sqlx::query_as(&format!(
            "{SUMMARY_SELECT} WHERE p.status = $1 AND p.id = ANY($2)"
        ))
        .bind(ProductStatus::Active.as_str())
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductSummary::from).collect())
    }

    /// List other active products in the same category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(&format!(
            "{SUMMARY_SELECT} \
             WHERE p.status = $1 AND p.category_id = $2 AND p.id <> $3 \
             ORDER BY p.created_at DESC LIMIT $4"
        ))
        .bind(ProductStatus::Active.as_str())
        .bind(category_id)
        .bind(exclude)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductSummary::from).collect())
    }

    /// List the newest active products for the home page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn newest(&self, limit: i64) -> Result<Vec<ProductSummary>, RepositoryError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(&format!(
            "{SUMMARY_SELECT} WHERE p.status = $1 ORDER BY p.created_at DESC, p.id DESC LIMIT $2"
        ))
        .bind(ProductStatus::Active.as_str())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductSummary::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_appends_no_extra_clauses() {
        let filter = ProductFilter::default();
        let sql = build_list_query(&filter).into_sql();

        assert!(sql.contains("WHERE p.status ="));
        assert!(!sql.contains("c.slug ="));
        assert!(!sql.contains("s.slug ="));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("p.price >="));
        assert!(!sql.contains("p.price <="));
        assert!(sql.contains("ORDER BY p.created_at DESC"));
        assert!(sql.contains("LIMIT"));
        assert!(sql.contains("OFFSET"));
    }

    #[test]
    fn test_full_filter_appends_every_clause() {
        let filter = ProductFilter {
            category_slug: Some("electronics".to_owned()),
            store_slug: Some("acme".to_owned()),
            query: Some("lamp".to_owned()),
            min_price: Some(Decimal::new(1000, 2)),
            max_price: Some(Decimal::new(5000, 2)),
            sort: ProductSort::PriceAsc,
            page: 2,
            per_page: 24,
        };
        let sql = build_list_query(&filter).into_sql();

        assert!(sql.contains("c.slug ="));
        assert!(sql.contains("s.slug ="));
        assert!(sql.contains("p.name ILIKE"));
        assert!(sql.contains("p.description ILIKE"));
        assert!(sql.contains("p.price >="));
        assert!(sql.contains("p.price <="));
        assert!(sql.contains("ORDER BY p.price ASC"));
    }

    #[test]
    fn test_count_query_has_no_pagination() {
        let filter = ProductFilter {
            query: Some("desk".to_owned()),
            ..ProductFilter::default()
        };
        let sql = build_count_query(&filter).into_sql();

        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(sql.contains("ILIKE"));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn test_filter_pagination_defaults() {
        let filter = ProductFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.per_page(), ProductFilter::DEFAULT_PER_PAGE);
        assert_eq!(filter.offset(), 0);

        let filter = ProductFilter {
            page: 3,
            per_page: 10,
            ..ProductFilter::default()
        };
        assert_eq!(filter.offset(), 20);
    }

    #[test]
    fn test_sort_key_roundtrip() {
        for sort in [
            ProductSort::Newest,
            ProductSort::PriceAsc,
            ProductSort::PriceDesc,
            ProductSort::Name,
        ] {
            assert_eq!(ProductSort::from_key(sort.key()), sort);
        }
        // Unknown keys fall back to newest
        assert_eq!(ProductSort::from_key("sideways"), ProductSort::Newest);
    }
}
