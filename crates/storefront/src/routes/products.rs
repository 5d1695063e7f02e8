//! Catalog route handlers: product listing, detail, and reviews.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use crate::db::{
    CategoryRepository, ProductFilter, ProductRepository, ProductSort, ReviewRepository,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::catalog::{Category, ProductSummary};
use crate::models::review::Review;
use crate::state::AppState;

/// Number of related products shown under a product.
const RELATED_LIMIT: i64 = 4;

// =============================================================================
// View Types
// =============================================================================

/// Product display data for cards in listings.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub image_url: Option<String>,
    pub store_name: String,
    pub store_slug: String,
    pub available: bool,
}

impl From<&ProductSummary> for ProductCardView {
    fn from(product: &ProductSummary) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: filters::format_usd(product.price),
            compare_at_price: product.compare_at_price.map(filters::format_usd),
            image_url: product.image_url.clone(),
            store_name: product.store_name.clone(),
            store_slug: product.store_slug.clone(),
            available: product.is_available(),
        }
    }
}

/// Category display data for sidebars.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub slug: String,
    pub product_count: i64,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            product_count: category.product_count,
        }
    }
}

/// Review display data.
#[derive(Clone)]
pub struct ReviewView {
    pub reviewer_name: String,
    pub rating: i16,
    pub title: Option<String>,
    pub body: String,
    pub date: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            reviewer_name: review.reviewer_name.clone(),
            rating: review.rating,
            title: review.title.clone(),
            body: review.body.clone(),
            date: review.created_at.format("%B %e, %Y").to_string(),
        }
    }
}

/// Pagination state for listing pages.
#[derive(Clone)]
pub struct Pager {
    pub current: u32,
    pub total_pages: u32,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Deserialize empty strings as None for optional typed fields.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Catalog listing query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub vendor: Option<String>,
    #[serde(default)]
    pub q: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort: String,
    pub page: Option<u32>,
}

impl CatalogQuery {
    /// Convert the raw query parameters into a repository filter.
    pub fn to_filter(&self) -> ProductFilter {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
        };

        let query = self.q.trim();
        ProductFilter {
            category_slug: non_empty(&self.category),
            store_slug: non_empty(&self.vendor),
            query: if query.is_empty() {
                None
            } else {
                Some(query.to_owned())
            },
            min_price: self.min_price,
            max_price: self.max_price,
            sort: ProductSort::from_key(&self.sort),
            page: self.page.unwrap_or(1),
            per_page: ProductFilter::DEFAULT_PER_PAGE,
        }
    }
}

/// Build a listing URL for a given page, preserving the active filters.
fn page_url(base_path: &str, filter: &ProductFilter, page: u32) -> String {
    let mut params: Vec<String> = Vec::new();

    if let Some(category) = &filter.category_slug {
        params.push(format!("category={}", urlencoding::encode(category)));
    }
    if let Some(store) = &filter.store_slug {
        params.push(format!("vendor={}", urlencoding::encode(store)));
    }
    if let Some(query) = &filter.query {
        params.push(format!("q={}", urlencoding::encode(query)));
    }
    if let Some(min) = filter.min_price {
        params.push(format!("min_price={min}"));
    }
    if let Some(max) = filter.max_price {
        params.push(format!("max_price={max}"));
    }
    if filter.sort != ProductSort::Newest {
        params.push(format!("sort={}", filter.sort.key()));
    }
    if page > 1 {
        params.push(format!("page={page}"));
    }

    if params.is_empty() {
        base_path.to_owned()
    } else {
        format!("{base_path}?{}", params.join("&"))
    }
}

/// Build the pager for a listing page.
pub fn build_pager(base_path: &str, filter: &ProductFilter, total_count: i64) -> Pager {
    let per_page = i64::from(filter.per_page());
    let total_pages =
        u32::try_from(total_count.max(0).unsigned_abs().div_ceil(per_page.unsigned_abs()).max(1))
            .unwrap_or(1);
    let current = filter.page().min(total_pages);

    Pager {
        current,
        total_pages,
        prev_url: (current > 1).then(|| page_url(base_path, filter, current - 1)),
        next_url: (current < total_pages).then(|| page_url(base_path, filter, current + 1)),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
    pub total_count: i64,
    pub selected_category: String,
    pub selected_vendor: String,
    pub q: String,
    pub min_price: String,
    pub max_price: String,
    pub sort_key: String,
    pub pager: Pager,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
    pub available: bool,
    pub category_name: String,
    pub category_slug: String,
    pub store_name: String,
    pub store_slug: String,
    pub product_id: i32,
    pub related: Vec<ProductCardView>,
    pub reviews: Vec<ReviewView>,
    pub rating_average: String,
    pub rating_count: i64,
    pub review_posted: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product listing page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response> {
    let filter = query.to_filter();

    let products_repo = ProductRepository::new(state.pool());
    let products = products_repo.list(&filter).await?;
    let total_count = products_repo.count(&filter).await?;
    let categories = CategoryRepository::new(state.pool()).list().await?;

    let pager = build_pager("/products", &filter, total_count);

    Ok(ProductsIndexTemplate {
        products: products.iter().map(ProductCardView::from).collect(),
        categories: categories.iter().map(CategoryView::from).collect(),
        total_count,
        selected_category: filter.category_slug.clone().unwrap_or_default(),
        selected_vendor: filter.store_slug.clone().unwrap_or_default(),
        q: filter.query.clone().unwrap_or_default(),
        min_price: filter.min_price.map(|p| p.to_string()).unwrap_or_default(),
        max_price: filter.max_price.map(|p| p.to_string()).unwrap_or_default(),
        sort_key: filter.sort.key().to_owned(),
        pager,
    }
    .into_response())
}

/// Query parameter flagging that a review was just posted.
#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    pub reviewed: Option<String>,
}

/// Display the product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ShowQuery>,
) -> Result<Response> {
    let products_repo = ProductRepository::new(state.pool());
    let detail = products_repo
        .get_detail_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let related = products_repo
        .related(detail.product.category_id, detail.product.id, RELATED_LIMIT)
        .await?;

    let reviews_repo = ReviewRepository::new(state.pool());
    let reviews = reviews_repo.list_for_product(detail.product.id).await?;
    let rating = reviews_repo.summary_for_product(detail.product.id).await?;

    let product = detail.product;
    Ok(ProductShowTemplate {
        name: product.name,
        slug: product.slug,
        description: product.description,
        price: filters::format_usd(product.price),
        compare_at_price: product.compare_at_price.map(filters::format_usd),
        image_url: product.image_url,
        stock_quantity: product.stock_quantity,
        available: product.stock_quantity > 0,
        category_name: detail.category.name,
        category_slug: detail.category.slug,
        store_name: detail.store.name,
        store_slug: detail.store.slug,
        product_id: product.id.as_i32(),
        related: related.iter().map(ProductCardView::from).collect(),
        reviews: reviews.iter().map(ReviewView::from).collect(),
        rating_average: rating.average_display(),
        rating_count: rating.count,
        review_posted: query.reviewed.is_some(),
    }
    .into_response())
}

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: i16,
    pub title: Option<String>,
    pub body: String,
}

/// Submit a review for a product (requires auth).
///
/// One review per user per product; resubmitting replaces the old review.
#[instrument(skip(state, form))]
pub async fn add_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    let products_repo = ProductRepository::new(state.pool());
    let detail = products_repo
        .get_detail_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let body = form.body.trim();
    if body.is_empty() {
        return Err(AppError::BadRequest("review body cannot be empty".into()));
    }
    let rating = form.rating.clamp(1, 5);
    let title = form
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    ReviewRepository::new(state.pool())
        .upsert(detail.product.id, user.id, rating, title, body)
        .await?;

    Ok(Redirect::to(&format!("/products/{slug}?reviewed=1")).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filter_with(page: u32) -> ProductFilter {
        ProductFilter {
            category_slug: Some("home-office".to_owned()),
            query: Some("desk lamp".to_owned()),
            sort: ProductSort::PriceAsc,
            page,
            per_page: 12,
            ..ProductFilter::default()
        }
    }

    #[test]
    fn test_page_url_preserves_filters() {
        let url = page_url("/products", &filter_with(1), 3);
        assert!(url.starts_with("/products?"));
        assert!(url.contains("category=home-office"));
        assert!(url.contains("q=desk%20lamp"));
        assert!(url.contains("sort=price_asc"));
        assert!(url.contains("page=3"));
    }

    #[test]
    fn test_page_url_omits_defaults() {
        let url = page_url("/products", &ProductFilter::default(), 1);
        assert_eq!(url, "/products");
    }

    #[test]
    fn test_build_pager_bounds() {
        // 30 products, 12 per page -> 3 pages
        let pager = build_pager("/products", &filter_with(2), 30);
        assert_eq!(pager.total_pages, 3);
        assert_eq!(pager.current, 2);
        assert!(pager.prev_url.is_some());
        assert!(pager.next_url.is_some());

        let pager = build_pager("/products", &filter_with(1), 30);
        assert!(pager.prev_url.is_none());

        let pager = build_pager("/products", &filter_with(3), 30);
        assert!(pager.next_url.is_none());
    }

    #[test]
    fn test_build_pager_empty_results() {
        let pager = build_pager("/products", &ProductFilter::default(), 0);
        assert_eq!(pager.total_pages, 1);
        assert_eq!(pager.current, 1);
        assert!(pager.prev_url.is_none());
        assert!(pager.next_url.is_none());
    }

    #[test]
    fn test_catalog_query_to_filter_trims_and_drops_empties() {
        let query = CatalogQuery {
            category: Some(String::new()),
            vendor: None,
            q: "  lamp  ".to_owned(),
            min_price: None,
            max_price: None,
            sort: "price_desc".to_owned(),
            page: Some(2),
        };
        let filter = query.to_filter();

        assert!(filter.category_slug.is_none());
        assert_eq!(filter.query.as_deref(), Some("lamp"));
        assert_eq!(filter.sort, ProductSort::PriceDesc);
        assert_eq!(filter.page, 2);
    }
}
