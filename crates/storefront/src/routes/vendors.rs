//! Vendor store route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::db::{ProductRepository, VendorRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::catalog::VendorStore;
use crate::routes::products::{CatalogQuery, Pager, ProductCardView, build_pager};
use crate::state::AppState;

/// Vendor store display data.
#[derive(Clone)]
pub struct StoreView {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub product_count: i64,
    pub member_since: String,
}

impl From<&VendorStore> for StoreView {
    fn from(store: &VendorStore) -> Self {
        Self {
            name: store.name.clone(),
            slug: store.slug.clone(),
            description: store.description.clone().unwrap_or_default(),
            product_count: store.product_count,
            member_since: store.created_at.format("%B %Y").to_string(),
        }
    }
}

/// Vendor directory template.
#[derive(Template, WebTemplate)]
#[template(path = "vendors/index.html")]
pub struct VendorsIndexTemplate {
    pub stores: Vec<StoreView>,
}

/// Vendor store page template.
#[derive(Template, WebTemplate)]
#[template(path = "vendors/show.html")]
pub struct VendorShowTemplate {
    pub store: StoreView,
    pub products: Vec<ProductCardView>,
    pub pager: Pager,
}

/// Display the vendor store directory.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Response> {
    let stores = VendorRepository::new(state.pool()).list().await?;

    Ok(VendorsIndexTemplate {
        stores: stores.iter().map(StoreView::from).collect(),
    }
    .into_response())
}

/// Display one vendor's store page with their products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response> {
    let store = VendorRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {slug}")))?;

    // Scope the catalog filter to this store
    let mut filter = query.to_filter();
    filter.store_slug = Some(store.slug.clone());

    let products_repo = ProductRepository::new(state.pool());
    let products = products_repo.list(&filter).await?;
    let total_count = products_repo.count(&filter).await?;

    // The path already scopes to the store; keep it out of the pager URLs
    let base_path = format!("/vendors/{}", store.slug);
    let pager_filter = crate::db::ProductFilter {
        store_slug: None,
        ..filter.clone()
    };
    let pager = build_pager(&base_path, &pager_filter, total_count);

    Ok(VendorShowTemplate {
        store: StoreView::from(&store),
        products: products.iter().map(ProductCardView::from).collect(),
        pager,
    }
    .into_response())
}
