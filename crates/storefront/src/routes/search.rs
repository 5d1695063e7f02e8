//! Search route handler.
//!
//! Search shares the catalog filter machinery; the dedicated page exists so
//! the header search box has somewhere stable to land.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::routes::products::{CatalogQuery, Pager, ProductCardView, build_pager};
use crate::state::AppState;

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/search.html")]
pub struct SearchPageTemplate {
    pub q: String,
    pub products: Vec<ProductCardView>,
    pub total_count: i64,
    pub sort_key: String,
    pub pager: Pager,
}

/// Full search page.
#[instrument(skip(state))]
pub async fn search_page(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.to_filter();

    let repo = ProductRepository::new(state.pool());
    let (products, total_count) = if filter.query.is_some() {
        (repo.list(&filter).await?, repo.count(&filter).await?)
    } else {
        (Vec::new(), 0)
    };

    let pager = build_pager("/search", &filter, total_count);

    Ok(SearchPageTemplate {
        q: filter.query.clone().unwrap_or_default(),
        products: products.iter().map(ProductCardView::from).collect(),
        total_count,
        sort_key: filter.sort.key().to_owned(),
        pager,
    })
}
