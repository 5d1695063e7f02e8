//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::routes::products::{CategoryView, ProductCardView};
use crate::state::AppState;

/// Number of newest products featured on the home page.
const FEATURED_LIMIT: i64 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let featured = ProductRepository::new(state.pool())
        .newest(FEATURED_LIMIT)
        .await?;
    let categories = CategoryRepository::new(state.pool()).list().await?;

    Ok(HomeTemplate {
        featured: featured.iter().map(ProductCardView::from).collect(),
        categories: categories.iter().map(CategoryView::from).collect(),
    })
}
