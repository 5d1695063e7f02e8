//! Product comparison route handlers.
//!
//! The comparison list is a session-held list of product ids, joined
//! against the catalog for the side-by-side page. Nothing is persisted
//! per-user; closing the session drops the list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use markethub_core::ProductId;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::models::session_keys;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Most products a comparison can hold.
pub const MAX_COMPARE: usize = 4;

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the comparison list from the session.
pub async fn get_compare_list(session: &Session) -> Vec<i32> {
    session
        .get::<Vec<i32>>(session_keys::COMPARE_LIST)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the comparison list in the session.
pub async fn set_compare_list(
    session: &Session,
    list: &[i32],
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::COMPARE_LIST, list).await
}

// =============================================================================
// Templates & Forms
// =============================================================================

/// Comparison page template.
#[derive(Template, WebTemplate)]
#[template(path = "compare/show.html")]
pub struct CompareShowTemplate {
    pub products: Vec<ProductCardView>,
    pub slots_left: usize,
}

/// Comparison form data.
#[derive(Debug, Deserialize)]
pub struct CompareForm {
    pub product_id: i32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the comparison page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let list = get_compare_list(&session).await;
    let ids: Vec<ProductId> = list.iter().copied().map(ProductId::new).collect();

    let summaries = ProductRepository::new(state.pool()).list_by_ids(&ids).await?;

    // Preserve the order products were added in
    let mut products = Vec::with_capacity(list.len());
    for id in &list {
        if let Some(summary) = summaries.iter().find(|s| s.id.as_i32() == *id) {
            products.push(ProductCardView::from(summary));
        }
    }

    let slots_left = MAX_COMPARE.saturating_sub(products.len());
    Ok(CompareShowTemplate {
        products,
        slots_left,
    }
    .into_response())
}

/// Add a product to the comparison list (capped at [`MAX_COMPARE`]).
#[instrument(skip(session))]
pub async fn add(session: Session, Form(form): Form<CompareForm>) -> Result<Response> {
    let mut list = get_compare_list(&session).await;

    if !list.contains(&form.product_id) && list.len() < MAX_COMPARE {
        list.push(form.product_id);
        set_compare_list(&session, &list).await?;
    }

    Ok(Redirect::to("/compare").into_response())
}

/// Remove a product from the comparison list.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<CompareForm>) -> Result<Response> {
    let mut list = get_compare_list(&session).await;
    list.retain(|id| *id != form.product_id);
    set_compare_list(&session, &list).await?;

    Ok(Redirect::to("/compare").into_response())
}

/// Empty the comparison list.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response> {
    set_compare_list(&session, &[]).await?;
    Ok(Redirect::to("/compare").into_response())
}
