//! Wishlist route handlers.
//!
//! Plain form-post-and-redirect pages; the wishlist has no quantity state
//! so there is nothing worth a fragment update.

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

use crate::db::{CartRepository, ProductRepository, WishlistRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, resolve_cart_owner};
use crate::models::cart::WishlistEntry;
use crate::state::AppState;

/// Wishlist entry display data for templates.
#[derive(Clone)]
pub struct WishlistItemView {
    pub product_id: i32,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub price: String,
    pub available: bool,
    pub saved_on: String,
}

impl From<&WishlistEntry> for WishlistItemView {
    fn from(entry: &WishlistEntry) -> Self {
        Self {
            product_id: entry.product_id.as_i32(),
            name: entry.product_name.clone(),
            slug: entry.product_slug.clone(),
            image_url: entry.image_url.clone(),
            price: filters::format_usd(entry.price),
            available: entry.stock_quantity > 0,
            saved_on: entry.created_at.format("%B %e, %Y").to_string(),
        }
    }
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub items: Vec<WishlistItemView>,
}

/// Wishlist form data (add / remove / move to cart).
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: i32,
}

/// Display the wishlist page.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
) -> Result<Response> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let entries = WishlistRepository::new(state.pool()).items(&owner).await?;

    Ok(WishlistShowTemplate {
        items: entries.iter().map(WishlistItemView::from).collect(),
    }
    .into_response())
}

/// Save a product to the wishlist.
#[instrument(skip(state, session, auth))]
pub async fn add(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);

    // Only save products that still exist
    if ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .is_none()
    {
        return Ok(Redirect::to("/wishlist").into_response());
    }

    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    WishlistRepository::new(state.pool())
        .add(&owner, product_id)
        .await?;

    Ok(Redirect::to("/wishlist").into_response())
}

/// Remove a product from the wishlist.
#[instrument(skip(state, session, auth))]
pub async fn remove(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    WishlistRepository::new(state.pool())
        .remove(&owner, ProductId::new(form.product_id))
        .await?;

    Ok(Redirect::to("/wishlist").into_response())
}

/// Move a wishlist product into the cart.
///
/// The product leaves the wishlist only if it could actually be added.
#[instrument(skip(state, session, auth))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);

    let product = ProductRepository::new(state.pool()).get_by_id(product_id).await?;
    let Some(product) = product.filter(crate::models::catalog::Product::is_available) else {
        return Ok(Redirect::to("/wishlist").into_response());
    };

    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    CartRepository::new(state.pool())
        .add(&owner, product.id, 1)
        .await?;
    WishlistRepository::new(state.pool())
        .remove(&owner, product_id)
        .await?;

    Ok(Redirect::to("/cart").into_response())
}
