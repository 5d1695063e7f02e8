//! Wishlist JSON API.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use markethub_core::ProductId;

use crate::db::{ProductRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, resolve_cart_owner};
use crate::models::cart::WishlistEntry;
use crate::state::AppState;

/// One wishlist entry in the JSON payload.
#[derive(Debug, Serialize)]
pub struct WishlistItemPayload {
    pub product_id: i32,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub in_stock: bool,
}

impl From<&WishlistEntry> for WishlistItemPayload {
    fn from(entry: &WishlistEntry) -> Self {
        Self {
            product_id: entry.product_id.as_i32(),
            name: entry.product_name.clone(),
            slug: entry.product_slug.clone(),
            price: entry.price,
            in_stock: entry.stock_quantity > 0,
        }
    }
}

/// Wishlist JSON payload.
#[derive(Debug, Serialize)]
pub struct WishlistPayload {
    pub items: Vec<WishlistItemPayload>,
    pub count: usize,
}

/// Wishlist mutation request.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WishlistAction {
    Add { product_id: i32 },
    Remove { product_id: i32 },
}

/// Return the wishlist as JSON.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
) -> Result<Json<WishlistPayload>> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let entries = WishlistRepository::new(state.pool()).items(&owner).await?;

    Ok(Json(WishlistPayload {
        count: entries.len(),
        items: entries.iter().map(WishlistItemPayload::from).collect(),
    }))
}

/// Apply a wishlist mutation and return the updated wishlist.
#[instrument(skip(state, session, auth, action))]
pub async fn mutate(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
    Json(action): Json<WishlistAction>,
) -> Result<Json<WishlistPayload>> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let repo = WishlistRepository::new(state.pool());

    match action {
        WishlistAction::Add { product_id } => {
            let product_id = ProductId::new(product_id);
            if ProductRepository::new(state.pool())
                .get_by_id(product_id)
                .await?
                .is_none()
            {
                return Err(AppError::BadRequest("unknown product".into()));
            }
            repo.add(&owner, product_id).await?;
        }
        WishlistAction::Remove { product_id } => {
            repo.remove(&owner, ProductId::new(product_id)).await?;
        }
    }

    let entries = repo.items(&owner).await?;
    Ok(Json(WishlistPayload {
        count: entries.len(),
        items: entries.iter().map(WishlistItemPayload::from).collect(),
    }))
}
