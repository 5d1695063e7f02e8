//! Cart JSON API.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use markethub_core::ProductId;

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, resolve_cart_owner};
use crate::models::cart::CartLine;
use crate::state::AppState;

/// One cart line in the JSON payload.
#[derive(Debug, Serialize)]
pub struct CartItemPayload {
    pub product_id: i32,
    pub name: String,
    pub slug: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&CartLine> for CartItemPayload {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.as_i32(),
            name: line.product_name.clone(),
            slug: line.product_slug.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total(),
        }
    }
}

/// Cart JSON payload.
#[derive(Debug, Serialize)]
pub struct CartPayload {
    pub items: Vec<CartItemPayload>,
    pub item_count: i64,
    pub subtotal: Decimal,
}

impl CartPayload {
    fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            items: lines.iter().map(CartItemPayload::from).collect(),
            item_count: lines.iter().map(|l| i64::from(l.quantity)).sum(),
            subtotal: lines.iter().map(CartLine::line_total).sum(),
        }
    }
}

/// Cart mutation request.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CartAction {
    Add {
        product_id: i32,
        quantity: Option<i32>,
    },
    Update {
        product_id: i32,
        quantity: i32,
    },
    Remove {
        product_id: i32,
    },
}

/// Return the cart as JSON.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
) -> Result<Json<CartPayload>> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let lines = CartRepository::new(state.pool()).items(&owner).await?;

    Ok(Json(CartPayload::from_lines(&lines)))
}

/// Apply a cart mutation and return the updated cart.
#[instrument(skip(state, session, auth, action))]
pub async fn mutate(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
    Json(action): Json<CartAction>,
) -> Result<Json<CartPayload>> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let repo = CartRepository::new(state.pool());

    match action {
        CartAction::Add {
            product_id,
            quantity,
        } => {
            let product_id = ProductId::new(product_id);
            let product = ProductRepository::new(state.pool())
                .get_by_id(product_id)
                .await?;
            if product
                .filter(crate::models::catalog::Product::is_available)
                .is_none()
            {
                return Err(AppError::BadRequest("product is unavailable".into()));
            }
            repo.add(&owner, product_id, quantity.unwrap_or(1).clamp(1, 99))
                .await?;
        }
        CartAction::Update {
            product_id,
            quantity,
        } => {
            match repo
                .set_quantity(&owner, ProductId::new(product_id), quantity.clamp(0, 99))
                .await
            {
                Ok(()) | Err(RepositoryError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        CartAction::Remove { product_id } => {
            repo.remove(&owner, ProductId::new(product_id)).await?;
        }
    }

    let lines = repo.items(&owner).await?;
    Ok(Json(CartPayload::from_lines(&lines)))
}
