//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Rows live in `cart_items`, owned by the user id or the session's guest
//! cart token.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use markethub_core::ProductId;

use crate::db::{CartRepository, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, resolve_cart_owner};
use crate::models::cart::CartLine;
use crate::state::AppState;

/// Highest quantity a single cart line will accept.
const MAX_LINE_QUANTITY: i32 = 99;

// =============================================================================
// View Types
// =============================================================================

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: i32,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub max_quantity: i32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.as_i32(),
            name: line.product_name.clone(),
            slug: line.product_slug.clone(),
            image_url: line.image_url.clone(),
            quantity: line.quantity,
            max_quantity: line.stock_quantity.min(MAX_LINE_QUANTITY),
            price: filters::format_usd(line.unit_price),
            line_price: filters::format_usd(line.line_total()),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: i64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }

    /// Build the view from cart lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let subtotal = lines
            .iter()
            .map(CartLine::line_total)
            .sum::<rust_decimal::Decimal>();
        let item_count = lines.iter().map(|l| i64::from(l.quantity)).sum();

        Self {
            items: lines.iter().map(CartItemView::from).collect(),
            subtotal: filters::format_usd(subtotal),
            item_count,
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<i32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub quantity: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
) -> Result<Response> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let lines = CartRepository::new(state.pool()).items(&owner).await?;

    Ok(CartShowTemplate {
        cart: CartView::from_lines(&lines),
    }
    .into_response())
}

/// Add item to cart (HTMX).
///
/// Returns the cart count badge plus an `HX-Trigger` so other fragments
/// refresh themselves.
#[instrument(skip(state, session, auth))]
pub async fn add(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let quantity = form.quantity.unwrap_or(1).clamp(1, MAX_LINE_QUANTITY);

    // Only active, in-stock products can be added
    let product = ProductRepository::new(state.pool()).get_by_id(product_id).await?;
    let Some(product) = product.filter(crate::models::catalog::Product::is_available) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Html("<span class=\"error\">This product is unavailable</span>"),
        )
            .into_response());
    };

    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let repo = CartRepository::new(state.pool());
    repo.add(&owner, product.id, quantity).await?;
    let count = repo.count(&owner).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
#[instrument(skip(state, session, auth))]
pub async fn update(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let repo = CartRepository::new(state.pool());

    let quantity = form.quantity.clamp(0, MAX_LINE_QUANTITY);
    match repo
        .set_quantity(&owner, ProductId::new(form.product_id), quantity)
        .await
    {
        Ok(()) => {}
        Err(crate::db::RepositoryError::NotFound) => {
            // Row already gone (double click); just render the current cart
        }
        Err(e) => return Err(e.into()),
    }

    let lines = repo.items(&owner).await?;
    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_lines(&lines),
        },
    )
        .into_response())
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session, auth))]
pub async fn remove(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let repo = CartRepository::new(state.pool());

    repo.remove(&owner, ProductId::new(form.product_id)).await?;

    let lines = repo.items(&owner).await?;
    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_lines(&lines),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session, auth))]
pub async fn count(
    State(state): State<AppState>,
    auth: OptionalAuth,
    session: Session,
) -> Result<Response> {
    let owner = resolve_cart_owner(&session, auth.0.as_ref()).await?;
    let count = CartRepository::new(state.pool()).count(&owner).await?;

    Ok(CartCountTemplate { count }.into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use markethub_core::{CartItemId, UserId};
    use rust_decimal::Decimal;

    use super::*;

    fn line(unit_cents: i64, quantity: i32, stock: i32) -> CartLine {
        CartLine {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            vendor_id: UserId::new(2),
            product_name: "Ceramic Mug".to_owned(),
            product_slug: "ceramic-mug".to_owned(),
            image_url: None,
            unit_price: Decimal::new(unit_cents, 2),
            quantity,
            stock_quantity: stock,
        }
    }

    #[test]
    fn test_cart_view_totals() {
        let view = CartView::from_lines(&[line(1500, 2, 10), line(1500, 1, 10)]);
        assert_eq!(view.subtotal, "$45.00");
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn test_cart_view_empty() {
        let view = CartView::empty();
        assert_eq!(view.subtotal, "$0.00");
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_item_view_caps_max_quantity() {
        let view = CartItemView::from(&line(1000, 1, 500));
        assert_eq!(view.max_quantity, MAX_LINE_QUANTITY);

        let view = CartItemView::from(&line(1000, 1, 3));
        assert_eq!(view.max_quantity, 3);
    }
}
