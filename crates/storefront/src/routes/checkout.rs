//! Checkout route handlers.
//!
//! The POST handler drives `CheckoutService::place_order`; everything the
//! order needs (snapshots, stock decrements, cart clear) commits in that
//! one transaction. The confirmation email goes out after the commit and
//! never fails the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::{AddressRepository, CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::NewAddress;
use crate::models::cart::CartOwner;
use crate::models::order::{Order, OrderItem};
use crate::routes::cart::CartView;
use crate::services::auth::AuthService;
use crate::services::checkout::{CheckoutError, CheckoutService, ShippingDetails};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Order display data for the confirmation page.
#[derive(Clone)]
pub struct OrderView {
    pub order_number: String,
    pub status: String,
    pub email: String,
    pub shipping_name: String,
    pub shipping_address1: String,
    pub shipping_address2: Option<String>,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub subtotal: String,
    pub total: String,
    pub placed_on: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            status: order.status.label().to_owned(),
            email: order.email.clone(),
            shipping_name: order.shipping_name.clone(),
            shipping_address1: order.shipping_address1.clone(),
            shipping_address2: order.shipping_address2.clone(),
            shipping_city: order.shipping_city.clone(),
            shipping_postal_code: order.shipping_postal_code.clone(),
            shipping_country: order.shipping_country.clone(),
            subtotal: filters::format_usd(order.subtotal),
            total: filters::format_usd(order.total),
            placed_on: order.created_at.format("%B %e, %Y").to_string(),
        }
    }
}

/// Order line display data.
#[derive(Clone)]
pub struct OrderItemView {
    pub product_name: String,
    pub unit_price: String,
    pub quantity: i32,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            unit_price: filters::format_usd(item.unit_price),
            quantity: item.quantity,
            line_total: filters::format_usd(item.line_total),
        }
    }
}

// =============================================================================
// Templates, Forms, Queries
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub cart: CartView,
    pub error: Option<String>,
    pub name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CheckoutCompleteTemplate {
    pub order: OrderView,
    pub items: Vec<OrderItemView>,
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    /// Checkbox: save this address as the default for next time.
    pub save_address: Option<String>,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page (requires auth).
///
/// The shipping form is prefilled from the user's default address.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<CheckoutQuery>,
) -> Result<Response> {
    let RequireAuth(user) = auth;

    let lines = CartRepository::new(state.pool())
        .items(&CartOwner::User(user.id))
        .await?;
    if lines.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let default_address = AddressRepository::new(state.pool())
        .default_for_user(user.id)
        .await?;

    let (name, address1, address2, city, postal_code, country) = match default_address {
        Some(addr) => (
            addr.recipient,
            addr.address1,
            addr.address2.unwrap_or_default(),
            addr.city,
            addr.postal_code,
            addr.country,
        ),
        None => (
            user.first_name.clone(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ),
    };

    Ok(CheckoutShowTemplate {
        cart: CartView::from_lines(&lines),
        error: query.error.map(error_message),
        name,
        address1,
        address2,
        city,
        postal_code,
        country,
    }
    .into_response())
}

/// Map an error query code to its banner message.
fn error_message(code: String) -> String {
    match code.as_str() {
        "out_of_stock" => {
            "One of your items sold out before the order went through. \
             Your cart has not been charged."
                .to_owned()
        }
        "empty" => "Your cart is empty.".to_owned(),
        "validation" => "Please fill in all required shipping fields.".to_owned(),
        other => other.to_owned(),
    }
}

/// Place the order (requires auth).
#[instrument(skip(state, auth, form))]
pub async fn place(
    State(state): State<AppState>,
    auth: RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let RequireAuth(current) = auth;

    let user = AuthService::new(state.pool()).get_user(current.id).await?;

    let shipping = ShippingDetails {
        name: form.name,
        address1: form.address1,
        address2: form.address2,
        city: form.city,
        postal_code: form.postal_code,
        country: form.country,
    };

    let order = match CheckoutService::new(state.pool())
        .place_order(&user, &shipping)
        .await
    {
        Ok(order) => order,
        Err(CheckoutError::OutOfStock(msg)) => {
            tracing::warn!(user_id = %user.id, "Checkout failed: {msg}");
            return Ok(Redirect::to("/checkout?error=out_of_stock").into_response());
        }
        Err(CheckoutError::EmptyCart) => {
            return Ok(Redirect::to("/checkout?error=empty").into_response());
        }
        Err(CheckoutError::Validation(_)) => {
            return Ok(Redirect::to("/checkout?error=validation").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    // Optionally save the shipping address for next time (best effort)
    if form.save_address.is_some() {
        let new_address = NewAddress {
            recipient: shipping.name.trim().to_owned(),
            address1: shipping.address1.trim().to_owned(),
            address2: shipping
                .address2
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned),
            city: shipping.city.trim().to_owned(),
            postal_code: shipping.postal_code.trim().to_owned(),
            country: shipping.country.trim().to_owned(),
            is_default: true,
        };
        if let Err(e) = AddressRepository::new(state.pool())
            .create(user.id, &new_address)
            .await
        {
            tracing::warn!("Failed to save checkout address: {e}");
        }
    }

    // Confirmation email is best effort; the order is already committed
    if let Some(email) = state.email() {
        let items = OrderRepository::new(state.pool())
            .get_by_number_for_user(&order.order_number, user.id)
            .await?
            .map(|(_, items)| items)
            .unwrap_or_default();

        if let Err(e) = email.send_order_confirmation(&order, &items).await {
            tracing::warn!(order_number = %order.order_number, "Failed to send confirmation email: {e}");
        }
    }

    Ok(Redirect::to(&format!("/checkout/complete/{}", order.order_number)).into_response())
}

/// Display the order confirmation page (requires auth).
#[instrument(skip(state, auth))]
pub async fn complete(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(order_number): Path<String>,
) -> Result<Response> {
    let RequireAuth(user) = auth;

    let (order, items) = OrderRepository::new(state.pool())
        .get_by_number_for_user(&order_number, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number}")))?;

    Ok(CheckoutCompleteTemplate {
        order: OrderView::from(&order),
        items: items.iter().map(OrderItemView::from).collect(),
    }
    .into_response())
}
