//! Account route handlers: dashboard, order history, profile, addresses.
//!
//! Everything here requires a logged-in user and is scoped to their rows.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use markethub_core::AddressId;

use crate::db::{AddressRepository, CartRepository, OrderRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::cart::CartOwner;
use crate::models::{Address, CurrentUser, NewAddress, Order};
use crate::routes::checkout::{OrderItemView, OrderView};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Order summary row for the history table.
#[derive(Clone)]
pub struct OrderSummaryView {
    pub order_number: String,
    pub status: String,
    pub total: String,
    pub placed_on: String,
}

impl From<&Order> for OrderSummaryView {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            status: order.status.label().to_owned(),
            total: filters::format_usd(order.total),
            placed_on: order.created_at.format("%B %e, %Y").to_string(),
        }
    }
}

/// Address display data.
#[derive(Clone)]
pub struct AddressView {
    pub id: i32,
    pub recipient: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.as_i32(),
            recipient: address.recipient.clone(),
            address1: address.address1.clone(),
            address2: address.address2.clone().unwrap_or_default(),
            city: address.city.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            is_default: address.is_default,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Account dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "account/dashboard.html")]
pub struct DashboardTemplate {
    pub first_name: String,
    pub email: String,
    pub order_count: i64,
    pub cart_count: i64,
    pub wishlist_count: i64,
    pub recent_orders: Vec<OrderSummaryView>,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderSummaryView>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order_detail.html")]
pub struct OrderDetailTemplate {
    pub order: OrderView,
    pub items: Vec<OrderItemView>,
}

/// Profile template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub error: Option<String>,
    pub saved: bool,
}

/// Address list template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub addresses: Vec<AddressView>,
}

/// Address form template (new and edit).
#[derive(Template, WebTemplate)]
#[template(path = "account/address_form.html")]
pub struct AddressFormTemplate {
    pub action: String,
    pub heading: String,
    pub recipient: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

// =============================================================================
// Form & Query Types
// =============================================================================

/// Profile update form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Address form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub recipient: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: Option<String>,
}

impl AddressForm {
    fn to_new_address(&self) -> std::result::Result<NewAddress, &'static str> {
        if self.recipient.trim().is_empty()
            || self.address1.trim().is_empty()
            || self.city.trim().is_empty()
            || self.postal_code.trim().is_empty()
            || self.country.trim().is_empty()
        {
            return Err("all fields except the second address line are required");
        }

        Ok(NewAddress {
            recipient: self.recipient.trim().to_owned(),
            address1: self.address1.trim().to_owned(),
            address2: self
                .address2
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned),
            city: self.city.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            country: self.country.trim().to_owned(),
            is_default: self.is_default.is_some(),
        })
    }
}

/// Query parameters for profile messages.
#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub error: Option<String>,
    pub saved: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Account dashboard.
#[instrument(skip(state, auth))]
pub async fn dashboard(State(state): State<AppState>, auth: RequireAuth) -> Result<Response> {
    let RequireAuth(user) = auth;
    let owner = CartOwner::User(user.id);

    let orders_repo = OrderRepository::new(state.pool());
    let order_count = orders_repo.count_for_user(user.id).await?;
    let recent: Vec<OrderSummaryView> = orders_repo
        .list_for_user(user.id)
        .await?
        .iter()
        .take(5)
        .map(OrderSummaryView::from)
        .collect();

    let cart_count = CartRepository::new(state.pool()).count(&owner).await?;
    let wishlist_count = WishlistRepository::new(state.pool()).count(&owner).await?;

    Ok(DashboardTemplate {
        first_name: user.first_name.clone(),
        email: user.email.to_string(),
        order_count,
        cart_count,
        wishlist_count,
        recent_orders: recent,
    }
    .into_response())
}

/// Order history.
#[instrument(skip(state, auth))]
pub async fn orders(State(state): State<AppState>, auth: RequireAuth) -> Result<Response> {
    let RequireAuth(user) = auth;

    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(OrdersTemplate {
        orders: orders.iter().map(OrderSummaryView::from).collect(),
    }
    .into_response())
}

/// Order detail, scoped to the logged-in user.
#[instrument(skip(state, auth))]
pub async fn order_detail(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(order_number): Path<String>,
) -> Result<Response> {
    let RequireAuth(user) = auth;

    let (order, items) = OrderRepository::new(state.pool())
        .get_by_number_for_user(&order_number, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number}")))?;

    Ok(OrderDetailTemplate {
        order: OrderView::from(&order),
        items: items.iter().map(OrderItemView::from).collect(),
    }
    .into_response())
}

/// Profile form.
#[instrument(skip(state, auth))]
pub async fn profile(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<ProfileQuery>,
) -> Result<Response> {
    let RequireAuth(current) = auth;
    let user = AuthService::new(state.pool()).get_user(current.id).await?;

    Ok(ProfileTemplate {
        email: user.email.to_string(),
        first_name: user.first_name,
        last_name: user.last_name,
        error: query.error,
        saved: query.saved.is_some(),
    }
    .into_response())
}

/// Update profile.
#[instrument(skip(state, auth, session, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: RequireAuth,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let RequireAuth(current) = auth;

    let user = match AuthService::new(state.pool())
        .update_profile(current.id, &form.email, &form.first_name, &form.last_name)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidEmail(_)) => {
            return Ok(
                Redirect::to("/account/profile?error=Please%20enter%20a%20valid%20email")
                    .into_response(),
            );
        }
        Err(AuthError::UserAlreadyExists) => {
            return Ok(Redirect::to(
                "/account/profile?error=That%20email%20is%20already%20in%20use",
            )
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    // Keep the session copy of the identity in sync
    if let Err(e) = set_current_user(&session, &CurrentUser::from(&user)).await {
        tracing::error!("Failed to refresh session user: {e}");
    }

    Ok(Redirect::to("/account/profile?saved=1").into_response())
}

/// Address list.
#[instrument(skip(state, auth))]
pub async fn addresses(State(state): State<AppState>, auth: RequireAuth) -> Result<Response> {
    let RequireAuth(user) = auth;

    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(AddressesTemplate {
        addresses: addresses.iter().map(AddressView::from).collect(),
    }
    .into_response())
}

/// New address form.
pub async fn new_address(_auth: RequireAuth) -> impl IntoResponse {
    AddressFormTemplate {
        action: "/account/addresses".to_owned(),
        heading: "New address".to_owned(),
        recipient: String::new(),
        address1: String::new(),
        address2: String::new(),
        city: String::new(),
        postal_code: String::new(),
        country: String::new(),
        is_default: false,
    }
}

/// Create an address.
#[instrument(skip(state, auth, form))]
pub async fn create_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let RequireAuth(user) = auth;

    let new_address = form
        .to_new_address()
        .map_err(|msg| AppError::BadRequest(msg.to_owned()))?;

    AddressRepository::new(state.pool())
        .create(user.id, &new_address)
        .await?;

    Ok(Redirect::to("/account/addresses").into_response())
}

/// Edit address form.
#[instrument(skip(state, auth))]
pub async fn edit_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response> {
    let RequireAuth(user) = auth;

    let address = AddressRepository::new(state.pool())
        .get_for_user(AddressId::new(id), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("address {id}")))?;

    Ok(AddressFormTemplate {
        action: format!("/account/addresses/{id}"),
        heading: "Edit address".to_owned(),
        recipient: address.recipient,
        address1: address.address1,
        address2: address.address2.unwrap_or_default(),
        city: address.city,
        postal_code: address.postal_code,
        country: address.country,
        is_default: address.is_default,
    }
    .into_response())
}

/// Update an address.
#[instrument(skip(state, auth, form))]
pub async fn update_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<i32>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let RequireAuth(user) = auth;

    let new_address = form
        .to_new_address()
        .map_err(|msg| AppError::BadRequest(msg.to_owned()))?;

    match AddressRepository::new(state.pool())
        .update(AddressId::new(id), user.id, &new_address)
        .await
    {
        Ok(_) => Ok(Redirect::to("/account/addresses").into_response()),
        Err(crate::db::RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("address {id}")))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete an address.
#[instrument(skip(state, auth))]
pub async fn delete_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response> {
    let RequireAuth(user) = auth;

    AddressRepository::new(state.pool())
        .delete(AddressId::new(id), user.id)
        .await?;

    Ok(Redirect::to("/account/addresses").into_response())
}

/// Make an address the default.
#[instrument(skip(state, auth))]
pub async fn default_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response> {
    let RequireAuth(user) = auth;

    match AddressRepository::new(state.pool())
        .set_default(AddressId::new(id), user.id)
        .await
    {
        Ok(()) => Ok(Redirect::to("/account/addresses").into_response()),
        Err(crate::db::RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("address {id}")))
        }
        Err(e) => Err(e.into()),
    }
}
