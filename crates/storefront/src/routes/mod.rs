//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing (filters, sort, pagination)
//! GET  /products/{slug}        - Product detail with reviews
//! POST /products/{slug}/reviews - Submit a review (requires auth)
//! GET  /search                 - Search page (same filter machinery)
//! GET  /vendors                - Vendor store directory
//! GET  /vendors/{slug}         - Store profile with its products
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count fragment, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Wishlist
//! GET  /wishlist               - Wishlist page
//! POST /wishlist/add           - Save a product
//! POST /wishlist/remove        - Remove a product
//! POST /wishlist/move-to-cart  - Move a product into the cart
//!
//! # Comparison (session-held id list)
//! GET  /compare                - Side-by-side comparison page
//! POST /compare/add            - Add a product (max 4)
//! POST /compare/remove         - Remove a product
//! POST /compare/clear          - Empty the list
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Shipping form + cart summary
//! POST /checkout               - Place the order
//! GET  /checkout/complete/{order_number} - Confirmation page
//!
//! # Auth (rate limited)
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (merges guest cart)
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Dashboard
//! GET  /account/orders         - Order history
//! GET  /account/orders/{order_number} - Order detail
//! GET  /account/profile        - Profile form
//! POST /account/profile        - Update profile
//! GET  /account/addresses      - Address list
//! GET  /account/addresses/new  - New address form
//! POST /account/addresses      - Create address
//! GET  /account/addresses/{id}/edit - Edit address form
//! POST /account/addresses/{id} - Update address
//! POST /account/addresses/{id}/delete - Delete address
//! POST /account/addresses/{id}/default - Make address the default
//!
//! # JSON API (rate limited; AJAX endpoints)
//! GET  /api/cart               - Cart contents as JSON
//! POST /api/cart               - add / update / remove actions
//! GET  /api/wishlist           - Wishlist contents as JSON
//! POST /api/wishlist           - add / remove actions
//! GET  /api/compare            - Comparison list as JSON
//! POST /api/compare            - add / remove / clear actions
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod compare;
pub mod home;
pub mod products;
pub mod search;
pub mod vendors;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router (rate limited).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route("/{slug}/reviews", post(products::add_review))
}

/// Create the vendor store routes router.
pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(vendors::index))
        .route("/{slug}", get(vendors::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/move-to-cart", post(wishlist::move_to_cart))
}

/// Create the comparison routes router.
pub fn compare_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(compare::show))
        .route("/add", post(compare::add))
        .route("/remove", post(compare::remove))
        .route("/clear", post(compare::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place))
        .route("/complete/{order_number}", get(checkout::complete))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::dashboard))
        .route("/orders", get(account::orders))
        .route("/orders/{order_number}", get(account::order_detail))
        .route(
            "/profile",
            get(account::profile).post(account::update_profile),
        )
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route("/addresses/new", get(account::new_address))
        .route("/addresses/{id}", post(account::update_address))
        .route("/addresses/{id}/edit", get(account::edit_address))
        .route("/addresses/{id}/delete", post(account::delete_address))
        .route("/addresses/{id}/default", post(account::default_address))
}

/// Create the JSON API routes router (rate limited).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(api::cart::show).post(api::cart::mutate))
        .route(
            "/wishlist",
            get(api::wishlist::show).post(api::wishlist::mutate),
        )
        .route(
            "/compare",
            get(api::compare::show).post(api::compare::mutate),
        )
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        .route("/search", get(search::search_page))
        .nest("/vendors", vendor_routes())
        // Cart
        .nest("/cart", cart_routes())
        // Wishlist
        .nest("/wishlist", wishlist_routes())
        // Comparison
        .nest("/compare", compare_routes())
        // Checkout
        .nest("/checkout", checkout_routes())
        // Account
        .nest("/account", account_routes())
        // Auth
        .nest("/auth", auth_routes())
        // JSON API
        .nest("/api", api_routes())
}
