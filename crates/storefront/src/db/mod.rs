//! Database operations for the MarketHub `PostgreSQL` database.
//!
//! # Tables
//!
//! - `users` - Customers, vendors, and admins (`role` column)
//! - `vendor_stores` - Store profiles owned by vendor users
//! - `categories` - Product categories
//! - `products` - The catalog (price, stock, status, owning vendor)
//! - `cart_items` / `wishlist_items` - Per-user or per-guest-token rows
//! - `orders` / `order_items` - Order history with price/name snapshots
//! - `product_reviews` - One review per user per product
//! - `addresses` - Customer shipping addresses
//! - Session storage (created by tower-sessions at startup)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p markethub-cli -- migrate
//! ```
//!
//! All queries bind parameters at runtime (`sqlx::query_as` over `FromRow`
//! row structs); catalog filtering builds its SQL with `sqlx::QueryBuilder`.

pub mod addresses;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod vendors;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use cart::CartRepository;
pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::{ProductFilter, ProductRepository, ProductSort};
pub use reviews::ReviewRepository;
pub use users::UserRepository;
pub use vendors::VendorRepository;
pub use wishlist::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, insufficient stock).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
