//! Integration tests for MarketHub.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and migrate + seed it
//! cargo run -p markethub-cli -- migrate
//! cargo run -p markethub-cli -- seed
//!
//! # Start the storefront
//! cargo run -p markethub-storefront
//!
//! # Run the ignored integration tests
//! cargo test -p markethub-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` - Base URL of the running storefront
//!   (default: `http://localhost:3000`)
//! - `MARKETHUB_DATABASE_URL` - Used by tests that assert directly on rows

use reqwest::Client;
use uuid::Uuid;

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Database URL for tests that assert on rows directly.
#[must_use]
pub fn database_url() -> String {
    std::env::var("MARKETHUB_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("MARKETHUB_DATABASE_URL must be set for database-backed tests")
}

/// Create an HTTP client with a cookie store (sessions need it).
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email for a freshly registered test account.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@markethub.test", Uuid::new_v4().simple())
}

/// Register a new account through the storefront and leave the client
/// logged in (the register flow sets the session cookie).
///
/// Returns the account's email.
pub async fn register_and_login(client: &Client) -> String {
    let email = unique_email();
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .form(&[
            ("email", email.as_str()),
            ("password", "integration-pass-1"),
            ("password_confirm", "integration-pass-1"),
            ("first_name", "Test"),
            ("last_name", "Shopper"),
        ])
        .send()
        .await
        .expect("Failed to register test account");

    assert!(
        resp.status().is_success(),
        "registration did not succeed: {}",
        resp.status()
    );

    email
}

/// Fetch a seeded product slug from the catalog page.
///
/// Assumes the database has been seeded (`mh-cli seed`).
pub async fn any_product_slug(client: &Client) -> String {
    let body = client
        .get(format!("{}/products", base_url()))
        .send()
        .await
        .expect("Failed to fetch product listing")
        .text()
        .await
        .expect("Failed to read product listing");

    // Product cards link to /products/{slug}
    body.split("href=\"/products/")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .map(|slug| slug.split('?').next().unwrap_or(slug).to_string())
        .filter(|slug| !slug.is_empty())
        .expect("No product links found; did you run mh-cli seed?")
}
