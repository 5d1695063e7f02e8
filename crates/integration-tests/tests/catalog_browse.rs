//! Integration tests for catalog browsing and search.
//!
//! These tests require a running storefront with a seeded database.
//! Run with: cargo test -p markethub-integration-tests -- --ignored

use markethub_integration_tests::{base_url, client};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_product_listing_renders() {
    let client = client();

    let resp = client
        .get(format!("{}/products", base_url()))
        .send()
        .await
        .expect("Failed to fetch product listing");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("product-grid") || body.contains("No products"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_category_filter_narrows_results() {
    let client = client();
    let base_url = base_url();

    // Seeded category
    let all = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to fetch listing")
        .text()
        .await
        .expect("Failed to read listing");

    let filtered = client
        .get(format!("{base_url}/products?category=stationery"))
        .send()
        .await
        .expect("Failed to fetch filtered listing")
        .text()
        .await
        .expect("Failed to read filtered listing");

    let count = |body: &str| body.matches("product-card").count();
    assert!(count(&filtered) <= count(&all));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_search_finds_seeded_product() {
    let client = client();

    let body = client
        .get(format!("{}/search?q=notebook", base_url()))
        .send()
        .await
        .expect("Failed to search")
        .text()
        .await
        .expect("Failed to read search page");

    assert!(
        body.to_lowercase().contains("notebook"),
        "seeded notebook should be findable"
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_unknown_product_is_404() {
    let client = client();

    let resp = client
        .get(format!("{}/products/definitely-not-a-slug", base_url()))
        .send()
        .await
        .expect("Failed to fetch product");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_health_endpoints() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to fetch /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to fetch /health/ready");
    assert_eq!(resp.status(), StatusCode::OK);
}
