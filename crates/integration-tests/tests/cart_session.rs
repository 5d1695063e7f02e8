//! Integration tests for guest carts and the login merge.
//!
//! These tests require a running storefront with a seeded database.
//! Run with: cargo test -p markethub-integration-tests -- --ignored

use markethub_integration_tests::{any_product_slug, base_url, client, register_and_login};

/// Extract the first `name="product_id" value="N"` hidden field from a page.
fn extract_product_id(html: &str) -> i32 {
    html.split("name=\"product_id\" value=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .and_then(|id| id.parse().ok())
        .expect("No product_id field found on page")
}

/// A guest can fill a cart without logging in, and the cart survives
/// across requests in the same session.
#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_guest_cart_persists_in_session() {
    let client = client();
    let base_url = base_url();

    let slug = any_product_slug(&client).await;
    let page = client
        .get(format!("{base_url}/products/{slug}"))
        .send()
        .await
        .expect("Failed to load product page")
        .text()
        .await
        .expect("Failed to read product page");
    let product_id = extract_product_id(&page);

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product_id.to_string())])
        .send()
        .await
        .expect("Failed to add to cart");
    assert!(resp.status().is_success());

    let cart_page = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to load cart")
        .text()
        .await
        .expect("Failed to read cart page");

    assert!(
        cart_page.contains(&format!("/products/{slug}")),
        "cart page should list the added product"
    );
}

/// A guest cart follows the user through login (merged into their rows).
#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_guest_cart_merges_on_login() {
    let client = client();
    let base_url = base_url();

    // Add to cart as a guest
    let slug = any_product_slug(&client).await;
    let page = client
        .get(format!("{base_url}/products/{slug}"))
        .send()
        .await
        .expect("Failed to load product page")
        .text()
        .await
        .expect("Failed to read product page");
    let product_id = extract_product_id(&page);

    client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product_id.to_string())])
        .send()
        .await
        .expect("Failed to add to cart");

    // Register (which logs in) with the same session
    register_and_login(&client).await;

    // The cart must still hold the product
    let cart_page = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to load cart")
        .text()
        .await
        .expect("Failed to read cart page");

    assert!(
        cart_page.contains(&format!("/products/{slug}")),
        "guest cart should merge into the account at login"
    );
}

/// The JSON API mirrors the cart contents.
#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_cart_json_api_roundtrip() {
    let client = client();
    let base_url = base_url();

    let slug = any_product_slug(&client).await;
    let page = client
        .get(format!("{base_url}/products/{slug}"))
        .send()
        .await
        .expect("Failed to load product page")
        .text()
        .await
        .expect("Failed to read product page");
    let product_id = extract_product_id(&page);

    let payload: serde_json::Value = client
        .post(format!("{base_url}/api/cart"))
        .json(&serde_json::json!({
            "action": "add",
            "product_id": product_id,
            "quantity": 3,
        }))
        .send()
        .await
        .expect("Failed to POST /api/cart")
        .json()
        .await
        .expect("Failed to parse cart payload");

    assert_eq!(payload["item_count"], 3);
    assert_eq!(payload["items"][0]["product_id"], product_id);

    let payload: serde_json::Value = client
        .post(format!("{base_url}/api/cart"))
        .json(&serde_json::json!({
            "action": "remove",
            "product_id": product_id,
        }))
        .send()
        .await
        .expect("Failed to POST /api/cart")
        .json()
        .await
        .expect("Failed to parse cart payload");

    assert_eq!(payload["item_count"], 0);
}
