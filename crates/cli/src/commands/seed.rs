//! Demo data seeding command.
//!
//! Fills an empty database with categories, two vendor stores, and a
//! small catalog so the storefront has something to show. Safe to run
//! more than once; rows are keyed by slug/email and skipped if present.

use rust_decimal::Decimal;
use sqlx::PgPool;

use markethub_core::UserRole;
use markethub_storefront::db::create_pool;
use markethub_storefront::services::auth::hash_password;

use super::{CommandError, database_url};

/// Password for the seeded demo vendor accounts.
const DEMO_PASSWORD: &str = "markethub-demo-login";

const CATEGORIES: &[(&str, &str)] = &[
    ("Home & Kitchen", "home-kitchen"),
    ("Electronics", "electronics"),
    ("Stationery", "stationery"),
    ("Outdoors", "outdoors"),
];

struct SeedVendor {
    email: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    store_name: &'static str,
    store_description: &'static str,
}

const VENDORS: &[SeedVendor] = &[
    SeedVendor {
        email: "hello@northwoods.example",
        first_name: "June",
        last_name: "Halvorsen",
        store_name: "Northwoods Supply",
        store_description: "Small-batch gear and home goods from the north shore.",
    },
    SeedVendor {
        email: "orders@pixelpress.example",
        first_name: "Ravi",
        last_name: "Menon",
        store_name: "Pixel & Press",
        store_description: "Desk accessories and paper goods for people who type.",
    },
];

struct SeedProduct {
    store: &'static str,
    category: &'static str,
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    compare_at_cents: Option<i64>,
    stock: i32,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        store: "Northwoods Supply",
        category: "home-kitchen",
        name: "Enamel Pour-Over Kettle",
        description: "1.0L gooseneck kettle in forest green enamel. Stove-safe.",
        price_cents: 4800,
        compare_at_cents: Some(5600),
        stock: 24,
    },
    SeedProduct {
        store: "Northwoods Supply",
        category: "outdoors",
        name: "Waxed Canvas Field Tote",
        description: "Carry-everything tote with brass rivets and a waxed finish.",
        price_cents: 7200,
        compare_at_cents: None,
        stock: 12,
    },
    SeedProduct {
        store: "Northwoods Supply",
        category: "home-kitchen",
        name: "Walnut Serving Board",
        description: "End-grain walnut board, oiled and ready for the table.",
        price_cents: 5400,
        compare_at_cents: None,
        stock: 8,
    },
    SeedProduct {
        store: "Northwoods Supply",
        category: "outdoors",
        name: "Wool Camp Blanket",
        description: "80/20 wool blend, 60x80in, stripes like the old lodges.",
        price_cents: 9900,
        compare_at_cents: Some(12000),
        stock: 15,
    },
    SeedProduct {
        store: "Pixel & Press",
        category: "stationery",
        name: "Dot-Grid Notebook 3-Pack",
        description: "A5, lay-flat binding, 120gsm paper that takes fountain ink.",
        price_cents: 1800,
        compare_at_cents: None,
        stock: 60,
    },
    SeedProduct {
        store: "Pixel & Press",
        category: "stationery",
        name: "Brass Pen Stand",
        description: "Machined brass, felt base, holds one pen at a jaunty angle.",
        price_cents: 3200,
        compare_at_cents: None,
        stock: 20,
    },
    SeedProduct {
        store: "Pixel & Press",
        category: "electronics",
        name: "Low-Profile Mechanical Keyboard",
        description: "75% layout, hot-swap sockets, USB-C. Quiet enough for calls.",
        price_cents: 12900,
        compare_at_cents: Some(14900),
        stock: 10,
    },
    SeedProduct {
        store: "Pixel & Press",
        category: "electronics",
        name: "Desk Light Bar",
        description: "Asymmetric beam keeps glare off the monitor. Stepless dimming.",
        price_cents: 6500,
        compare_at_cents: None,
        stock: 18,
    },
];

/// Turn a display name into a URL slug.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Seed the database with demo data.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = create_pool(&database_url).await?;

    seed_categories(&pool).await?;
    seed_vendors_and_products(&pool).await?;

    tracing::info!(
        "Seed complete. Demo vendors can log in with password: {DEMO_PASSWORD}"
    );
    Ok(())
}

async fn seed_categories(pool: &PgPool) -> Result<(), CommandError> {
    for (name, slug) in CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) \
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await?;
    }
    tracing::info!("Seeded {} categories", CATEGORIES.len());
    Ok(())
}

async fn seed_vendors_and_products(pool: &PgPool) -> Result<(), CommandError> {
    let password_hash = hash_password(DEMO_PASSWORD)
        .map_err(|e| CommandError::InvalidInput(format!("password hashing failed: {e}")))?;

    for vendor in VENDORS {
        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(vendor.email)
            .fetch_optional(pool)
            .await?;

        let vendor_id = match existing {
            Some(id) => id,
            None => {
                sqlx::query_scalar(
                    "INSERT INTO users (email, password_hash, first_name, last_name, role) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING id",
                )
                .bind(vendor.email)
                .bind(&password_hash)
                .bind(vendor.first_name)
                .bind(vendor.last_name)
                .bind(UserRole::Vendor.as_str())
                .fetch_one(pool)
                .await?
            }
        };

        sqlx::query(
            "INSERT INTO vendor_stores (vendor_id, name, slug, description) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (vendor_id) DO NOTHING",
        )
        .bind(vendor_id)
        .bind(vendor.store_name)
        .bind(slugify(vendor.store_name))
        .bind(vendor.store_description)
        .execute(pool)
        .await?;
    }
    tracing::info!("Seeded {} vendor stores", VENDORS.len());

    let mut inserted = 0;
    for product in PRODUCTS {
        let result = sqlx::query(
            "INSERT INTO products (vendor_id, category_id, name, slug, description, \
                                   price, compare_at_price, stock_quantity) \
             SELECT s.vendor_id, c.id, $1, $2, $3, $4, $5, $6 \
             FROM vendor_stores s, categories c \
             WHERE s.name = $7 AND c.slug = $8 \
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(product.name)
        .bind(slugify(product.name))
        .bind(product.description)
        .bind(Decimal::new(product.price_cents, 2))
        .bind(product.compare_at_cents.map(|c| Decimal::new(c, 2)))
        .bind(product.stock)
        .bind(product.store)
        .bind(product.category)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }
    tracing::info!("Seeded {inserted} products");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Enamel Pour-Over Kettle"), "enamel-pour-over-kettle");
        assert_eq!(slugify("Pixel & Press"), "pixel-press");
        assert_eq!(slugify("  Walnut  Board  "), "walnut-board");
    }

    #[test]
    fn test_seed_products_reference_seed_stores_and_categories() {
        for product in PRODUCTS {
            assert!(VENDORS.iter().any(|v| v.store_name == product.store));
            assert!(CATEGORIES.iter().any(|(_, slug)| *slug == product.category));
        }
    }
}
