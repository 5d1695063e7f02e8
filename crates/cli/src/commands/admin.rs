//! Privileged user creation command.
//!
//! Creates vendor or admin accounts with a generated password that is
//! printed exactly once. Vendors also get a store row, named after the
//! account's display name.

use markethub_core::{Email, UserRole};
use markethub_storefront::db::create_pool;
use markethub_storefront::services::auth::hash_password;

use super::{CommandError, database_url};
use crate::commands::seed::slugify;

/// Length of generated passwords.
const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Generate a random alphanumeric password.
#[must_use]
pub fn generate_password() -> String {
    use rand::Rng;

    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";

    let mut rng = rand::rng();
    (0..GENERATED_PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            char::from(ALPHABET[idx])
        })
        .collect()
}

/// Create a vendor or admin user.
///
/// # Errors
///
/// Returns `CommandError::InvalidInput` for a bad email or role, and
/// database errors for everything else (including an already-taken email).
pub async fn create_user(email: &str, name: &str, role: &str) -> Result<(), CommandError> {
    let email = Email::parse(email)
        .map_err(|e| CommandError::InvalidInput(format!("invalid email: {e}")))?;
    let role: UserRole = role
        .parse()
        .map_err(|_| CommandError::InvalidInput(format!("unknown role: {role}")))?;
    if role == UserRole::Customer {
        return Err(CommandError::InvalidInput(
            "customers register through the storefront; use role vendor or admin".to_owned(),
        ));
    }

    let (first_name, last_name) = split_name(name);

    let password = generate_password();
    let password_hash = hash_password(&password)
        .map_err(|e| CommandError::InvalidInput(format!("password hashing failed: {e}")))?;

    let database_url = database_url()?;
    let pool = create_pool(&database_url).await?;

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, first_name, last_name, role) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(email.as_str())
    .bind(&password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(role.as_str())
    .fetch_one(&pool)
    .await?;

    if role == UserRole::Vendor {
        sqlx::query(
            "INSERT INTO vendor_stores (vendor_id, name, slug) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(name)
        .bind(slugify(name))
        .execute(&pool)
        .await?;
    }

    tracing::info!(%email, %role, user_id, "User created");
    tracing::info!("Generated password (shown once): {password}");

    Ok(())
}

/// Split a display name into first/last on the first space.
fn split_name(name: &str) -> (&str, &str) {
    match name.split_once(' ') {
        Some((first, last)) => (first, last),
        None => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_password_length_and_charset() {
        let password = generate_password();
        assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("Acme Goods"), ("Acme", "Goods"));
        assert_eq!(split_name("Acme"), ("Acme", ""));
        assert_eq!(split_name("Acme Fine Goods"), ("Acme", "Fine Goods"));
    }
}
