//! User domain types.

use chrono::{DateTime, Utc};

use markethub_core::{Email, UserId, UserRole};

/// A MarketHub account (domain type).
///
/// Customers, vendors, and admins all live in the `users` table and are
/// distinguished by `role`.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Account role.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Full display name, falling back to the email local part.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.local_part().to_owned()
        } else {
            name.to_owned()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("jo@example.com").unwrap(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            role: UserRole::Customer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user("Jo", "March").display_name(), "Jo March");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(user("", "").display_name(), "jo");
    }
}
