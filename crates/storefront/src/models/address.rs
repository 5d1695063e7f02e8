//! Customer address domain types.

use chrono::{DateTime, Utc};

use markethub_core::{AddressId, UserId};

/// A saved shipping address.
#[derive(Debug, Clone)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    /// Recipient full name.
    pub recipient: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    /// Prefilled into the checkout form when set.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating or updating an address.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub recipient: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}
