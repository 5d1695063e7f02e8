//! Session-related types.
//!
//! Types stored in the session for authentication and guest state.

use serde::{Deserialize, Serialize};

use markethub_core::{Email, UserId};

use crate::models::user::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// First name for greeting in the header.
    pub first_name: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
        }
    }
}

/// Session keys for storefront state.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous cart/wishlist owner token.
    pub const CART_TOKEN: &str = "cart_token";

    /// Key for the session-held comparison list (product ids).
    pub const COMPARE_LIST: &str = "compare_list";
}
