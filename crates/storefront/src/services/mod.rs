//! Business logic services for the storefront.
//!
//! - [`auth`] - Registration, login, and profile updates
//! - [`checkout`] - The cart-to-order transaction
//! - [`email`] - Order confirmation delivery over SMTP

pub mod auth;
pub mod checkout;
pub mod email;

pub use auth::{AuthError, AuthService};
pub use checkout::{CheckoutError, CheckoutService, ShippingDetails};
pub use email::{EmailError, EmailService};
