//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database
//! row types. Repositories convert raw rows into these on load.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod review;
pub mod session;
pub mod user;

pub use address::{Address, NewAddress};
pub use cart::{CartLine, CartOwner, WishlistEntry};
pub use catalog::{Category, Product, ProductSummary, VendorStore};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use review::{RatingSummary, Review};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
