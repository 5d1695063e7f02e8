//! JSON API endpoints for AJAX interactions.
//!
//! Thin per-row CRUD handlers mirroring the HTML pages: the page templates
//! use these from inline scripts where an HTMX fragment swap doesn't fit.

pub mod cart;
pub mod compare;
pub mod wishlist;
