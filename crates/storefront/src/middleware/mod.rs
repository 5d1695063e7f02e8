//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Security headers (CSP, frame options, etc.)
//! 5. Rate limiting (governor, auth and API routes only)

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAuth, clear_current_user, resolve_cart_owner, set_current_user,
    take_cart_token,
};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, create_session_store};
