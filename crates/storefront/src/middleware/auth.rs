//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring login in route handlers, plus the
//! session helpers for the current user and the guest cart token.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::models::{CurrentUser, session_keys};
use crate::models::cart::CartOwner;

/// Extractor that requires a logged-in user.
///
/// If the visitor is not logged in, HTML requests are redirected to the
/// login page and API requests get a 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the visitor is not logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        // Get the current user from the session
        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                // Check if this is an API request
                let is_api = parts.uri.path().starts_with("/api/");
                if is_api {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the visitor
/// is not logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

/// Resolve who owns the cart/wishlist rows for this request.
///
/// Logged-in users own rows by user id. Guests get a random token stored in
/// the session on first use.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn resolve_cart_owner(
    session: &Session,
    user: Option<&CurrentUser>,
) -> Result<CartOwner, tower_sessions::session::Error> {
    if let Some(user) = user {
        return Ok(CartOwner::User(user.id));
    }

    if let Some(token) = session.get::<String>(session_keys::CART_TOKEN).await? {
        return Ok(CartOwner::Guest(token));
    }

    let token = Uuid::new_v4().simple().to_string();
    session.insert(session_keys::CART_TOKEN, &token).await?;
    Ok(CartOwner::Guest(token))
}

/// Remove and return the guest cart token, if one exists.
///
/// Called at login so guest cart/wishlist rows can be merged into the
/// user's rows exactly once.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_cart_token(
    session: &Session,
) -> Result<Option<String>, tower_sessions::session::Error> {
    let token = session.get::<String>(session_keys::CART_TOKEN).await?;
    if token.is_some() {
        session.remove::<String>(session_keys::CART_TOKEN).await?;
    }
    Ok(token)
}
