//! Authentication route handlers.
//!
//! Login and registration with argon2 password hashing. On login, any
//! guest cart and wishlist rows are merged into the user's rows.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{CartRepository, WishlistRepository};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user, take_cart_token};
use crate::models::CurrentUser;
use crate::models::user::User;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form & Query Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Map login error codes to banner messages.
fn login_error_message(code: &str) -> String {
    match code {
        "credentials" => "Invalid email or password.".to_owned(),
        "session" => "Something went wrong saving your session. Please try again.".to_owned(),
        other => other.to_owned(),
    }
}

/// Map registration error codes to banner messages.
fn register_error_message(code: &str) -> String {
    match code {
        "password_mismatch" => "Passwords do not match.".to_owned(),
        "password_too_short" => "Password must be at least 8 characters.".to_owned(),
        "email_taken" => "An account with this email already exists.".to_owned(),
        "invalid_email" => "Please enter a valid email address.".to_owned(),
        "failed" => "Registration failed. Please try again.".to_owned(),
        other => other.to_owned(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(login_error_message),
        success: query.success.map(|_| "Account created. Please log in.".to_owned()),
    }
}

/// Handle login form submission.
///
/// On success the guest cart and wishlist merge into the user's rows.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let user = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            tracing::warn!("Login failed for submitted email");
            return Ok(Redirect::to("/auth/login?error=credentials").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    establish_session(&state, &session, &user).await
}

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error.as_deref().map(register_error_message),
    }
}

/// Handle registration form submission.
///
/// Successful registration logs the user straight in.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    // Validate passwords match
    if form.password != form.password_confirm {
        return Ok(Redirect::to("/auth/register?error=password_mismatch").into_response());
    }

    let user = match AuthService::new(state.pool())
        .register(
            &form.email,
            &form.password,
            form.first_name.as_deref().unwrap_or_default(),
            form.last_name.as_deref().unwrap_or_default(),
        )
        .await
    {
        Ok(user) => user,
        Err(AuthError::UserAlreadyExists) => {
            return Ok(Redirect::to("/auth/register?error=email_taken").into_response());
        }
        Err(AuthError::WeakPassword(_)) => {
            return Ok(Redirect::to("/auth/register?error=password_too_short").into_response());
        }
        Err(AuthError::InvalidEmail(_)) => {
            return Ok(Redirect::to("/auth/register?error=invalid_email").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    establish_session(&state, &session, &user).await
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    // Also destroy the entire session (drops guest state too)
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}

/// Put a freshly authenticated user into the session and merge guest state.
async fn establish_session(state: &AppState, session: &Session, user: &User) -> Result<Response> {
    // Merge any guest cart/wishlist into the user's rows
    match take_cart_token(session).await {
        Ok(Some(token)) => {
            if let Err(e) = CartRepository::new(state.pool())
                .merge_guest_into_user(&token, user.id)
                .await
            {
                tracing::error!("Failed to merge guest cart: {e}");
            }
            if let Err(e) = WishlistRepository::new(state.pool())
                .merge_guest_into_user(&token, user.id)
                .await
            {
                tracing::error!("Failed to merge guest wishlist: {e}");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::error!("Failed to read cart token: {e}"),
    }

    let current = CurrentUser::from(user);
    if let Err(e) = set_current_user(session, &current).await {
        tracing::error!("Failed to set session: {e}");
        return Ok(Redirect::to("/auth/login?error=session").into_response());
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Redirect::to("/account").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(login_error_message("credentials"), "Invalid email or password.");
        // Unknown codes pass through for display
        assert_eq!(login_error_message("odd"), "odd");
    }

    #[test]
    fn test_register_error_messages() {
        assert_eq!(register_error_message("password_mismatch"), "Passwords do not match.");
        assert_eq!(
            register_error_message("email_taken"),
            "An account with this email already exists."
        );
    }
}
