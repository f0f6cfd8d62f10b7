//! Authentication route handlers.
//!
//! Registration logs the new user straight in. Login failures redirect back
//! to the login page with a flash naming what went wrong.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::redirect_with_flash;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{Layout, clear_current_user, set_current_user};
use crate::models::{CurrentUser, FlashMessage};
use crate::services::FieldErrors;
use crate::services::auth::{AuthError, LoginForm, RegisterForm};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub errors: FieldErrors,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub errors: FieldErrors,
}

// =============================================================================
// Helpers
// =============================================================================

/// Store `user` as the current principal.
async fn log_in(session: &Session, user: &CurrentUser) -> Result<()> {
    set_current_user(session, user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Flash-and-redirect for auth errors the visitor can act on.
async fn auth_failure(session: &Session, err: AuthError) -> Result<Response> {
    match err {
        AuthError::DuplicateEmail | AuthError::UserNotFound | AuthError::InvalidPassword => {
            let message = err.flash_message().unwrap_or_default();
            tracing::info!(reason = %err, "authentication rejected");
            redirect_with_flash(session, FlashMessage::new(message), LOGIN_PATH).await
        }
        other => Err(other.into()),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(layout: Layout) -> impl IntoResponse {
    LoginTemplate {
        layout,
        email: String::new(),
        errors: FieldErrors::new(),
    }
}

/// Handle login form submission.
///
/// # Errors
///
/// Returns `AppError` if the store or session fails.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if let Err(errors) = form.validate() {
        let page = LoginTemplate {
            layout: Layout::load(&session).await,
            email: form.email,
            errors,
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    match state.auth().login(&form.email, &form.password).await {
        Ok(user) => {
            log_in(&session, &CurrentUser::from(&user)).await?;
            tracing::info!(user_id = %user.id, "user logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => auth_failure(&session, e).await,
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(layout: Layout) -> impl IntoResponse {
    RegisterTemplate {
        layout,
        name: String::new(),
        email: String::new(),
        errors: FieldErrors::new(),
    }
}

/// Handle registration form submission.
///
/// # Errors
///
/// Returns `AppError` if the store, hashing, or session fails.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if let Err(errors) = form.validate() {
        let page = RegisterTemplate {
            layout: Layout::load(&session).await,
            name: form.name,
            email: form.email,
            errors,
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    match state
        .auth()
        .register(&form.name, &form.email, &form.password)
        .await
    {
        Ok(user) => {
            log_in(&session, &CurrentUser::from(&user)).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => auth_failure(&session, e).await,
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out and return to the home page.
///
/// # Errors
///
/// Returns `AppError` if the session store fails.
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/").into_response())
}
