//! Authentication extractors and session helpers.
//!
//! The logged-in user is stored in the session as a [`CurrentUser`] under
//! [`session_keys::CURRENT_USER`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::flash::push_flash;
use crate::models::{CurrentUser, FlashMessage, session_keys};

/// Path anonymous users are sent to by [`RequireAuth`].
pub const LOGIN_PATH: &str = "/login";

/// Flash shown when a protected page is requested anonymously.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

/// Extractor that requires a logged-in user.
///
/// Anonymous requests are redirected to the login page with a flash message.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// No session layer is installed.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::MissingSession => {
                tracing::error!("session layer missing from router");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::MissingSession)?;

        if let Some(user) = current_user(&session).await {
            return Ok(Self(user));
        }

        tracing::debug!(path = %parts.uri.path(), "anonymous request to protected page");
        if let Err(e) = push_flash(&session, FlashMessage::new(LOGIN_REQUIRED_MESSAGE)).await {
            tracing::warn!(error = %e, "failed to store login flash");
        }
        Err(AuthRejection::RedirectToLogin)
    }
}

/// The user stored in `session`, if any. Unreadable entries count as anonymous.
pub(crate) async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Log `user` in: rotate the session ID and store the user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Log out: drop the user and everything else in the session.
///
/// Safe to call when nobody is logged in.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session.flush().await
}
