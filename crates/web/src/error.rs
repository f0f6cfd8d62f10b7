//! Unified error handling with Sentry integration.
//!
//! Expected failures (bad credentials, missing posts) are turned into
//! flash-and-redirect responses by the handlers. Anything that reaches
//! [`AppError`] is unexpected: it is logged, captured to Sentry, and shown to
//! the visitor as a generic error page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::filters;
use crate::middleware::Layout;
use crate::services::auth::AuthError;
use crate::services::posts::PostError;

/// Application-level error type for the blog.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed unexpectedly.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Post operation failed unexpectedly.
    #[error("Post error: {0}")]
    Post(#[from] PostError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// No route or resource matches the request.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::Post(PostError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Post(PostError::Unauthorized) => StatusCode::UNAUTHORIZED,
            Self::Post(PostError::Validation(_))
            | Self::Auth(AuthError::Validation(_) | AuthError::InvalidEmail(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Auth(AuthError::UserNotFound | AuthError::InvalidPassword) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::DuplicateEmail) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
struct ErrorTemplate {
    layout: Layout,
    status: u16,
    message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        // Don't expose internal error details to clients
        let message = match status {
            StatusCode::NOT_FOUND => "Page not found",
            StatusCode::UNAUTHORIZED => "Please log in to access this page.",
            StatusCode::CONFLICT => "Email already registered",
            StatusCode::UNPROCESSABLE_ENTITY => "The submitted form was invalid",
            _ => "Something went wrong on our end. Please try again.",
        };

        let page = ErrorTemplate {
            layout: Layout::default(),
            status: status.as_u16(),
            message,
        };
        (status, page).into_response()
    }
}

/// Router fallback for unknown paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
