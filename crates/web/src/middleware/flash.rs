//! Flash messages and the per-page layout context.
//!
//! Handlers push a [`FlashMessage`] before redirecting; the next page that
//! extracts a [`Layout`] drains the queue and renders it.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::auth::current_user;
use crate::models::{CurrentUser, FlashMessage, session_keys};

/// Queue a flash message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push_flash(
    session: &Session,
    flash: FlashMessage,
) -> Result<(), tower_sessions::session::Error> {
    let mut flashes: Vec<FlashMessage> = session
        .get(session_keys::FLASHES)
        .await?
        .unwrap_or_default();
    flashes.push(flash);
    session.insert(session_keys::FLASHES, flashes).await
}

/// Remove and return all queued flash messages.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn take_flashes(
    session: &Session,
) -> Result<Vec<FlashMessage>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<FlashMessage>>(session_keys::FLASHES)
        .await?
        .unwrap_or_default())
}

/// Data every full page needs: the navigation state and pending flashes.
///
/// Extracting this consumes the flash queue, so only handlers that render a
/// page should take it. Handlers that may either render or redirect call
/// [`Layout::load`] on the render path instead.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub current_user: Option<CurrentUser>,
    pub flashes: Vec<FlashMessage>,
}

impl Layout {
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// Load the layout from `session`, draining its flash queue.
    pub async fn load(session: &Session) -> Self {
        let flashes = take_flashes(session).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read flash messages");
            Vec::new()
        });

        Self {
            current_user: current_user(session).await,
            flashes,
        }
    }
}

impl<S> FromRequestParts<S> for Layout
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(session) => Ok(Self::load(session).await),
            None => Ok(Self::default()),
        }
    }
}
