//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::BlogConfig;
use crate::db::{PostStore, UserStore};
use crate::services::auth::AuthService;
use crate::services::posts::PostService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Stores are trait objects so the router can
/// run against `PostgreSQL` in production and in-memory stores in tests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BlogConfig,
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: BlogConfig, users: Arc<dyn UserStore>, posts: Arc<dyn PostStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                posts,
            }),
        }
    }

    /// Get a reference to the blog configuration.
    #[must_use]
    pub fn config(&self) -> &BlogConfig {
        &self.inner.config
    }

    /// Authentication service over the user store.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.inner.users.as_ref())
    }

    /// Post service over the post store.
    #[must_use]
    pub fn posts(&self) -> PostService<'_> {
        PostService::new(self.inner.posts.as_ref())
    }
}
