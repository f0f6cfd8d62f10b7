//! Database operations for the blog's `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `users` - Registered authors (unique email, Argon2 password hash)
//! - `blog_posts` - Posts, each owned by exactly one user
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p inkpost-cli -- migrate
//! ```
//!
//! Services talk to the store through the [`UserStore`] and [`PostStore`]
//! traits so they can be exercised without a database.

pub mod posts;
pub mod users;

#[cfg(test)]
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use inkpost_core::{Email, PostId, UserId};

use crate::models::post::{Post, PostContent};
use crate::models::user::{NewUser, User};

pub use posts::PgPostRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by email.
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Look up a user together with their stored password hash.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Insert a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
}

/// Persistence for blog posts.
///
/// Every method returning a [`Post`] fills in the author's display name.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts in insertion order.
    async fn list_all(&self) -> Result<Vec<Post>, RepositoryError>;

    /// Posts owned by `author`, in insertion order.
    async fn list_by_author(&self, author: UserId) -> Result<Vec<Post>, RepositoryError>;

    /// A single post.
    async fn get(&self, id: PostId) -> Result<Option<Post>, RepositoryError>;

    /// Insert a post.
    async fn create(
        &self,
        content: &PostContent,
        author: UserId,
        date: NaiveDate,
    ) -> Result<Post, RepositoryError>;

    /// Overwrite a post's content and author. `None` if the post doesn't exist.
    async fn update(
        &self,
        id: PostId,
        content: &PostContent,
        author: UserId,
    ) -> Result<Option<Post>, RepositoryError>;

    /// Delete a post. `false` if it didn't exist.
    async fn delete(&self, id: PostId) -> Result<bool, RepositoryError>;
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
