//! User domain types.

use chrono::{DateTime, Utc};

use inkpost_core::{Email, UserId};

/// Longest display name `users.name` can hold.
pub const NAME_MAX_LENGTH: usize = 250;

/// A registered author.
///
/// Never carries the password hash; see [`crate::db::UserStore::get_password_hash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name shown on posts.
    pub name: String,
    /// Login email (unique).
    pub email: Email,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

/// A user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
}
