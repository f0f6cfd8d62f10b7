//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::FieldErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] inkpost_core::EmailError),

    /// The email is already registered.
    #[error("email already registered")]
    DuplicateEmail,

    /// No user with that email.
    #[error("user does not exist")]
    UserNotFound,

    /// The password didn't match the stored hash.
    #[error("wrong password")]
    InvalidPassword,

    /// Required fields missing or malformed.
    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Flash text for errors the user can act on. `None` means the error is
    /// unexpected and should surface as a server error.
    #[must_use]
    pub const fn flash_message(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateEmail => Some("Email already registered"),
            Self::UserNotFound => Some("User does not exist"),
            Self::InvalidPassword => Some("Wrong password"),
            Self::InvalidEmail(_) | Self::Validation(_) => Some("Please check the form and try again."),
            Self::Repository(_) | Self::PasswordHash => None,
        }
    }
}
