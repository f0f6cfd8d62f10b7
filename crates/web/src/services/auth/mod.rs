//! Authentication service.
//!
//! Password registration and login. Session handling lives in
//! [`crate::middleware::auth`]; this module only decides who the caller is.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;

use inkpost_core::Email;

use crate::db::{RepositoryError, UserStore};
use crate::models::user::{NAME_MAX_LENGTH, NewUser, User};
use crate::services::FieldErrors;

/// Registration form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterForm {
    /// Check every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.max_length("name", &self.name, NAME_MAX_LENGTH);
        check_email(&mut errors, &self.email);
        errors.require("password", &self.password);
        errors.into_result()
    }
}

/// Login form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Check every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        errors.require("password", &self.password);
        errors.into_result()
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if let Err(e) = Email::parse(email) {
        errors.push("email", e.to_string());
    }
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserStore) -> Self {
        Self { users }
    }

    /// Register a new user.
    ///
    /// The caller is responsible for logging the new user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the name or password is blank, or
    /// the name is too long.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();
        errors.require("name", name);
        errors.max_length("name", name, NAME_MAX_LENGTH);
        errors.require("password", password);
        errors.into_result().map_err(AuthError::Validation)?;

        let email = Email::parse(email)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(password.to_owned()).await?;

        // A concurrent registration can still win the race; the unique
        // constraint reports it as a conflict.
        let user = self
            .users
            .create(&NewUser {
                name: name.trim().to_owned(),
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserNotFound` if no user has that email.
    /// Returns `AuthError::InvalidPassword` if the password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password.to_owned(), password_hash).await?;

        Ok(user)
    }

    /// All registered users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }
}

/// Hash a password using Argon2id on the blocking pool.
async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|_| AuthError::PasswordHash)?
    .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC string on the blocking pool.
async fn verify_password(password: String, hash: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&hash).map_err(|_| AuthError::PasswordHash)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidPassword)
    })
    .await
    .map_err(|_| AuthError::PasswordHash)?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryUserStore;

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);

        let alice = auth.register("Alice", "a@x.com", "pw1").await.unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.email.as_str(), "a@x.com");

        let logged_in = auth.login("a@x.com", "pw1").await.unwrap();
        assert_eq!(logged_in, alice);
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);
        auth.register("Alice", "a@x.com", "pw1").await.unwrap();

        let email = Email::parse("a@x.com").unwrap();
        let (_, hash) = store.get_password_hash(&email).await.unwrap().unwrap();
        assert_ne!(hash, "pw1");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);
        let first = auth.register("Alice", "a@x.com", "pw1").await.unwrap();

        let err = auth.register("Mallory", "a@x.com", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));

        // The first account still works with its own password.
        let users = store.list().await.unwrap();
        assert_eq!(users, vec![first.clone()]);
        assert_eq!(auth.login("a@x.com", "pw1").await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);
        auth.register("Alice", "a@x.com", "pw1").await.unwrap();

        let err = auth.login("a@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidPassword));
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);

        let err = auth.login("nobody@x.com", "pw1").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);

        let err = auth.register(" ", "a@x.com", "").await.unwrap_err();
        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.get("name").is_some());
        assert!(errors.get("password").is_some());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_overlong_name() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);

        let err = auth
            .register(&"n".repeat(300), "a@x.com", "pw1")
            .await
            .unwrap_err();
        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.get("name").is_some());
        assert!(store.list().await.unwrap().is_empty());

        let form = RegisterForm {
            name: "n".repeat(300),
            email: "a@x.com".into(),
            password: "pw1".into(),
        };
        assert_eq!(
            form.validate().unwrap_err().get("name"),
            Some("Field cannot be longer than 250 characters.")
        );
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);

        let err = auth.register("Alice", "not-an-email", "pw1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[test]
    fn test_register_form_validation() {
        let form = RegisterForm {
            name: "Alice".into(),
            email: "a@@x".into(),
            password: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("name").is_none());
        assert!(errors.get("email").is_some());
        assert_eq!(errors.get("password"), Some("This field is required."));
    }

    #[test]
    fn test_login_form_validation() {
        let ok = LoginForm {
            email: "a@x.com".into(),
            password: "pw1".into(),
        };
        assert!(ok.validate().is_ok());

        let blank = LoginForm::default();
        let errors = blank.validate().unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn test_flash_messages() {
        assert_eq!(
            AuthError::DuplicateEmail.flash_message(),
            Some("Email already registered")
        );
        assert_eq!(AuthError::UserNotFound.flash_message(), Some("User does not exist"));
        assert_eq!(AuthError::InvalidPassword.flash_message(), Some("Wrong password"));
        assert_eq!(AuthError::PasswordHash.flash_message(), None);
    }
}
