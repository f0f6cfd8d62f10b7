//! User management commands.

use inkpost_web::db::PgUserRepository;
use inkpost_web::services::auth::{AuthError, AuthService};
use thiserror::Error;

use super::{CommandError, connect};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Register a user with the same rules as the web form.
///
/// # Errors
///
/// Returns `UserError::Auth` if the input is invalid or the email is taken.
pub async fn create(name: &str, email: &str, password: &str) -> Result<(), UserError> {
    let users = PgUserRepository::new(connect().await?);
    let user = AuthService::new(&users).register(name, email, password).await?;

    tracing::info!(user_id = %user.id, email = %user.email, "User created");
    Ok(())
}

/// Print every registered user.
///
/// # Errors
///
/// Returns `UserError` if the database is unreachable.
pub async fn list() -> Result<(), UserError> {
    let users = PgUserRepository::new(connect().await?);
    let all = AuthService::new(&users).list_users().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:>6}  {:<24}  EMAIL", "ID", "NAME");
        for user in &all {
            println!("{:>6}  {:<24}  {}", user.id, user.name, user.email);
        }
    }
    Ok(())
}
