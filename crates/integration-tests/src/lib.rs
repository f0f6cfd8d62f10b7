//! Integration test helpers for Inkpost.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the server
//! cargo run -p inkpost-cli -- migrate
//! cargo run -p inkpost-web
//!
//! # Run the ignored HTTP tests against it
//! cargo test -p inkpost-integration-tests -- --ignored
//! ```
//!
//! Set `INKPOST_BASE_URL` to target a server other than
//! `http://localhost:3000`.

use reqwest::Client;
use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("INKPOST_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// A browser-like client: keeps cookies and follows redirects.
///
/// # Errors
///
/// Returns `reqwest::Error` if the TLS backend cannot be initialized.
pub fn browser() -> reqwest::Result<Client> {
    Client::builder().cookie_store(true).build()
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}
