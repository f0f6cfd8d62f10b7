//! Inkpost Core - Shared types library.
//!
//! Types used by every Inkpost component:
//! - `web` - The blog web application
//! - `cli` - Migrations and user management
//!
//! The core crate holds only validated value types. It performs no I/O, so it
//! can be used from request handlers, the CLI and tests alike.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses and image URLs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
