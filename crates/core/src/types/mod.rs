//! Core types for Inkpost.

pub mod email;
pub mod id;
pub mod image_url;

pub use email::{Email, EmailError};
pub use id::{PostId, UserId};
pub use image_url::{ImageUrl, ImageUrlError};
