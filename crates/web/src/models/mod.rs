//! Domain models for the blog.
//!
//! These are validated domain objects, separate from database row types and
//! from the raw form payloads in `routes`.

pub mod post;
pub mod session;
pub mod user;

pub use post::{Post, PostAuthor, PostContent};
pub use session::{CurrentUser, FlashMessage, keys as session_keys};
pub use user::{NewUser, User};
