//! HTTP route handlers for the blog.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - All posts (logged-in visitors only)
//! GET  /user-posts             - Posts by the current user
//! GET  /post/{id}              - Single post
//! GET  /about                  - About page
//! GET  /contact                - Contact page
//!
//! # Authoring (requires login)
//! GET  /make-post              - New post form
//! POST /make-post              - Publish a post
//! GET  /edit-post/{id}         - Pre-filled edit form
//! POST /edit-post/{id}         - Save an edit
//! GET  /delete-post/{id}       - Delete a post
//! POST /delete-post/{id}       - Delete a post
//!
//! # Auth
//! GET  /register               - Registration page
//! POST /register               - Create account and log in
//! GET  /login                  - Login page
//! POST /login                  - Log in
//! GET  /logout                 - Log out
//! ```

pub mod auth;
pub mod home;
pub mod pages;
pub mod posts;

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::push_flash;
use crate::models::FlashMessage;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
}

/// Create the post routes router.
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/post/{id}", get(posts::show))
        .route("/make-post", get(posts::new_page).post(posts::create))
        .route("/edit-post/{id}", get(posts::edit_page).post(posts::update))
        .route(
            "/delete-post/{id}",
            get(posts::delete).post(posts::delete),
        )
}

/// Create all routes for the blog.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/user-posts", get(home::user_posts))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .merge(post_routes())
        .merge(auth_routes())
}

/// Queue `flash` and redirect to `to`.
pub(crate) async fn redirect_with_flash(
    session: &Session,
    flash: FlashMessage,
    to: &str,
) -> Result<Response> {
    push_flash(session, flash).await?;
    Ok(Redirect::to(to).into_response())
}
