//! Post listing route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::Layout;
use crate::models::Post;
use crate::state::AppState;

/// Post listing template, shared by the home page and "my posts".
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub posts: Vec<Post>,
}

/// Display every post to logged-in visitors.
///
/// Anonymous visitors see the page without posts.
///
/// # Errors
///
/// Returns `AppError` if the post store fails.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, layout: Layout) -> Result<impl IntoResponse> {
    let posts = state.posts().list_all(layout.current_user.as_ref()).await?;
    tracing::debug!(count = posts.len(), "listing posts");

    Ok(IndexTemplate {
        layout,
        heading: "All posts",
        posts,
    })
}

/// Display the current user's posts.
///
/// # Errors
///
/// Returns `AppError` if the post store fails.
#[instrument(skip_all)]
pub async fn user_posts(
    State(state): State<AppState>,
    layout: Layout,
) -> Result<impl IntoResponse> {
    let posts = state
        .posts()
        .list_by_author(layout.current_user.as_ref())
        .await?;

    Ok(IndexTemplate {
        layout,
        heading: "Your posts",
        posts,
    })
}
