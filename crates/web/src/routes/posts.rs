//! Post route handlers: show, create, edit, delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use inkpost_core::PostId;

use super::redirect_with_flash;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::auth::{LOGIN_PATH, LOGIN_REQUIRED_MESSAGE};
use crate::middleware::{Layout, RequireAuth};
use crate::models::{FlashMessage, Post};
use crate::services::FieldErrors;
use crate::services::posts::{PostError, PostForm};
use crate::state::AppState;

/// Flash shown when a post ID doesn't exist.
pub const POST_NOT_FOUND_MESSAGE: &str = "Post not found";

/// Post ID taken from the URL.
///
/// A segment that isn't a number can't name a post, so it is a plain 404
/// rather than the "Post not found" redirect used for unknown numeric IDs.
pub struct PostPath(pub PostId);

impl<S> FromRequestParts<S> for PostPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Path::<PostId>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|e| AppError::NotFound(e.body_text()))
    }
}

/// Single post template.
#[derive(Template, WebTemplate)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub layout: Layout,
    pub post: Post,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "make_post.html")]
pub struct PostFormTemplate {
    pub layout: Layout,
    pub form: PostForm,
    pub errors: FieldErrors,
    /// Set when editing an existing post.
    pub editing: Option<PostId>,
}

impl PostFormTemplate {
    fn action(&self) -> String {
        self.editing
            .map_or_else(|| "/make-post".to_owned(), |id| format!("/edit-post/{id}"))
    }
}

/// Turn expected post failures into a flash and redirect.
async fn post_failure(session: &Session, err: PostError) -> Result<Response> {
    match err {
        PostError::NotFound(id) => {
            tracing::debug!(post_id = %id, "post not found");
            redirect_with_flash(session, FlashMessage::new(POST_NOT_FOUND_MESSAGE), "/").await
        }
        PostError::Unauthorized => {
            redirect_with_flash(
                session,
                FlashMessage::new(LOGIN_REQUIRED_MESSAGE),
                LOGIN_PATH,
            )
            .await
        }
        other => Err(other.into()),
    }
}

/// Re-render the form with validation messages.
async fn invalid_form(
    session: &Session,
    form: PostForm,
    errors: FieldErrors,
    editing: Option<PostId>,
) -> Response {
    let page = PostFormTemplate {
        layout: Layout::load(session).await,
        form,
        errors,
        editing,
    };
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

/// Display a single post.
///
/// # Errors
///
/// Returns `AppError` if the post store or session fails.
#[instrument(skip_all, fields(post_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    PostPath(id): PostPath,
) -> Result<Response> {
    match state.posts().get(id).await {
        Ok(post) => Ok(PostTemplate {
            layout: Layout::load(&session).await,
            post,
        }
        .into_response()),
        Err(e) => post_failure(&session, e).await,
    }
}

/// Display the new post form.
pub async fn new_page(RequireAuth(_user): RequireAuth, layout: Layout) -> impl IntoResponse {
    PostFormTemplate {
        layout,
        form: PostForm::default(),
        errors: FieldErrors::new(),
        editing: None,
    }
}

/// Publish a new post and return to the home page.
///
/// # Errors
///
/// Returns `AppError` if the post store or session fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let content = match form.validate() {
        Ok(content) => content,
        Err(errors) => return Ok(invalid_form(&session, form, errors, None).await),
    };

    match state.posts().create(Some(&user), &content).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) => post_failure(&session, e).await,
    }
}

/// Display the edit form pre-filled with the post.
///
/// # Errors
///
/// Returns `AppError` if the post store or session fails.
#[instrument(skip_all, fields(post_id = %id))]
pub async fn edit_page(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    PostPath(id): PostPath,
) -> Result<Response> {
    match state.posts().get(id).await {
        Ok(post) => Ok(PostFormTemplate {
            layout: Layout::load(&session).await,
            form: PostForm::from(&post),
            errors: FieldErrors::new(),
            editing: Some(id),
        }
        .into_response()),
        Err(e) => post_failure(&session, e).await,
    }
}

/// Save an edit and return to the home page.
///
/// The editor becomes the post's author.
///
/// # Errors
///
/// Returns `AppError` if the post store or session fails.
#[instrument(skip_all, fields(post_id = %id, user_id = %user.id))]
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    PostPath(id): PostPath,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let content = match form.validate() {
        Ok(content) => content,
        Err(errors) => return Ok(invalid_form(&session, form, errors, Some(id)).await),
    };

    match state.posts().edit(id, Some(&user), &content).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) => post_failure(&session, e).await,
    }
}

/// Delete a post and return to the home page.
///
/// # Errors
///
/// Returns `AppError` if the post store or session fails.
#[instrument(skip_all, fields(post_id = %id, user_id = %user.id))]
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    PostPath(id): PostPath,
) -> Result<Response> {
    match state.posts().delete(id, Some(&user)).await {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(e) => post_failure(&session, e).await,
    }
}
