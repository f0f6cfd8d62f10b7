//! Post lifecycle service.
//!
//! Every mutating operation takes the current principal explicitly and
//! refuses to run without one.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use inkpost_core::{ImageUrl, PostId};

use crate::db::{PostStore, RepositoryError};
use crate::models::post::{HEADING_MAX_LENGTH, Post, PostContent};
use crate::models::session::CurrentUser;
use crate::services::FieldErrors;

/// Errors from post operations.
#[derive(Debug, Error)]
pub enum PostError {
    /// No principal for an operation that needs one.
    #[error("login required")]
    Unauthorized,

    /// No post with that ID.
    #[error("post {0} not found")]
    NotFound(PostId),

    /// The submitted form didn't validate.
    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create/edit form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub img_url: String,
    #[serde(default)]
    pub body: String,
}

impl PostForm {
    /// Validate every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<PostContent, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title);
        errors.max_length("title", &self.title, HEADING_MAX_LENGTH);
        errors.require("subtitle", &self.subtitle);
        errors.max_length("subtitle", &self.subtitle, HEADING_MAX_LENGTH);
        errors.require("body", &self.body);
        let img_url = ImageUrl::parse(&self.img_url)
            .map_err(|e| errors.push("img_url", e.to_string()))
            .ok();

        match img_url {
            Some(img_url) if errors.is_empty() => Ok(PostContent {
                title: self.title.trim().to_owned(),
                subtitle: self.subtitle.trim().to_owned(),
                body: self.body.clone(),
                img_url,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            img_url: post.img_url.clone(),
            body: post.body.clone(),
        }
    }
}

/// Post lifecycle service.
pub struct PostService<'a> {
    posts: &'a dyn PostStore,
}

impl<'a> PostService<'a> {
    /// Create a new post service.
    #[must_use]
    pub const fn new(posts: &'a dyn PostStore) -> Self {
        Self { posts }
    }

    /// All posts, oldest first.
    ///
    /// Anonymous visitors get an empty list.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Repository` if the store fails.
    pub async fn list_all(&self, principal: Option<&CurrentUser>) -> Result<Vec<Post>, PostError> {
        if principal.is_none() {
            return Ok(Vec::new());
        }
        Ok(self.posts.list_all().await?)
    }

    /// Posts owned by the principal; empty when anonymous.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Repository` if the store fails.
    pub async fn list_by_author(
        &self,
        principal: Option<&CurrentUser>,
    ) -> Result<Vec<Post>, PostError> {
        let Some(user) = principal else {
            return Ok(Vec::new());
        };
        Ok(self.posts.list_by_author(user.id).await?)
    }

    /// A single post.
    ///
    /// # Errors
    ///
    /// Returns `PostError::NotFound` if the post doesn't exist.
    pub async fn get(&self, id: PostId) -> Result<Post, PostError> {
        self.posts.get(id).await?.ok_or(PostError::NotFound(id))
    }

    /// Publish a post dated today (UTC) and owned by the principal.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Unauthorized` without a principal.
    pub async fn create(
        &self,
        principal: Option<&CurrentUser>,
        content: &PostContent,
    ) -> Result<Post, PostError> {
        let user = principal.ok_or(PostError::Unauthorized)?;
        let post = self
            .posts
            .create(content, user.id, Utc::now().date_naive())
            .await?;

        tracing::info!(post_id = %post.id, author_id = %user.id, "post created");
        Ok(post)
    }

    /// Overwrite a post's content.
    ///
    /// Any logged-in user may edit any post, and the post's author becomes
    /// the editor.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Unauthorized` without a principal.
    /// Returns `PostError::NotFound` if the post doesn't exist.
    pub async fn edit(
        &self,
        id: PostId,
        principal: Option<&CurrentUser>,
        content: &PostContent,
    ) -> Result<Post, PostError> {
        let user = principal.ok_or(PostError::Unauthorized)?;
        let post = self
            .posts
            .update(id, content, user.id)
            .await?
            .ok_or(PostError::NotFound(id))?;

        tracing::info!(post_id = %id, editor_id = %user.id, "post edited");
        Ok(post)
    }

    /// Delete a post.
    ///
    /// There is no ownership check: any logged-in user may delete any post.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Unauthorized` without a principal.
    /// Returns `PostError::NotFound` if the post doesn't exist.
    pub async fn delete(&self, id: PostId, principal: Option<&CurrentUser>) -> Result<(), PostError> {
        let user = principal.ok_or(PostError::Unauthorized)?;
        if !self.posts.delete(id).await? {
            return Err(PostError::NotFound(id));
        }

        tracing::info!(post_id = %id, user_id = %user.id, "post deleted");
        Ok(())
    }
}
