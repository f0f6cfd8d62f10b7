//! Post domain types.

use chrono::NaiveDate;

use inkpost_core::{ImageUrl, PostId, UserId};

/// A blog post with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub subtitle: String,
    /// Rich text HTML as produced by the editor.
    pub body: String,
    pub img_url: String,
    /// Creation date (UTC).
    pub date: NaiveDate,
    pub author: PostAuthor,
}

impl Post {
    /// Creation date as shown on the blog, e.g. `August 24, 2024`.
    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }
}

/// The owning user as shown on a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostAuthor {
    pub id: UserId,
    pub name: String,
}

/// Longest title or subtitle `blog_posts` can hold.
pub const HEADING_MAX_LENGTH: usize = 250;

/// The author-editable fields of a post, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: ImageUrl,
}
