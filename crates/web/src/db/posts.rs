//! Post repository for database operations.
//!
//! Writes are single statements; inserts and updates use a CTE so the
//! returned row already carries the author's name.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use inkpost_core::{PostId, UserId};

use super::{PostStore, RepositoryError};
use crate::models::post::{Post, PostAuthor, PostContent};

const POST_COLUMNS: &str = "p.id, p.title, p.subtitle, p.body, p.img_url, p.date, \
                            p.author_id, u.name AS author_name";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: PostId,
    title: String,
    subtitle: String,
    body: String,
    img_url: String,
    date: NaiveDate,
    author_id: UserId,
    author_name: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            body: row.body,
            img_url: row.img_url,
            date: row.date,
            author: PostAuthor {
                id: row.author_id,
                name: row.author_name,
            },
        }
    }
}

/// `PostgreSQL`-backed [`PostStore`].
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostRepository {
    async fn list_all(&self) -> Result<Vec<Post>, RepositoryError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM blog_posts p JOIN users u ON u.id = p.author_id \
             ORDER BY p.id ASC"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn list_by_author(&self, author: UserId) -> Result<Vec<Post>, RepositoryError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM blog_posts p JOIN users u ON u.id = p.author_id \
             WHERE p.author_id = $1 ORDER BY p.id ASC"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(author)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM blog_posts p JOIN users u ON u.id = p.author_id \
             WHERE p.id = $1"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Post::from))
    }

    async fn create(
        &self,
        content: &PostContent,
        author: UserId,
        date: NaiveDate,
    ) -> Result<Post, RepositoryError> {
        let sql = format!(
            "WITH p AS (
                INSERT INTO blog_posts (title, subtitle, body, img_url, date, author_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
             )
             SELECT {POST_COLUMNS} FROM p JOIN users u ON u.id = p.author_id"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&content.title)
            .bind(&content.subtitle)
            .bind(&content.body)
            .bind(content.img_url.as_str())
            .bind(date)
            .bind(author)
            .fetch_one(&self.pool)
            .await?;

        Ok(Post::from(row))
    }

    async fn update(
        &self,
        id: PostId,
        content: &PostContent,
        author: UserId,
    ) -> Result<Option<Post>, RepositoryError> {
        let sql = format!(
            "WITH p AS (
                UPDATE blog_posts
                SET title = $1, subtitle = $2, body = $3, img_url = $4, author_id = $5
                WHERE id = $6
                RETURNING *
             )
             SELECT {POST_COLUMNS} FROM p JOIN users u ON u.id = p.author_id"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&content.title)
            .bind(&content.subtitle)
            .bind(&content.body)
            .bind(content.img_url.as_str())
            .bind(author)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Post::from))
    }

    async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
