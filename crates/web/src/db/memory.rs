//! In-memory stores for tests.
//!
//! Mirror the `PostgreSQL` semantics the services rely on: unique emails,
//! `SERIAL`-style IDs that are never reused, insertion ordering, and the
//! author name joined onto every post.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use inkpost_core::{Email, PostId, UserId};

use super::{PostStore, RepositoryError, UserStore};
use crate::models::post::{Post, PostAuthor, PostContent};
use crate::models::user::{NewUser, User};

#[derive(Default)]
struct UserTable {
    next_id: i32,
    rows: Vec<(User, String)>,
}

/// In-memory [`UserStore`]. Clones share the same table.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<Mutex<UserTable>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_of(&self, id: UserId) -> Option<String> {
        let table = self.inner.lock().unwrap();
        table
            .rows
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.name.clone())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .get_password_hash(email)
            .await?
            .map(|(user, _)| user))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let table = self.inner.lock().unwrap();
        Ok(table.rows.iter().find(|(u, _)| &u.email == email).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut table = self.inner.lock().unwrap();
        if table.rows.iter().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        table.next_id += 1;
        let created = User {
            id: UserId::new(table.next_id),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: Utc::now(),
        };
        table
            .rows
            .push((created.clone(), user.password_hash.clone()));
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let table = self.inner.lock().unwrap();
        Ok(table.rows.iter().map(|(u, _)| u.clone()).collect())
    }
}

#[derive(Default)]
struct PostTable {
    next_id: i32,
    rows: Vec<Post>,
}

/// In-memory [`PostStore`] that resolves author names from a [`MemoryUserStore`].
#[derive(Clone)]
pub struct MemoryPostStore {
    users: MemoryUserStore,
    inner: Arc<Mutex<PostTable>>,
}

impl MemoryPostStore {
    pub fn new(users: MemoryUserStore) -> Self {
        Self {
            users,
            inner: Arc::default(),
        }
    }

    /// Number of stored posts.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    fn author(&self, id: UserId) -> Result<PostAuthor, RepositoryError> {
        // Stands in for the foreign key on blog_posts.author_id
        let name = self
            .users
            .name_of(id)
            .ok_or_else(|| RepositoryError::Conflict(format!("no user {id}")))?;
        Ok(PostAuthor { id, name })
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn list_all(&self) -> Result<Vec<Post>, RepositoryError> {
        Ok(self.inner.lock().unwrap().rows.clone())
    }

    async fn list_by_author(&self, author: UserId) -> Result<Vec<Post>, RepositoryError> {
        let table = self.inner.lock().unwrap();
        Ok(table
            .rows
            .iter()
            .filter(|p| p.author.id == author)
            .cloned()
            .collect())
    }

    async fn get(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let table = self.inner.lock().unwrap();
        Ok(table.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn create(
        &self,
        content: &PostContent,
        author: UserId,
        date: NaiveDate,
    ) -> Result<Post, RepositoryError> {
        let author = self.author(author)?;
        let mut table = self.inner.lock().unwrap();
        table.next_id += 1;
        let post = Post {
            id: PostId::new(table.next_id),
            title: content.title.clone(),
            subtitle: content.subtitle.clone(),
            body: content.body.clone(),
            img_url: content.img_url.as_str().to_owned(),
            date,
            author,
        };
        table.rows.push(post.clone());
        Ok(post)
    }

    async fn update(
        &self,
        id: PostId,
        content: &PostContent,
        author: UserId,
    ) -> Result<Option<Post>, RepositoryError> {
        let author = self.author(author)?;
        let mut table = self.inner.lock().unwrap();
        let Some(post) = table.rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        post.title.clone_from(&content.title);
        post.subtitle.clone_from(&content.subtitle);
        post.body.clone_from(&content.body);
        post.img_url = content.img_url.as_str().to_owned();
        post.author = author;
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let mut table = self.inner.lock().unwrap();
        let before = table.rows.len();
        table.rows.retain(|p| p.id != id);
        Ok(table.rows.len() < before)
    }
}
