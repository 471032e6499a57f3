use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{MediaKind, NewPost, Post};
use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("post not found")]
    NotFound,

    #[error("acting user does not own this post")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Persistence seam for posts. The Postgres implementation is the production
/// path; tests use an in-memory implementation.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post, generating id and created_at. One durable write.
    async fn insert(&self, new_post: NewPost) -> Result<Post, DatabaseError>;

    /// All posts, newest first, ties broken by id descending.
    async fn list_newest_first(&self) -> Result<Vec<Post>, DatabaseError>;

    async fn find(&self, id: Uuid) -> Result<Option<Post>, DatabaseError>;

    /// Permanently remove a post row. Returns false when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

/// Business rules over the post store: creation on behalf of the acting
/// user, the global feed, and owner-only deletion.
pub struct PostService<S: PostStore> {
    store: S,
}

impl<S: PostStore> PostService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist a post owned by the acting user. Callers must only pass media
    /// references that the media store has already accepted.
    pub async fn create_post(
        &self,
        acting_user: Uuid,
        media_id: String,
        media_ref: String,
        media_kind: MediaKind,
        caption: String,
    ) -> Result<Post, PostError> {
        let post = self
            .store
            .insert(NewPost {
                owner_id: acting_user,
                media_id,
                media_ref,
                media_kind,
                caption,
            })
            .await?;

        info!(post_id = %post.id, owner_id = %post.owner_id, "Created post");
        Ok(post)
    }

    /// The global feed: every post, newest first. Any authenticated caller
    /// may read it.
    pub async fn list_posts(&self) -> Result<Vec<Post>, PostError> {
        Ok(self.store.list_newest_first().await?)
    }

    /// Delete a post owned by the acting user. Existence is checked before
    /// ownership so a missing post is NotFound, never Forbidden.
    pub async fn delete_post(&self, acting_user: Uuid, post_id: Uuid) -> Result<(), PostError> {
        let post = self.store.find(post_id).await?.ok_or(PostError::NotFound)?;

        if post.owner_id != acting_user {
            return Err(PostError::Forbidden);
        }

        // The row may have raced away between find and delete
        if !self.store.delete(post_id).await? {
            return Err(PostError::NotFound);
        }

        // The remote media object is left in place; see DESIGN.md on drift
        info!(post_id = %post_id, owner_id = %acting_user, "Deleted post");
        Ok(())
    }
}

/// Postgres-backed post store
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert(&self, new_post: NewPost) -> Result<Post, DatabaseError> {
        let post = Post {
            id: Uuid::new_v4(),
            owner_id: new_post.owner_id,
            media_id: new_post.media_id,
            media_ref: new_post.media_ref,
            media_kind: new_post.media_kind,
            caption: new_post.caption,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO posts (id, owner_id, media_id, media_ref, media_kind, caption, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(post.id)
        .bind(post.owner_id)
        .bind(&post.media_id)
        .bind(&post.media_ref)
        .bind(post.media_kind)
        .bind(&post.caption)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list_newest_first(&self) -> Result<Vec<Post>, DatabaseError> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, owner_id, media_id, media_ref, media_kind, caption, created_at
             FROM posts
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Post>, DatabaseError> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, owner_id, media_id, media_ref, media_kind, caption, created_at
             FROM posts
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// In-memory post store for unit tests
    #[derive(Default)]
    pub struct MemoryPostStore {
        posts: Mutex<Vec<Post>>,
    }

    impl MemoryPostStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a fully-formed post, bypassing id/timestamp generation
        pub fn push_raw(&self, post: Post) {
            self.posts.lock().unwrap().push(post);
        }
    }

    #[async_trait]
    impl PostStore for MemoryPostStore {
        async fn insert(&self, new_post: NewPost) -> Result<Post, DatabaseError> {
            let post = Post {
                id: Uuid::new_v4(),
                owner_id: new_post.owner_id,
                media_id: new_post.media_id,
                media_ref: new_post.media_ref,
                media_kind: new_post.media_kind,
                caption: new_post.caption,
                created_at: Utc::now(),
            };
            self.posts.lock().unwrap().push(post.clone());
            Ok(post)
        }

        async fn list_newest_first(&self) -> Result<Vec<Post>, DatabaseError> {
            let mut posts = self.posts.lock().unwrap().clone();
            posts.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            Ok(posts)
        }

        async fn find(&self, id: Uuid) -> Result<Option<Post>, DatabaseError> {
            Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
            let mut posts = self.posts.lock().unwrap();
            let before = posts.len();
            posts.retain(|p| p.id != id);
            Ok(posts.len() < before)
        }
    }
}
