use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config;
use crate::database::models::{MediaKind, Post};
use crate::media::{MediaError, MediaStore, TransformSpec};

use super::post_service::{PostError, PostService, PostStore};

/// Instagram-style caption bound
pub const MAX_CAPTION_CHARS: usize = 2_200;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Post(#[from] PostError),
}

/// Orchestrates a media upload: validate, push the payload to the media
/// store with caption-overlay instructions, then record the post.
///
/// All-or-nothing locally: a post row is written only after the media store
/// accepted the payload. If the local write fails after remote success the
/// remote object is orphaned; that gap is accepted and not reconciled here.
pub struct UploadPipeline<'a, S: PostStore, M: MediaStore> {
    media_store: &'a M,
    posts: &'a PostService<S>,
}

impl<'a, S: PostStore, M: MediaStore> UploadPipeline<'a, S, M> {
    pub fn new(media_store: &'a M, posts: &'a PostService<S>) -> Self {
        Self { media_store, posts }
    }

    pub async fn upload(
        &self,
        acting_user: Uuid,
        media_bytes: Bytes,
        media_kind: MediaKind,
        caption: String,
    ) -> Result<Post, UploadError> {
        // Fail fast before any remote call
        validate(&media_bytes, &caption)?;

        let transform = TransformSpec::caption_overlay(&caption, &config::config().media);
        let stored = self
            .media_store
            .store(media_bytes, media_kind, &transform)
            .await?;

        // Remote success: record exactly one local row referencing it
        let post = self
            .posts
            .create_post(acting_user, stored.media_id, stored.url, media_kind, caption)
            .await?;

        info!(post_id = %post.id, media_ref = %post.media_ref, "Upload complete");
        Ok(post)
    }
}

fn validate(media_bytes: &Bytes, caption: &str) -> Result<(), UploadError> {
    if media_bytes.is_empty() {
        return Err(UploadError::Validation("Media payload is empty".to_string()));
    }

    let max = config::config().media.max_upload_bytes;
    if media_bytes.len() > max {
        return Err(UploadError::Validation(format!(
            "Media payload exceeds {} byte limit",
            max
        )));
    }

    if caption.chars().count() > MAX_CAPTION_CHARS {
        return Err(UploadError::Validation(format!(
            "Caption exceeds {} characters",
            MAX_CAPTION_CHARS
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::MockMediaStore;
    use crate::services::post_service::testing::MemoryPostStore;

    fn posts() -> PostService<MemoryPostStore> {
        PostService::new(MemoryPostStore::new())
    }

    #[tokio::test]
    async fn successful_upload_creates_exactly_one_post() {
        let media = MockMediaStore::succeeding();
        let posts = posts();
        let pipeline = UploadPipeline::new(&media, &posts);
        let owner = Uuid::new_v4();

        let post = pipeline
            .upload(
                owner,
                Bytes::from_static(b"jpegdata"),
                MediaKind::Image,
                "hello".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(media.call_count(), 1);
        assert_eq!(post.owner_id, owner);
        assert_eq!(post.caption, "hello");
        assert_eq!(post.media_id, "m1");
        assert_eq!(post.media_ref, "https://media.test/m1");

        let feed = posts.list_posts().await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, post.id);
    }

    #[tokio::test]
    async fn media_store_failure_leaves_no_post_behind() {
        let media = MockMediaStore::failing();
        let posts = posts();
        let before = posts.list_posts().await.unwrap().len();
        let pipeline = UploadPipeline::new(&media, &posts);

        let err = pipeline
            .upload(
                Uuid::new_v4(),
                Bytes::from_static(b"jpegdata"),
                MediaKind::Image,
                "hello".to_string(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Media(_)));
        assert_eq!(media.call_count(), 1);
        assert_eq!(posts.list_posts().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn empty_payload_fails_before_any_remote_call() {
        let media = MockMediaStore::succeeding();
        let posts = posts();
        let pipeline = UploadPipeline::new(&media, &posts);

        let err = pipeline
            .upload(
                Uuid::new_v4(),
                Bytes::new(),
                MediaKind::Image,
                "hello".to_string(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Validation(_)));
        assert_eq!(media.call_count(), 0);
        assert!(posts.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_caption_is_rejected() {
        let media = MockMediaStore::succeeding();
        let posts = posts();
        let pipeline = UploadPipeline::new(&media, &posts);

        let caption = "x".repeat(MAX_CAPTION_CHARS + 1);
        let err = pipeline
            .upload(
                Uuid::new_v4(),
                Bytes::from_static(b"jpegdata"),
                MediaKind::ShortVideo,
                caption,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Validation(_)));
        assert_eq!(media.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_caption_is_allowed() {
        let media = MockMediaStore::succeeding();
        let posts = posts();
        let pipeline = UploadPipeline::new(&media, &posts);

        let post = pipeline
            .upload(
                Uuid::new_v4(),
                Bytes::from_static(b"mp4data"),
                MediaKind::ShortVideo,
                String::new(),
            )
            .await
            .unwrap();
        assert_eq!(post.caption, "");
    }

    // The end-to-end ownership scenario: A uploads, B cannot delete, A can.
    #[tokio::test]
    async fn upload_then_ownership_enforced_on_delete() {
        let media = MockMediaStore::succeeding();
        let posts = posts();
        let pipeline = UploadPipeline::new(&media, &posts);
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();

        let post = pipeline
            .upload(
                user_a,
                Bytes::from_static(b"jpegdata"),
                MediaKind::Image,
                "hello".to_string(),
            )
            .await
            .unwrap();

        let feed = posts.list_posts().await.unwrap();
        assert_eq!(feed[0].caption, "hello");
        assert_eq!(feed[0].media_ref, "https://media.test/m1");
        assert_eq!(feed[0].owner_id, user_a);

        let err = posts.delete_post(user_b, post.id).await.unwrap_err();
        assert!(matches!(err, PostError::Forbidden));

        posts.delete_post(user_a, post.id).await.unwrap();
        assert!(posts.list_posts().await.unwrap().is_empty());
    }
}
