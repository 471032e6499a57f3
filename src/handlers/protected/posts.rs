// Post endpoints: upload/create, global feed, owner-only delete. All of
// these sit behind the bearer-token middleware.

use axum::{
    extract::{Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use bytes::Bytes;
use serde_json::json;
use uuid::Uuid;

use crate::database::models::MediaKind;
use crate::database::Database;
use crate::error::ApiError;
use crate::media::HttpMediaStore;
use crate::middleware::AuthUser;
use crate::services::{PgPostStore, PostService, UploadPipeline};

async fn post_service() -> Result<PostService<PgPostStore>, ApiError> {
    let pool = Database::pool().await?;
    Ok(PostService::new(PgPostStore::new(pool)))
}

/// POST /api/posts - Upload media with a caption and create a post
///
/// Multipart body: a `file` part carrying the payload (media kind inferred
/// from its content type or filename) and a `caption` text part. The post is
/// recorded only after the media store accepts the payload.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut payload: Option<Bytes> = None;
    let mut media_kind: Option<MediaKind> = None;
    let mut caption = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let kind_from_type = field
                    .content_type()
                    .and_then(MediaKind::from_content_type);
                let kind_from_name = field.file_name().and_then(MediaKind::from_extension);
                media_kind = kind_from_type.or(kind_from_name);

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
                payload = Some(bytes);
            }
            "caption" => {
                caption = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read caption: {}", e)))?;
            }
            _ => {}
        }
    }

    let payload = payload
        .ok_or_else(|| ApiError::validation_error("Missing 'file' part in upload"))?;
    let media_kind = media_kind.ok_or_else(|| {
        ApiError::validation_error("Unsupported media kind; expected an image or a short video")
    })?;

    let posts = post_service().await?;
    let media_store = HttpMediaStore::shared()?;
    let pipeline = UploadPipeline::new(media_store, &posts);

    let post = pipeline
        .upload(auth.user_id, payload, media_kind, caption)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": post })),
    ))
}

/// GET /api/posts - The global feed, newest first
pub async fn list(Extension(_auth): Extension<AuthUser>) -> Result<impl IntoResponse, ApiError> {
    let posts = post_service().await?.list_posts().await?;
    Ok(Json(json!({ "success": true, "data": { "posts": posts } })))
}

/// DELETE /api/posts/:id - Delete a post the acting user owns
///
/// 404 when the post does not exist, 403 when it belongs to someone else.
pub async fn remove(
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    post_service().await?.delete_post(auth.user_id, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
