use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;
use std::sync::OnceLock;
use tracing::info;

use crate::config;
use crate::database::models::MediaKind;

use super::{MediaError, MediaStore, StoredMedia, TransformSpec};

/// HTTP implementation of the media store contract. Posts the payload and
/// transform instructions as multipart form data to `{base_url}/v1/media`.
pub struct HttpMediaStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpMediaStore {
    /// Shared instance built from configuration
    pub fn shared() -> Result<&'static HttpMediaStore, MediaError> {
        static INSTANCE: OnceLock<Result<HttpMediaStore, String>> = OnceLock::new();
        let built = INSTANCE.get_or_init(|| {
            let media = &config::config().media;
            HttpMediaStore::new(&media.base_url, &media.api_key).map_err(|e| e.to_string())
        });
        match built {
            Ok(store) => Ok(store),
            Err(msg) => Err(MediaError::InvalidEndpoint(msg.clone())),
        }
    }

    pub fn new(base_url: &str, api_key: &str) -> Result<Self, MediaError> {
        // Append to the configured path instead of replacing it, so a base
        // URL like https://host/media-svc keeps its prefix
        let endpoint = format!("{}/v1/media", base_url.trim_end_matches('/'));
        url::Url::parse(&endpoint)
            .map_err(|_| MediaError::InvalidEndpoint(base_url.to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn store(
        &self,
        payload: Bytes,
        kind: MediaKind,
        transform: &TransformSpec,
    ) -> Result<StoredMedia, MediaError> {
        let size = payload.len();

        let file_part = multipart::Part::stream(payload)
            .file_name(format!("upload.{}", kind))
            .mime_str("application/octet-stream")?;

        let transform_json = serde_json::to_string(transform)?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("kind", kind.as_str())
            .text("transform", transform_json);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let stored: StoredMedia = response.json().await?;
        info!(media_id = %stored.media_id, size, kind = %kind, "Stored media object");
        Ok(stored)
    }
}
