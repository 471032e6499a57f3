//! Client for the hosted media transform service. The service accepts a
//! binary payload plus transform instructions and returns a stable public
//! reference; everything else about it is opaque to this crate.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MediaConfig;
use crate::database::models::MediaKind;

pub mod client;

pub use client::HttpMediaStore;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media store rejected request with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("invalid media store endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("could not encode transform instructions: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Transform instructions sent alongside the payload. Only the overlay text
/// is caller-controlled; styling comes from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    pub overlay_text: String,
    pub font: String,
    pub color: String,
    pub gravity: String,
}

impl TransformSpec {
    /// Build caption-overlay instructions from configured styling
    pub fn caption_overlay(caption: &str, media: &MediaConfig) -> Self {
        Self {
            overlay_text: caption.to_string(),
            font: media.overlay_font.clone(),
            color: media.overlay_color.clone(),
            gravity: media.overlay_gravity.clone(),
        }
    }
}

/// Successful upload result: the durable reference persisted with a post.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredMedia {
    pub media_id: String,
    pub url: String,
}

/// Upload contract of the media store. Implemented over HTTP in production
/// and by an in-memory double in tests.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(
        &self,
        payload: Bytes,
        kind: MediaKind,
        transform: &TransformSpec,
    ) -> Result<StoredMedia, MediaError>;
}
