use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Supported media kinds for a post. Stored as text in the posts table and
/// rendered as `image` / `short-video` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Image,
    ShortVideo,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::ShortVideo => "short-video",
        }
    }

    /// Resolve a kind from the uploaded part's content type, e.g. `image/png`
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or("").trim();
        match essence.split('/').next() {
            Some("image") => Some(MediaKind::Image),
            Some("video") => Some(MediaKind::ShortVideo),
            _ => None,
        }
    }

    /// Fallback resolution from a filename extension
    pub fn from_extension(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" => Some(MediaKind::Image),
            "mp4" | "mov" | "webm" => Some(MediaKind::ShortVideo),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaKind::Image),
            "short-video" => Ok(MediaKind::ShortVideo),
            other => Err(format!("unknown media kind '{}'", other)),
        }
    }
}

// The media_kind column is plain TEXT, so the enum maps to the builtin text
// type rather than declaring a Postgres enum type.
impl sqlx::Type<sqlx::Postgres> for MediaKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for MediaKind {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> sqlx::encode::IsNull {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for MediaKind {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

/// A stored post. `owner_id` is set once at creation and never changes;
/// caption and media are immutable after creation as well.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub media_id: String,
    pub media_ref: String,
    pub media_kind: MediaKind,
    pub caption: String,
    pub created_at: DateTime<Utc>,
}

/// Input for a post insert; id and created_at are generated at insert time.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner_id: Uuid,
    pub media_id: String,
    pub media_ref: String,
    pub media_kind: MediaKind,
    pub caption: String,
}
