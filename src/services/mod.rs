pub mod post_service;
pub mod upload;

pub use post_service::{PgPostStore, PostError, PostService, PostStore};
pub use upload::{UploadError, UploadPipeline};
