pub mod post;
pub mod user;

pub use post::{MediaKind, NewPost, Post};
pub use user::User;
