use blogdeck_common::model::{
    Id,
    post::{Post, PostMarker},
    user::User,
};
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Server replied with status {0}")]
    Status(StatusCode),
    #[error("Response body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Request url could not be built: {0}")]
    Url(#[from] url::ParseError),
}

/// Data access for the blog backend.
///
/// The entity cache and everything above it only talk to the server through this trait,
/// so tests can substitute an in-memory fake.
pub trait BlogApi: Send + Sync {
    fn fetch_posts(&self) -> impl Future<Output = Result<Vec<Post>>> + Send;

    fn fetch_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send;

    /// Replaces the post with the given one, resolving with the server-confirmed version.
    fn update_post(&self, post: &Post) -> impl Future<Output = Result<Post>> + Send;

    fn delete_post(&self, id: Id<PostMarker>) -> impl Future<Output = Result<()>> + Send;
}
