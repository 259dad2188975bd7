//! Reqwest-backed implementation of [`BlogApi`].

use crate::api::{ApiError, BlogApi, Result};
use blogdeck_common::model::{
    Id,
    post::{Post, PostMarker},
    user::User,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Builds a client for the API rooted at `base_url`, with a per-request timeout.
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self> {
        // Url::join would otherwise replace the last path segment of the base.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn post_endpoint(&self, id: Id<PostMarker>) -> Result<Url> {
        self.endpoint(&format!("posts/{id}"))
    }
}

fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = checked(response)?.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

impl BlogApi for HttpApi {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let url = self.endpoint("posts")?;
        debug!(%url, "Fetching posts");

        decode(self.client.get(url).send().await?).await
    }

    async fn fetch_users(&self) -> Result<Vec<User>> {
        let url = self.endpoint("users")?;
        debug!(%url, "Fetching users");

        decode(self.client.get(url).send().await?).await
    }

    async fn update_post(&self, post: &Post) -> Result<Post> {
        let url = self.post_endpoint(post.id)?;
        debug!(%url, post_id = %post.id, "Updating post");

        decode(self.client.put(url).json(post).send().await?).await
    }

    async fn delete_post(&self, id: Id<PostMarker>) -> Result<()> {
        let url = self.post_endpoint(id)?;
        debug!(%url, post_id = %id, "Deleting post");

        checked(self.client.delete(url).send().await?)?;
        Ok(())
    }
}
