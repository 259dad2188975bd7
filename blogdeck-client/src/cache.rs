use crate::{
    api::{ApiError, BlogApi, Result},
    collection::EntityCollection,
};
use blogdeck_common::model::{
    Id,
    post::{Post, PostMarker},
    user::User,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

pub type Posts = EntityCollection<Post>;
pub type Users = EntityCollection<User>;

#[derive(Clone, Debug, Default)]
pub enum QueryStatus {
    #[default]
    Uninitialized,
    Fetching,
    Success,
    Error(Arc<ApiError>),
}

/// Snapshot of one cached query.
///
/// `generation` counts successful fetches. It does not change when mutations patch `data`,
/// which lets consumers tell a fresh fetch result apart from a cache update.
#[derive(Clone, Debug)]
pub struct QueryState<T> {
    status: QueryStatus,
    data: Option<T>,
    generation: u64,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            status: QueryStatus::Uninitialized,
            data: None,
            generation: 0,
        }
    }
}

impl<T> QueryState<T> {
    #[must_use]
    pub fn status(&self) -> &QueryStatus {
        &self.status
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while the first fetch is outstanding and there is no data yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.status, QueryStatus::Fetching) && self.data.is_none()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        match self.status {
            QueryStatus::Success => true,
            QueryStatus::Fetching => self.data.is_some(),
            QueryStatus::Uninitialized | QueryStatus::Error(_) => false,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.status, QueryStatus::Error(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        match &self.status {
            QueryStatus::Error(err) => Some(err),
            _ => None,
        }
    }

    fn begin_fetch(&mut self) {
        self.status = QueryStatus::Fetching;
    }

    fn succeed(&mut self, data: T) {
        self.status = QueryStatus::Success;
        self.data = Some(data);
        self.generation += 1;
    }

    fn fail(&mut self, err: ApiError) {
        self.status = QueryStatus::Error(Arc::new(err));
    }
}

/// Client-side cache of server data, shared by every view.
///
/// Each query is published on a watch channel; mutations patch the cached data in place
/// once the server has confirmed them.
pub struct EntityCache<A> {
    api: A,
    posts: watch::Sender<QueryState<Posts>>,
    users: watch::Sender<QueryState<Users>>,
}

impl<A: BlogApi> EntityCache<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            posts: watch::Sender::new(QueryState::default()),
            users: watch::Sender::new(QueryState::default()),
        }
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub fn posts(&self) -> watch::Receiver<QueryState<Posts>> {
        self.posts.subscribe()
    }

    #[must_use]
    pub fn users(&self) -> watch::Receiver<QueryState<Users>> {
        self.users.subscribe()
    }

    #[must_use]
    pub fn post(&self, id: Id<PostMarker>) -> Option<Post> {
        self.posts.borrow().data()?.get(id).cloned()
    }

    #[must_use]
    pub fn all_users(&self) -> Vec<User> {
        self.users
            .borrow()
            .data()
            .map(|users| users.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn fetch_posts(&self) {
        self.posts.send_modify(QueryState::begin_fetch);

        match self.api.fetch_posts().await {
            Ok(posts) => {
                debug!(count = posts.len(), "Fetched posts");
                self.posts
                    .send_modify(|state| state.succeed(posts.into_iter().collect()));
            }
            Err(err) => {
                error!(error = %err, "Fetching posts failed");
                self.posts.send_modify(|state| state.fail(err));
            }
        }
    }

    pub async fn fetch_users(&self) {
        self.users.send_modify(QueryState::begin_fetch);

        match self.api.fetch_users().await {
            Ok(users) => {
                debug!(count = users.len(), "Fetched users");
                self.users
                    .send_modify(|state| state.succeed(users.into_iter().collect()));
            }
            Err(err) => {
                error!(error = %err, "Fetching users failed");
                self.users.send_modify(|state| state.fail(err));
            }
        }
    }

    pub async fn update_post(&self, post: &Post) -> Result<Post> {
        let updated = self.api.update_post(post).await?;

        self.posts.send_modify(|state| {
            if let Some(posts) = state.data.as_mut() {
                posts.upsert(updated.clone());
            }
        });
        debug!(post_id = %updated.id, "Cached updated post");

        Ok(updated)
    }

    pub async fn delete_post(&self, id: Id<PostMarker>) -> Result<()> {
        self.api.delete_post(id).await?;

        self.posts.send_modify(|state| {
            if let Some(posts) = state.data.as_mut() {
                posts.remove(id);
            }
        });
        debug!(post_id = %id, "Removed deleted post from cache");

        Ok(())
    }
}
