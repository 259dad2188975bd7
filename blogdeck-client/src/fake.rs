//! In-memory [`BlogApi`] for tests.

use crate::api::{ApiError, BlogApi, Result};
use blogdeck_common::model::{
    Id,
    post::{Post, PostMarker, Reactions},
    user::{User, UserName},
};
use reqwest::StatusCode;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[must_use]
pub fn post(id: u64, title: &str, user_id: u64) -> Post {
    Post {
        id: Id::new(id),
        title: title.to_owned(),
        body: format!("{title} body"),
        user_id: Id::new(user_id),
        reactions: Reactions::default(),
    }
}

/// # Panics
///
/// If `name` is not a valid user name.
#[must_use]
pub fn user(id: u64, name: &str) -> User {
    User {
        id: Id::new(id),
        name: UserName::new(name.to_owned()).expect("valid test user name"),
    }
}

#[derive(Debug, Default)]
struct FakeState {
    posts: Vec<Post>,
    users: Vec<User>,
    fetch_failure: Option<StatusCode>,
    mutation_failure: Option<StatusCode>,
    updates: Vec<Post>,
    deletes: Vec<Id<PostMarker>>,
}

/// Behaves like a well-mannered JSON server and records every mutation it receives.
#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
    gate: Option<Arc<Notify>>,
}

impl FakeApi {
    #[must_use]
    pub fn new(posts: Vec<Post>, users: Vec<User>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                posts,
                users,
                ..FakeState::default()
            }),
            gate: None,
        }
    }

    /// Mutations wait for a notification on `gate` before answering.
    #[must_use]
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn fail_fetches_with(&self, status: Option<StatusCode>) {
        self.lock().fetch_failure = status;
    }

    pub fn fail_mutations_with(&self, status: Option<StatusCode>) {
        self.lock().mutation_failure = status;
    }

    #[must_use]
    pub fn updates(&self) -> Vec<Post> {
        self.lock().updates.clone()
    }

    #[must_use]
    pub fn deletes(&self) -> Vec<Id<PostMarker>> {
        self.lock().deletes.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

impl BlogApi for FakeApi {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let state = self.lock();
        match state.fetch_failure {
            Some(status) => Err(ApiError::Status(status)),
            None => Ok(state.posts.clone()),
        }
    }

    async fn fetch_users(&self) -> Result<Vec<User>> {
        let state = self.lock();
        match state.fetch_failure {
            Some(status) => Err(ApiError::Status(status)),
            None => Ok(state.users.clone()),
        }
    }

    async fn update_post(&self, post: &Post) -> Result<Post> {
        self.wait_for_gate().await;

        let mut state = self.lock();
        state.updates.push(post.clone());
        if let Some(status) = state.mutation_failure {
            return Err(ApiError::Status(status));
        }

        match state.posts.iter_mut().find(|known| known.id == post.id) {
            Some(known) => {
                *known = post.clone();
                Ok(post.clone())
            }
            None => Err(ApiError::Status(StatusCode::NOT_FOUND)),
        }
    }

    async fn delete_post(&self, id: Id<PostMarker>) -> Result<()> {
        self.wait_for_gate().await;

        let mut state = self.lock();
        state.deletes.push(id);
        if let Some(status) = state.mutation_failure {
            return Err(ApiError::Status(status));
        }

        let before = state.posts.len();
        state.posts.retain(|known| known.id != id);
        if state.posts.len() == before {
            Err(ApiError::Status(StatusCode::NOT_FOUND))
        } else {
            Ok(())
        }
    }
}
