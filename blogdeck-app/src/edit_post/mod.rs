//! Controller behind the "Edit Post" form.
//!
//! The form mirrors one cached post into a local [`Draft`], lets the user edit it, and
//! submits an update or delete through the [`EntityCache`]. It moves through [`FormState`]:
//!
//! ```text
//! Loading ──fetch ok, post present──▶ Ready ──update/delete ok──▶ Submitted
//!    │  └──fetch ok, post absent───▶ NotFound
//!    └────fetch failed─────────────▶ LoadFailed
//! ```
//!
//! The draft is copied from the post once per successful fetch, so a cache update that
//! arrives while the user is typing never overwrites their edits.

mod view;

pub use view::{AuthorOption, EditPostView, FormView};

use crate::navigation::Navigator;
use blogdeck_client::{ApiError, BlogApi, EntityCache, Posts, QueryState};
use blogdeck_common::{
    model::{
        Id,
        post::{Post, PostMarker},
        user::{User, UserMarker},
    },
    route::Route,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub user_id: Option<Id<UserMarker>>,
}

impl Draft {
    fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.body.clone(),
            user_id: Some(post.user_id),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.content.is_empty() && self.user_id.is_some()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum FieldChange {
    Title(String),
    Content(String),
    /// Raw value of the author selection. Empty, zero or non-numeric means no author.
    Author(String),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum FormState {
    Loading,
    /// `source` is the latest cached version of the post.
    Ready { source: Post },
    NotFound,
    LoadFailed(String),
    Submitted,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum SubmitError {
    #[error("The post is not loaded")]
    NotReady,
    #[error("Title, content and author are all required")]
    Incomplete,
    #[error("An update of this post is already in flight")]
    InFlight,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Navigated(Route),
    Rejected(SubmitError),
    Failed(ApiError),
    /// The form was discarded while the request was in flight.
    Discarded,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UpdateTicket {
    payload: Post,
}

impl UpdateTicket {
    #[must_use]
    pub fn payload(&self) -> &Post {
        &self.payload
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DeleteTicket {
    id: Id<PostMarker>,
}

impl DeleteTicket {
    #[must_use]
    pub fn id(&self) -> Id<PostMarker> {
        self.id
    }
}

/// One activation of the edit form for a single post.
///
/// Dropping the form cancels its [`CancellationToken`]; requests completing afterwards are
/// not applied.
pub struct EditPostForm<A, N> {
    post_id: Id<PostMarker>,
    cache: Arc<EntityCache<A>>,
    posts: watch::Receiver<QueryState<Posts>>,
    navigator: N,
    state: FormState,
    draft: Draft,
    synced_generation: u64,
    update_in_flight: bool,
    banner: Option<String>,
    cancellation: CancellationToken,
}

impl<A: BlogApi, N: Navigator> EditPostForm<A, N> {
    pub fn new(post_id: Id<PostMarker>, cache: Arc<EntityCache<A>>, navigator: N) -> Self {
        let posts = cache.posts();
        let mut form = Self {
            post_id,
            cache,
            posts,
            navigator,
            state: FormState::Loading,
            draft: Draft::default(),
            synced_generation: 0,
            update_in_flight: false,
            banner: None,
            cancellation: CancellationToken::new(),
        };
        form.refresh();
        form
    }

    /// Builds the form for the post named by an edit route, or `None` for any other route.
    pub fn for_route(route: Route, cache: Arc<EntityCache<A>>, navigator: N) -> Option<Self> {
        match route {
            Route::EditPost(post_id) => Some(Self::new(post_id, cache, navigator)),
            _ => None,
        }
    }

    #[must_use]
    pub fn post_id(&self) -> Id<PostMarker> {
        self.post_id
    }

    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Message describing the last failed submission, cleared when the next one starts.
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    #[must_use]
    pub fn update_in_flight(&self) -> bool {
        self.update_in_flight
    }

    /// Token cancelled when this activation ends. Cancelling it from elsewhere discards the
    /// form's pending continuations.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn discard(self) {
        debug!(post_id = %self.post_id, "Discarding edit form");
    }

    /// Applies the latest posts query state from the cache.
    pub fn refresh(&mut self) {
        let query = self.posts.borrow_and_update().clone();
        self.apply_posts(&query);
    }

    /// Waits for the posts query to change and applies it.
    ///
    /// Returns `false` once the form is discarded or the cache is gone.
    pub async fn posts_changed(&mut self) -> bool {
        let changed = tokio::select! {
            biased;
            () = self.cancellation.cancelled() => false,
            changed = self.posts.changed() => changed.is_ok(),
        };

        if changed {
            self.refresh();
        }
        changed
    }

    pub fn apply_posts(&mut self, query: &QueryState<Posts>) {
        let post = query.data().and_then(|posts| posts.get(self.post_id));
        let fresh_fetch = query.is_success() && query.generation() != self.synced_generation;

        match &mut self.state {
            FormState::NotFound | FormState::Submitted => {}
            FormState::Ready { source } => match post {
                Some(post) => {
                    if fresh_fetch {
                        debug!(
                            post_id = %self.post_id,
                            generation = query.generation(),
                            "Re-synchronizing draft"
                        );
                        self.draft = Draft::from_post(post);
                        self.synced_generation = query.generation();
                    }
                    *source = post.clone();
                }
                None if fresh_fetch => {
                    debug!(post_id = %self.post_id, "Post disappeared after refetch");
                    self.synced_generation = query.generation();
                    self.draft = Draft::default();
                    self.state = FormState::NotFound;
                }
                None => {}
            },
            FormState::Loading | FormState::LoadFailed(_) => {
                if query.is_success() {
                    self.synced_generation = query.generation();
                    self.state = match post {
                        Some(post) => {
                            self.draft = Draft::from_post(post);
                            FormState::Ready {
                                source: post.clone(),
                            }
                        }
                        None => {
                            debug!(post_id = %self.post_id, "Post not found");
                            FormState::NotFound
                        }
                    };
                } else if let Some(err) = query.error() {
                    self.state = FormState::LoadFailed(err.to_string());
                } else if query.is_loading() {
                    self.state = FormState::Loading;
                }
            }
        }
    }

    pub fn on_field_changed(&mut self, change: FieldChange) {
        if !matches!(self.state, FormState::Ready { .. }) {
            return;
        }

        match change {
            FieldChange::Title(title) => self.draft.title = title,
            FieldChange::Content(content) => self.draft.content = content,
            FieldChange::Author(raw) => self.draft.user_id = parse_author(&raw),
        }
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        matches!(self.state, FormState::Ready { .. })
            && self.draft.is_complete()
            && !self.update_in_flight
    }

    /// Starts an update, producing the request to send.
    ///
    /// The payload carries the edited fields plus the cached post's id and reactions.
    pub fn begin_update(&mut self) -> Result<UpdateTicket, SubmitError> {
        let FormState::Ready { source } = &self.state else {
            return Err(SubmitError::NotReady);
        };
        if self.update_in_flight {
            return Err(SubmitError::InFlight);
        }
        let Some(user_id) = self.draft.user_id.filter(|_| self.draft.is_complete()) else {
            return Err(SubmitError::Incomplete);
        };

        let payload = Post {
            id: source.id,
            title: self.draft.title.clone(),
            body: self.draft.content.clone(),
            user_id,
            reactions: source.reactions,
        };

        self.update_in_flight = true;
        self.banner = None;
        Ok(UpdateTicket { payload })
    }

    pub fn complete_update(
        &mut self,
        ticket: UpdateTicket,
        result: Result<Post, ApiError>,
    ) -> SubmitOutcome {
        if self.cancellation.is_cancelled() {
            debug!(post_id = %ticket.payload.id, "Ignoring update result for discarded form");
            return SubmitOutcome::Discarded;
        }
        self.update_in_flight = false;

        match result {
            Ok(_) => {
                self.draft = Draft::default();
                self.state = FormState::Submitted;

                let route = Route::Post(self.post_id);
                self.navigator.navigate_to(route);
                SubmitOutcome::Navigated(route)
            }
            Err(err) => {
                error!(error = %err, post_id = %ticket.payload.id, "Failed to save the post");
                self.banner = Some(format!("Failed to save the post: {err}"));
                SubmitOutcome::Failed(err)
            }
        }
    }

    pub fn begin_delete(&mut self) -> Result<DeleteTicket, SubmitError> {
        let FormState::Ready { source } = &self.state else {
            return Err(SubmitError::NotReady);
        };
        let id = source.id;

        self.banner = None;
        Ok(DeleteTicket { id })
    }

    pub fn complete_delete(
        &mut self,
        ticket: DeleteTicket,
        result: Result<(), ApiError>,
    ) -> SubmitOutcome {
        if self.cancellation.is_cancelled() {
            debug!(post_id = %ticket.id, "Ignoring delete result for discarded form");
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(()) => {
                self.draft = Draft::default();
                self.state = FormState::Submitted;

                self.navigator.navigate_to(Route::Home);
                SubmitOutcome::Navigated(Route::Home)
            }
            Err(err) => {
                error!(error = %err, post_id = %ticket.id, "Failed to delete the post");
                self.banner = Some(format!("Failed to delete the post: {err}"));
                SubmitOutcome::Failed(err)
            }
        }
    }

    pub async fn submit_update(&mut self) -> SubmitOutcome {
        let ticket = match self.begin_update() {
            Ok(ticket) => ticket,
            Err(err) => {
                debug!(error = %err, post_id = %self.post_id, "Save rejected");
                return SubmitOutcome::Rejected(err);
            }
        };

        let result = self.cache.update_post(ticket.payload()).await;
        self.complete_update(ticket, result)
    }

    pub async fn submit_delete(&mut self) -> SubmitOutcome {
        let ticket = match self.begin_delete() {
            Ok(ticket) => ticket,
            Err(err) => {
                debug!(error = %err, post_id = %self.post_id, "Delete rejected");
                return SubmitOutcome::Rejected(err);
            }
        };

        let result = self.cache.delete_post(ticket.id()).await;
        self.complete_delete(ticket, result)
    }

    #[must_use]
    pub fn view(&self, users: &[User]) -> EditPostView {
        match &self.state {
            FormState::Loading => EditPostView::Loading,
            FormState::NotFound => EditPostView::NotFound,
            FormState::LoadFailed(message) => EditPostView::LoadFailed(message.clone()),
            FormState::Submitted => EditPostView::Submitted,
            FormState::Ready { .. } => EditPostView::Form(FormView::new(
                &self.draft,
                users,
                self.can_submit(),
                self.banner.clone(),
            )),
        }
    }

    /// Renders the form against the users currently in the cache.
    #[must_use]
    pub fn render(&self) -> EditPostView {
        self.view(&self.cache.all_users())
    }
}

impl<A, N> Drop for EditPostForm<A, N> {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

fn parse_author(raw: &str) -> Option<Id<UserMarker>> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(Id::new)
}

#[cfg(test)]
mod tests;
