use crate::{
    edit_post::{
        Draft, EditPostForm, EditPostView, FieldChange, FormState, SubmitError, SubmitOutcome,
    },
    navigation::History,
};
use blogdeck_client::{
    EntityCache, StatusCode,
    fake::{FakeApi, post, user},
};
use blogdeck_common::{
    model::{
        Id,
        post::{Post, Reactions},
    },
    route::Route,
};
use std::sync::Arc;
use tokio::sync::Notify;

type Form = EditPostForm<FakeApi, Arc<History>>;

fn setup(api: FakeApi, post_id: u64) -> (Arc<EntityCache<FakeApi>>, Arc<History>, Form) {
    let cache = Arc::new(EntityCache::new(api));
    let history = Arc::new(History::default());
    let form = EditPostForm::new(Id::new(post_id), Arc::clone(&cache), Arc::clone(&history));
    (cache, history, form)
}

async fn loaded(api: FakeApi, post_id: u64) -> (Arc<EntityCache<FakeApi>>, Arc<History>, Form) {
    let (cache, history, mut form) = setup(api, post_id);
    cache.fetch_posts().await;
    cache.fetch_users().await;
    form.refresh();
    (cache, history, form)
}

fn blog() -> FakeApi {
    FakeApi::new(
        vec![post(1, "first", 1), post(2, "second", 2)],
        vec![user(1, "Leanne Graham"), user(2, "Ervin Howell")],
    )
}

#[tokio::test]
async fn draft_mirrors_post_once_fetched() {
    let (cache, _, mut form) = setup(blog(), 2);
    assert_eq!(form.state(), &FormState::Loading);
    assert_eq!(form.render(), EditPostView::Loading);
    assert_eq!(form.render().to_string(), "Loading...");

    cache.fetch_posts().await;
    form.refresh();

    assert_eq!(
        form.state(),
        &FormState::Ready {
            source: post(2, "second", 2)
        }
    );
    assert_eq!(
        form.draft(),
        &Draft {
            title: "second".to_owned(),
            content: "second body".to_owned(),
            user_id: Some(Id::new(2)),
        }
    );
}

#[tokio::test]
async fn edits_survive_everything_but_a_new_fetch() {
    let (cache, _, mut form) = loaded(blog(), 1).await;
    form.on_field_changed(FieldChange::Title("half-typed".to_owned()));

    form.refresh();
    assert_eq!(form.draft().title, "half-typed");

    let mut reacted = post(1, "first", 1);
    reacted.reactions.coffee = 3;
    cache.update_post(&reacted).await.unwrap();
    form.refresh();
    assert_eq!(form.draft().title, "half-typed");
    assert_eq!(
        form.state(),
        &FormState::Ready {
            source: reacted.clone()
        }
    );

    cache.fetch_posts().await;
    form.refresh();
    assert_eq!(form.draft().title, "first");
}

#[tokio::test]
async fn cannot_submit_incomplete_draft() {
    let (_, _, form) = setup(blog(), 1);
    assert!(!form.can_submit());

    let incomplete = [
        FieldChange::Title(String::new()),
        FieldChange::Content(String::new()),
        FieldChange::Author(String::new()),
        FieldChange::Author("0".to_owned()),
        FieldChange::Author("nobody".to_owned()),
    ];

    for change in incomplete {
        let (_, _, mut form) = loaded(blog(), 1).await;
        assert!(form.can_submit());

        form.on_field_changed(change.clone());
        assert!(!form.can_submit(), "{change:?} should block saving");
        assert!(matches!(
            form.submit_update().await,
            SubmitOutcome::Rejected(SubmitError::Incomplete)
        ));
    }
}

#[tokio::test]
async fn author_is_coerced_to_an_id() {
    let (_, _, mut form) = loaded(blog(), 1).await;

    form.on_field_changed(FieldChange::Author(" 2 ".to_owned()));
    assert_eq!(form.draft().user_id, Some(Id::new(2)));

    form.on_field_changed(FieldChange::Author("0".to_owned()));
    assert_eq!(form.draft().user_id, None);
}

#[tokio::test]
async fn cannot_submit_while_update_in_flight() {
    let (_, _, mut form) = loaded(blog(), 1).await;

    let ticket = form.begin_update().unwrap();
    assert!(form.update_in_flight());
    assert!(!form.can_submit());
    assert_eq!(form.begin_update(), Err(SubmitError::InFlight));

    let outcome = form.complete_update(
        ticket,
        Err(blogdeck_client::ApiError::Status(StatusCode::BAD_GATEWAY)),
    );
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert!(form.can_submit());
}

#[tokio::test]
async fn update_sends_edited_fields_with_original_id_and_reactions() {
    let mut original = post(5, "old", 1);
    original.reactions = Reactions {
        thumbs_up: 0,
        ..Reactions::default()
    };
    let api = FakeApi::new(vec![original], vec![user(3, "Clementine Bauch")]);
    let (cache, history, mut form) = loaded(api, 5).await;

    form.on_field_changed(FieldChange::Title("Hello".to_owned()));
    form.on_field_changed(FieldChange::Content("World".to_owned()));
    form.on_field_changed(FieldChange::Author("3".to_owned()));

    let outcome = form.submit_update().await;
    assert!(matches!(outcome, SubmitOutcome::Navigated(Route::Post(id)) if id == Id::new(5)));

    let expected = Post {
        id: Id::new(5),
        title: "Hello".to_owned(),
        body: "World".to_owned(),
        user_id: Id::new(3),
        reactions: Reactions::default(),
    };
    assert_eq!(cache.api().updates(), vec![expected.clone()]);
    assert_eq!(cache.post(Id::new(5)), Some(expected));

    assert_eq!(history.entries(), vec![Route::Post(Id::new(5))]);
    assert_eq!(form.draft(), &Draft::default());
    assert_eq!(form.state(), &FormState::Submitted);
    assert_eq!(form.render(), EditPostView::Submitted);
}

#[tokio::test]
async fn update_keeps_the_posts_reactions() {
    let mut original = post(4, "liked", 1);
    original.reactions = Reactions {
        heart: 7,
        rocket: 2,
        ..Reactions::default()
    };
    let api = FakeApi::new(vec![original.clone()], vec![user(1, "Leanne Graham")]);
    let (cache, _, mut form) = loaded(api, 4).await;

    form.on_field_changed(FieldChange::Title("still liked".to_owned()));
    assert!(matches!(form.submit_update().await, SubmitOutcome::Navigated(_)));

    let updates = cache.api().updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].reactions, original.reactions);
    assert_eq!(updates[0].title, "still liked");
}

#[tokio::test]
async fn update_carries_reactions_patched_into_the_cache() {
    let (cache, _, mut form) = loaded(blog(), 1).await;
    form.on_field_changed(FieldChange::Content("edited body".to_owned()));

    let mut reacted = post(1, "first", 1);
    reacted.reactions = Reactions {
        thumbs_up: 5,
        wow: 1,
        ..Reactions::default()
    };
    cache.update_post(&reacted).await.unwrap();
    form.refresh();

    assert!(matches!(form.submit_update().await, SubmitOutcome::Navigated(_)));

    let updates = cache.api().updates();
    let saved = updates.last().unwrap();
    assert_eq!(saved.reactions, reacted.reactions);
    assert_eq!(saved.body, "edited body");
}

#[tokio::test]
async fn update_navigates_to_the_edited_post() {
    let (_, history, mut form) = loaded(blog(), 1).await;

    let ticket = form.begin_update().unwrap();
    let outcome = form.complete_update(ticket, Ok(post(9, "echoed elsewhere", 1)));

    assert!(matches!(outcome, SubmitOutcome::Navigated(Route::Post(id)) if id == Id::new(1)));
    assert_eq!(history.entries(), vec![Route::Post(Id::new(1))]);
}

#[tokio::test]
async fn delete_navigates_home() {
    let (cache, history, mut form) = loaded(blog(), 2).await;
    form.on_field_changed(FieldChange::Title(String::new()));

    let outcome = form.submit_delete().await;

    assert!(matches!(outcome, SubmitOutcome::Navigated(Route::Home)));
    assert_eq!(cache.api().deletes(), vec![Id::new(2)]);
    assert_eq!(cache.post(Id::new(2)), None);
    assert_eq!(history.entries(), vec![Route::Home]);
    assert_eq!(form.draft(), &Draft::default());
    assert_eq!(form.state(), &FormState::Submitted);
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let (cache, history, mut form) = loaded(blog(), 99).await;

    assert_eq!(form.state(), &FormState::NotFound);
    assert_eq!(form.render().to_string(), "Post not found!");
    assert!(form.render().is_failure());

    form.on_field_changed(FieldChange::Title("ignored".to_owned()));
    assert_eq!(form.draft(), &Draft::default());
    assert!(matches!(
        form.submit_update().await,
        SubmitOutcome::Rejected(SubmitError::NotReady)
    ));
    assert!(matches!(
        form.submit_delete().await,
        SubmitOutcome::Rejected(SubmitError::NotReady)
    ));

    assert!(cache.api().updates().is_empty());
    assert!(cache.api().deletes().is_empty());
    assert!(history.entries().is_empty());
}

#[tokio::test]
async fn fetch_failure_is_shown() {
    let api = blog();
    api.fail_fetches_with(Some(StatusCode::INTERNAL_SERVER_ERROR));
    let (cache, _, mut form) = loaded(api, 1).await;

    assert!(matches!(form.state(), FormState::LoadFailed(message) if message.contains("500")));
    assert!(form.render().to_string().starts_with("Failed to load the post"));
    assert!(form.render().is_failure());

    cache.api().fail_fetches_with(None);
    cache.fetch_posts().await;
    form.refresh();
    assert!(matches!(form.state(), FormState::Ready { .. }));
}

#[tokio::test]
async fn failed_update_keeps_draft_and_shows_banner() {
    let (cache, history, mut form) = loaded(blog(), 1).await;
    form.on_field_changed(FieldChange::Content("new body".to_owned()));
    cache
        .api()
        .fail_mutations_with(Some(StatusCode::INTERNAL_SERVER_ERROR));

    let outcome = form.submit_update().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(form.draft().content, "new body");
    assert!(form.banner().unwrap().starts_with("Failed to save the post"));
    assert!(form.can_submit());
    assert!(history.entries().is_empty());
    let EditPostView::Form(view) = form.render() else {
        panic!("expected the form to stay visible");
    };
    assert_eq!(view.banner.as_deref(), form.banner());

    cache.api().fail_mutations_with(None);
    let outcome = form.submit_update().await;
    assert!(matches!(outcome, SubmitOutcome::Navigated(_)));
    assert_eq!(form.banner(), None);
    assert_eq!(cache.api().updates().len(), 2);
}

#[tokio::test]
async fn failed_delete_stays_on_form() {
    let (cache, history, mut form) = loaded(blog(), 1).await;
    cache.api().fail_mutations_with(Some(StatusCode::NOT_FOUND));

    let outcome = form.submit_delete().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert!(form.banner().unwrap().starts_with("Failed to delete the post"));
    assert!(matches!(form.state(), FormState::Ready { .. }));
    assert_eq!(form.draft().title, "first");
    assert!(history.entries().is_empty());
}

#[tokio::test]
async fn discarded_form_ignores_late_results() {
    let gate = Arc::new(Notify::new());
    let (cache, history, mut form) = loaded(blog().gated(Arc::clone(&gate)), 1).await;
    form.on_field_changed(FieldChange::Title("late".to_owned()));
    let token = form.cancellation_token();

    let (outcome, ()) = tokio::join!(form.submit_update(), async {
        token.cancel();
        gate.notify_one();
    });

    assert!(matches!(outcome, SubmitOutcome::Discarded));
    assert!(history.entries().is_empty());
    assert_eq!(form.draft().title, "late");
    assert!(matches!(form.state(), FormState::Ready { .. }));
    // The request itself still went through.
    assert_eq!(cache.post(Id::new(1)).unwrap().title, "late");
}

#[tokio::test]
async fn dropping_the_form_cancels_it() {
    let (_, _, form) = loaded(blog(), 1).await;
    let token = form.cancellation_token();
    assert!(!token.is_cancelled());

    form.discard();
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn waits_for_posts() {
    let (cache, _, mut form) = setup(blog(), 2);

    let (changed, ()) = tokio::join!(form.posts_changed(), cache.fetch_posts());
    assert!(changed);
    assert!(matches!(form.state(), FormState::Ready { .. }));

    form.cancellation_token().cancel();
    assert!(!form.posts_changed().await);
}

#[tokio::test]
async fn form_view_lists_authors() {
    let (_, _, form) = loaded(blog(), 2).await;

    let EditPostView::Form(view) = form.render() else {
        panic!("expected a form");
    };
    assert_eq!(view.title, "second");
    assert!(view.can_save);
    assert_eq!(view.authors.len(), 3);
    assert_eq!(view.authors[0].id, None);
    assert!(!view.authors[0].selected);
    assert_eq!(view.selected_author().unwrap().name, "Ervin Howell");

    assert!(!form.render().is_failure());
    let rendered = view.to_string();
    assert!(rendered.starts_with("Edit Post\nPost Title: second\n"));
    assert!(rendered.contains("  [x] Ervin Howell (2)"));
    assert!(rendered.ends_with("[Save Post] [Delete Post]"));
}

#[test]
fn only_edit_routes_open_the_form() {
    let cache = Arc::new(EntityCache::new(blog()));
    let history = Arc::new(History::default());

    assert!(
        EditPostForm::for_route(Route::Home, Arc::clone(&cache), Arc::clone(&history)).is_none()
    );

    let form = EditPostForm::for_route("/post/edit/2".parse().unwrap(), cache, history).unwrap();
    assert_eq!(form.post_id(), Id::new(2));
}
