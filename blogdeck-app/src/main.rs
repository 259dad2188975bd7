use blogdeck_app::{
    edit_post::{EditPostForm, FieldChange, SubmitOutcome},
    navigation::History,
    users_list::users_list,
};
use blogdeck_client::{ApiError, EntityCache, HttpApi};
use blogdeck_common::{
    model::{Id, post::PostMarker},
    route::Route,
};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::{process::ExitCode, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error building the api client: {0}")]
    Client(#[from] ApiError),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    api_url: Url,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Parser)]
#[command(about = "Browse users and edit posts of a blog API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all users.
    Users,
    /// Show the edit form of a post.
    ShowPostForm {
        /// Post id, or an edit path like `/post/edit/5`.
        #[arg(value_parser = parse_post_id)]
        post: Id<PostMarker>,
    },
    /// Edit a post and save it.
    EditPost {
        /// Post id, or an edit path like `/post/edit/5`.
        #[arg(value_parser = parse_post_id)]
        post: Id<PostMarker>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Id of the new author.
        #[arg(long)]
        author: Option<String>,
    },
    /// Delete a post.
    DeletePost {
        /// Post id, or an edit path like `/post/edit/5`.
        #[arg(value_parser = parse_post_id)]
        post: Id<PostMarker>,
    },
}

fn parse_post_id(value: &str) -> Result<Id<PostMarker>, String> {
    if value.starts_with('/') {
        match value.parse::<Route>().map_err(|err| err.to_string())? {
            Route::EditPost(id) | Route::Post(id) => Ok(id),
            route => Err(format!("{route} does not name a post")),
        }
    } else {
        value
            .parse::<Id<PostMarker>>()
            .map_err(|err| err.to_string())
    }
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "blogdeck_app=debug,\
                blogdeck_client=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::prefixed("BLOGDECK_")
        .from_env()
        .map_err(InitError::from)
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
enum Submission {
    Update,
    Delete,
}

async fn edit_post(
    cache: Arc<EntityCache<HttpApi>>,
    post: Id<PostMarker>,
    changes: Vec<FieldChange>,
    submission: Submission,
) -> ExitCode {
    let history = History::starting_at(Route::EditPost(post));
    let mut form = EditPostForm::new(post, Arc::clone(&cache), history);

    tokio::join!(cache.fetch_posts(), cache.fetch_users());
    form.refresh();

    for change in changes {
        form.on_field_changed(change);
    }

    let outcome = match submission {
        Submission::Update => form.submit_update().await,
        Submission::Delete => form.submit_delete().await,
    };

    match outcome {
        SubmitOutcome::Navigated(route) => {
            println!("Done, now at {route}");
            ExitCode::SUCCESS
        }
        SubmitOutcome::Rejected(err) => {
            println!("{}\n{err}", form.render());
            ExitCode::FAILURE
        }
        SubmitOutcome::Failed(_) | SubmitOutcome::Discarded => {
            println!("{}", form.render());
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, InitError> {
    install_tracing();
    let cli = Cli::parse();
    let env = get_env()?;

    let api = HttpApi::new(env.api_url, Duration::from_secs(env.request_timeout_secs))?;
    let cache = Arc::new(EntityCache::new(api));

    let exit_code = match cli.command {
        Command::Users => {
            cache.fetch_users().await;
            let view = users_list(&cache.users().borrow());
            println!("{view}");
            if view.is_failure() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Command::ShowPostForm { post } => {
            let mut form = EditPostForm::new(post, Arc::clone(&cache), History::default());
            tokio::join!(cache.fetch_posts(), cache.fetch_users());
            form.refresh();
            let view = form.render();
            println!("{view}");
            if view.is_failure() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Command::EditPost {
            post,
            title,
            content,
            author,
        } => {
            let changes = [
                title.map(FieldChange::Title),
                content.map(FieldChange::Content),
                author.map(FieldChange::Author),
            ]
            .into_iter()
            .flatten()
            .collect();
            edit_post(cache, post, changes, Submission::Update).await
        }
        Command::DeletePost { post } => {
            edit_post(cache, post, Vec::new(), Submission::Delete).await
        }
    };

    Ok(exit_code)
}
