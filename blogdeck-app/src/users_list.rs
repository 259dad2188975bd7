use blogdeck_client::{QueryState, Users};
use blogdeck_common::route::Route;
use std::fmt::{Display, Formatter};

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum UsersView {
    Loading,
    Loaded(Vec<UserEntry>),
    Failed(String),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct UserEntry {
    pub name: String,
    pub link: Route,
}

impl UsersView {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, UsersView::Failed(_))
    }
}

/// Read-only list of the cached users, in the order the server returned them.
#[must_use]
pub fn users_list(query: &QueryState<Users>) -> UsersView {
    if query.is_loading() {
        return UsersView::Loading;
    }

    match (query.data(), query.error()) {
        (Some(users), None) => UsersView::Loaded(
            users
                .iter()
                .map(|user| UserEntry {
                    name: user.name.get().to_owned(),
                    link: Route::User(user.id),
                })
                .collect(),
        ),
        (_, Some(err)) => UsersView::Failed(err.to_string()),
        (None, None) => UsersView::Loading,
    }
}

impl Display for UsersView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UsersView::Loading => f.write_str("Loading ..."),
            UsersView::Failed(message) => f.write_str(message),
            UsersView::Loaded(entries) => {
                f.write_str("Users")?;
                for entry in entries {
                    write!(f, "\n- {} ({})", entry.name, entry.link)?;
                }
                Ok(())
            }
        }
    }
}
