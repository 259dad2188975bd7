//! Client-side navigation targets and their path form.

use crate::model::{Id, ModelValidationError, post::PostMarker, user::UserMarker};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Route {
    Home,
    Post(Id<PostMarker>),
    EditPost(Id<PostMarker>),
    Users,
    User(Id<UserMarker>),
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum RouteParseError {
    #[error("Unknown route: {0}")]
    Unknown(String),
    #[error("Invalid id in route: {0}")]
    InvalidId(#[from] ModelValidationError),
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Post(id) => write!(f, "/post/{id}"),
            Route::EditPost(id) => write!(f, "/post/edit/{id}"),
            Route::Users => f.write_str("/user"),
            Route::User(id) => write!(f, "/user/{id}"),
        }
    }
}

impl FromStr for Route {
    type Err = RouteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s
            .trim_end_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["post", id] => Route::Post(id.parse()?),
            ["post", "edit", id] => Route::EditPost(id.parse()?),
            ["user"] => Route::Users,
            ["user", id] => Route::User(id.parse()?),
            _ => return Err(RouteParseError::Unknown(s.to_owned())),
        };

        Ok(route)
    }
}
