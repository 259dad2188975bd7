pub mod api;
pub mod cache;
pub mod collection;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod http;

pub use api::{ApiError, BlogApi};
pub use cache::{EntityCache, Posts, QueryState, QueryStatus, Users};
pub use collection::{Entity, EntityCollection};
pub use http::HttpApi;
pub use reqwest::StatusCode;
