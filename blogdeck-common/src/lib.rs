pub mod model;
pub mod route;
