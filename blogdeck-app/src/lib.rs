pub mod edit_post;
pub mod navigation;
pub mod users_list;
