use crate::edit_post::Draft;
use blogdeck_common::model::{
    Id,
    user::{User, UserMarker},
};
use std::fmt::{Display, Formatter};

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum EditPostView {
    Loading,
    NotFound,
    LoadFailed(String),
    Form(FormView),
    Submitted,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct FormView {
    pub title: String,
    pub content: String,
    /// Blank entry first, then one per user.
    pub authors: Vec<AuthorOption>,
    pub can_save: bool,
    pub banner: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthorOption {
    pub id: Option<Id<UserMarker>>,
    pub name: String,
    pub selected: bool,
}

impl EditPostView {
    /// True when the post could not be shown at all.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, EditPostView::NotFound | EditPostView::LoadFailed(_))
    }
}

impl FormView {
    pub(super) fn new(
        draft: &Draft,
        users: &[User],
        can_save: bool,
        banner: Option<String>,
    ) -> Self {
        let blank = AuthorOption {
            id: None,
            name: String::new(),
            selected: draft.user_id.is_none(),
        };
        let authors = std::iter::once(blank)
            .chain(users.iter().map(|user| AuthorOption {
                id: Some(user.id),
                name: user.name.get().to_owned(),
                selected: draft.user_id == Some(user.id),
            }))
            .collect();

        Self {
            title: draft.title.clone(),
            content: draft.content.clone(),
            authors,
            can_save,
            banner,
        }
    }

    #[must_use]
    pub fn selected_author(&self) -> Option<&AuthorOption> {
        self.authors
            .iter()
            .find(|author| author.selected && author.id.is_some())
    }
}

impl Display for EditPostView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EditPostView::Loading => f.write_str("Loading..."),
            EditPostView::NotFound => f.write_str("Post not found!"),
            EditPostView::LoadFailed(message) => write!(f, "Failed to load the post: {message}"),
            EditPostView::Submitted => f.write_str("Post submitted."),
            EditPostView::Form(form) => Display::fmt(form, f),
        }
    }
}

impl Display for FormView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(banner) = &self.banner {
            writeln!(f, "! {banner}")?;
        }
        writeln!(f, "Edit Post")?;
        writeln!(f, "Post Title: {}", self.title)?;
        writeln!(f, "Author:")?;
        for author in &self.authors {
            let mark = if author.selected { 'x' } else { ' ' };
            match author.id {
                Some(id) => writeln!(f, "  [{mark}] {} ({id})", author.name)?,
                None => writeln!(f, "  [{mark}]")?,
            }
        }
        writeln!(f, "Content: {}", self.content)?;

        let save = if self.can_save {
            "[Save Post]"
        } else {
            "[Save Post] (disabled)"
        };
        write!(f, "{save} [Delete Post]")
    }
}
