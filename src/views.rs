//! List views
//!
//! A navigational context maps to exactly one filter and a title

use uuid::Uuid;

use crate::error::Result;
use crate::notes::Note;
use crate::repository::NoteFilter;
use crate::repository::NoteRepository;
use crate::session::Session;
use crate::storage::Storage;
use crate::utils::normalize_text;

/// Where the user navigated to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationContext {
    /// Nothing in particular
    None,

    /// The favorite notes
    Favorites,

    /// A folder
    Folder(Uuid),

    /// A tag
    Tag(Uuid),

    /// A search query
    Search(String),
}

/// Title of a view, folder and tag names need a lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewTitle {
    /// Known up front
    Fixed(String),

    /// "Folder: " and the folder name
    Folder(Uuid),

    /// "Tag: " and the tag name
    Tag(Uuid),
}

impl ViewTitle {
    /// Resolve the title, looking up folder or tag names
    pub async fn resolve<S: Storage>(
        &self,
        repository: &NoteRepository<S>,
        session: &Session,
    ) -> Result<String> {
        match self {
            ViewTitle::Fixed(title) => Ok(title.clone()),
            ViewTitle::Folder(folder_id) => {
                let folder = repository.get_folder(session, folder_id).await?;

                Ok(format!("Folder: {}", folder.name))
            }
            ViewTitle::Tag(tag_id) => {
                let tag = repository.get_tag(session, tag_id).await?;

                Ok(format!("Tag: {}", tag.name))
            }
        }
    }
}

/// A selected view: what to list and how to call it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct View {
    /// Which notes to list
    pub filter: NoteFilter,

    /// What to call the list
    pub title: ViewTitle,
}

/// A view with its notes
#[derive(Clone, Debug)]
pub struct LoadedView {
    /// The resolved title
    pub title: String,

    /// The notes, last updated first
    pub notes: Vec<Note>,
}

/// Select the view for a navigational context
///
/// A blank search is no search at all
pub fn select(context: &NavigationContext) -> View {
    match context {
        NavigationContext::None => all_notes(),
        NavigationContext::Favorites => View {
            filter: NoteFilter::Favorites,
            title: ViewTitle::Fixed("Favorite Notes".to_string()),
        },
        NavigationContext::Folder(folder_id) => View {
            filter: NoteFilter::Folder(*folder_id),
            title: ViewTitle::Folder(*folder_id),
        },
        NavigationContext::Tag(tag_id) => View {
            filter: NoteFilter::Tag(*tag_id),
            title: ViewTitle::Tag(*tag_id),
        },
        NavigationContext::Search(query) => match normalize_text(query) {
            Some(query) => View {
                title: ViewTitle::Fixed(format!("Search results for \"{query}\"")),
                filter: NoteFilter::Search(query),
            },
            None => all_notes(),
        },
    }
}

/// Load a view: resolve its title, then list its notes
///
/// An unknown folder or tag is not found, before any notes are listed
pub async fn load<S: Storage>(
    repository: &NoteRepository<S>,
    session: &Session,
    context: &NavigationContext,
) -> Result<LoadedView> {
    let view = select(context);

    let title = view.title.resolve(repository, session).await?;
    let notes = repository.list_notes(session, &view.filter).await?;

    Ok(LoadedView { title, notes })
}

fn all_notes() -> View {
    View {
        filter: NoteFilter::All,
        title: ViewTitle::Fixed("All Notes".to_string()),
    }
}
