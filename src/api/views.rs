//! List view API
//!
//! Every view answers with a title and the notes in it, last updated first

use axum::extract::State;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::notes::Note;
use crate::session::Session;
use crate::storage::Storage;
use crate::views::LoadedView;
use crate::views::NavigationContext;
use crate::views::load;

use super::AppState;
use super::Error;
use super::PathParameters;
use super::QueryParameters;
use super::Success;

/// A note in a list, with a preview instead of the full content
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummaryResponse {
    /// The note ID
    pub id: Uuid,

    /// The title of the note
    pub title: String,

    /// Start of the content without Markdown markers
    pub preview: String,

    /// The folder of the note, if any
    pub folder_id: Option<Uuid>,

    /// Marked as favorite
    pub is_favorite: bool,

    /// Creation date of the note
    pub created_at: NaiveDateTime,

    /// Last time the title, content or folder changed
    pub updated_at: NaiveDateTime,
}

impl NoteSummaryResponse {
    fn from_note(note: Note) -> Self {
        Self {
            preview: note.preview(),
            id: note.id,
            title: note.title,
            folder_id: note.folder_id,
            is_favorite: note.is_favorite,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// A list view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    /// Title of the view, like "Favorites" or "Folder: Home"
    pub title: String,

    /// The notes in the view, last updated first
    pub notes: Vec<NoteSummaryResponse>,
}

impl ViewResponse {
    fn from_view(view: LoadedView) -> Self {
        Self {
            title: view.title,
            notes: view
                .notes
                .into_iter()
                .map(NoteSummaryResponse::from_note)
                .collect::<Vec<NoteSummaryResponse>>(),
        }
    }
}

/// Query parameters of a search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// The text to look for, blank lists all notes
    #[serde(default)]
    q: String,
}

async fn respond<S: Storage>(
    state: &AppState<S>,
    session: &Session,
    context: &NavigationContext,
) -> Result<Success<ViewResponse>, Error> {
    let view = load(&state.repository, session, context).await?;

    Ok(Success::ok(ViewResponse::from_view(view)))
}

/// All notes
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/views/all
/// ```
///
/// Response:
/// ```json
/// { "data": { "title": "All Notes", "notes": [ { "id": "<uuid>", "preview": "milk, eggs" ... } ] } }
/// ```
pub async fn all<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
) -> Result<Success<ViewResponse>, Error> {
    respond(&state, &session, &NavigationContext::None).await
}

/// The favorite notes
pub async fn favorites<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
) -> Result<Success<ViewResponse>, Error> {
    respond(&state, &session, &NavigationContext::Favorites).await
}

/// The notes in a folder
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/views/folders/<uuid>
/// ```
pub async fn folder<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    PathParameters(folder_id): PathParameters<Uuid>,
) -> Result<Success<ViewResponse>, Error> {
    respond(&state, &session, &NavigationContext::Folder(folder_id)).await
}

/// The notes with a tag
pub async fn tag<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    PathParameters(tag_id): PathParameters<Uuid>,
) -> Result<Success<ViewResponse>, Error> {
    respond(&state, &session, &NavigationContext::Tag(tag_id)).await
}

/// Search titles and contents
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:6000/api/views/search?q=milk'
/// ```
///
/// Response:
/// ```json
/// { "data": { "title": "Search results for \"milk\"", "notes": [ ... ] } }
/// ```
pub async fn search<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    QueryParameters(query): QueryParameters<SearchQuery>,
) -> Result<Success<ViewResponse>, Error> {
    respond(&state, &session, &NavigationContext::Search(query.q)).await
}
