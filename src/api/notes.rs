//! Note API
//!
//! Creating and editing goes through the [`NoteEditor`], so the note and its tags are saved
//! together

use axum::extract::State;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::editor::EditorMode;
use crate::editor::NoteEditor;
use crate::notes::Note;
use crate::repository::NoteDetails;
use crate::session::Session;
use crate::storage::Storage;

use super::AppState;
use super::Error;
use super::Form;
use super::PathParameters;
use super::QueryParameters;
use super::Success;
use super::folders::FolderResponse;
use super::tags::TagResponse;

/// The note response information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// The note ID
    pub id: Uuid,

    /// The title of the note
    pub title: String,

    /// Markdown content
    pub content: String,

    /// The folder of the note, if any
    pub folder_id: Option<Uuid>,

    /// Marked as favorite
    pub is_favorite: bool,

    /// Creation date of the note
    pub created_at: NaiveDateTime,

    /// Last time the title, content or folder changed
    pub updated_at: NaiveDateTime,
}

impl NoteResponse {
    pub fn from_note(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            folder_id: note.folder_id,
            is_favorite: note.is_favorite,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// A note with its folder and tags
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDetailResponse {
    /// The note itself, inlined
    #[serde(flatten)]
    pub note: NoteResponse,

    /// The folder of the note, if any
    pub folder: Option<FolderResponse>,

    /// The tags on the note, by name
    pub tags: Vec<TagResponse>,
}

impl NoteDetailResponse {
    fn from_details(details: NoteDetails) -> Self {
        Self {
            note: NoteResponse::from_note(details.note),
            folder: details.folder.map(FolderResponse::from_folder),
            tags: details
                .tags
                .into_iter()
                .map(TagResponse::from_tag)
                .collect::<Vec<TagResponse>>(),
        }
    }
}

/// Note form, the full desired state of the note
///
/// Fields that are left out are emptied: no content, no folder, no tags
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteForm {
    /// Title, may not be empty
    title: String,

    /// Markdown content
    #[serde(default)]
    content: String,

    /// Folder to put the note in
    #[serde(default)]
    folder_id: Option<Uuid>,

    /// All tags of the note
    #[serde(default)]
    tag_ids: Vec<Uuid>,
}

impl NoteForm {
    fn apply<S: Storage>(self, editor: &mut NoteEditor<S>) {
        editor.set_title(self.title);
        editor.set_content(self.content);
        editor.set_folder(self.folder_id);
        editor.set_tags(self.tag_ids);
    }
}

/// Get a single note with its folder and tags
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/notes/<uuid>
/// ```
///
/// Response:
/// ```json
/// { "data": { "id": "<uuid>", "title": "Groceries", "folder": null, "tags": [ ... ] ... } }
/// ```
pub async fn single<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<NoteDetailResponse>, Error> {
    let details = state.repository.get_note(&session, &note_id).await?;

    Ok(Success::ok(NoteDetailResponse::from_details(details)))
}

/// Create a note, with folder and tags
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "title": "Groceries", "content": "milk, eggs", "tagIds": [ "<uuid>" ] }' \
///     http://localhost:6000/api/notes
/// ```
pub async fn create<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    Form(form): Form<NoteForm>,
) -> Result<Success<NoteDetailResponse>, Error> {
    let mut editor = NoteEditor::new(state.repository.clone(), EditorMode::Organized);
    form.apply(&mut editor);

    let note_id = editor.save(&session).await?;

    let details = state.repository.get_note(&session, &note_id).await?;

    Ok(Success::created(NoteDetailResponse::from_details(details)))
}

/// Save a note, replaces title, content, folder and tags
///
/// Request:
/// ```sh
/// curl -v -XPUT -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "title": "Groceries", "content": "milk, eggs, bread", "folderId": "<uuid>" }' \
///     http://localhost:6000/api/notes/<uuid>
/// ```
pub async fn update<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    PathParameters(note_id): PathParameters<Uuid>,
    Form(form): Form<NoteForm>,
) -> Result<Success<NoteDetailResponse>, Error> {
    let mut editor = NoteEditor::open(
        state.repository.clone(),
        &session,
        &note_id,
        EditorMode::Organized,
    )
    .await?;
    form.apply(&mut editor);

    editor.save(&session).await?;

    let details = state.repository.get_note(&session, &note_id).await?;

    Ok(Success::ok(NoteDetailResponse::from_details(details)))
}

/// Favorite form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteForm {
    /// The desired flag
    is_favorite: bool,
}

/// Mark or unmark a note as favorite
///
/// The response holds the flag as stored
///
/// Request:
/// ```sh
/// curl -v -XPUT -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "isFavorite": true }' \
///     http://localhost:6000/api/notes/<uuid>/favorite
/// ```
pub async fn favorite<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    PathParameters(note_id): PathParameters<Uuid>,
    Form(form): Form<FavoriteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let note = state
        .repository
        .toggle_favorite(&session, &note_id, form.is_favorite)
        .await?;

    Ok(Success::ok(NoteResponse::from_note(note)))
}

/// Query parameters of a delete
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    /// The user agreed to delete the note
    #[serde(default)]
    confirm: bool,
}

/// Delete a note
///
/// Only with `?confirm=true`, anything else leaves the note alone
///
/// Request:
/// ```sh
/// curl -v -XDELETE -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:6000/api/notes/<uuid>?confirm=true'
/// ```
pub async fn delete<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    PathParameters(note_id): PathParameters<Uuid>,
    QueryParameters(query): QueryParameters<DeleteQuery>,
) -> Result<Success<&'static str>, Error> {
    state
        .repository
        .delete_note(&session, &note_id, query.confirm.into())
        .await?;

    Ok(Success::<&'static str>::no_content())
}
