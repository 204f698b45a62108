//! Dump note API
//!
//! Quick notes: title and content only, never in a folder, tags are left alone

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::editor::EditorMode;
use crate::editor::NoteEditor;
use crate::session::Session;
use crate::storage::Storage;

use super::AppState;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::notes::NoteResponse;

/// Dump note form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpNoteForm {
    /// Title, may not be empty
    title: String,

    /// Markdown content
    #[serde(default)]
    content: String,
}

/// Create a dump note
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "title": "Thoughts", "content": "Just dumping this here" }' \
///     http://localhost:6000/api/dump-notes
/// ```
pub async fn create<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    Form(form): Form<DumpNoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let mut editor = NoteEditor::new(state.repository.clone(), EditorMode::Dump);
    editor.set_title(form.title);
    editor.set_content(form.content);

    let note_id = editor.save(&session).await?;

    let details = state.repository.get_note(&session, &note_id).await?;

    Ok(Success::created(NoteResponse::from_note(details.note)))
}

/// Save a dump note, an existing note leaves its folder
pub async fn update<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    PathParameters(note_id): PathParameters<Uuid>,
    Form(form): Form<DumpNoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let mut editor =
        NoteEditor::open(state.repository.clone(), &session, &note_id, EditorMode::Dump).await?;
    editor.set_title(form.title);
    editor.set_content(form.content);

    editor.save(&session).await?;

    let details = state.repository.get_note(&session, &note_id).await?;

    Ok(Success::ok(NoteResponse::from_note(details.note)))
}
