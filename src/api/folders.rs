//! Folder API

use axum::extract::State;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::folders::Folder;
use crate::session::Session;
use crate::storage::Storage;

use super::AppState;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;

/// The folder response information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    /// The folder ID
    pub id: Uuid,

    /// The name of the folder
    pub name: String,
}

impl FolderResponse {
    pub fn from_folder(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
        }
    }

    fn from_folder_multiple(mut folders: Vec<Folder>) -> Vec<Self> {
        folders.drain(..).map(Self::from_folder).collect::<Vec<Self>>()
    }
}

/// Folder form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderForm {
    /// Name, surrounding whitespace is trimmed
    name: String,
}

/// List all folders of the user, by name
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/folders
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "id": "<uuid>", "name": "Home" } ] }
/// ```
pub async fn list<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
) -> Result<Success<Vec<FolderResponse>>, Error> {
    let folders = state.repository.list_folders(&session).await?;

    Ok(Success::ok(FolderResponse::from_folder_multiple(folders)))
}

/// Create a folder
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "name": "Home" }' \
///     http://localhost:6000/api/folders
/// ```
pub async fn create<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    Form(form): Form<FolderForm>,
) -> Result<Success<FolderResponse>, Error> {
    let folder = state.repository.create_folder(&session, &form.name).await?;

    Ok(Success::created(FolderResponse::from_folder(folder)))
}

/// Delete a folder, the notes in it are kept without folder
pub async fn delete<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    PathParameters(folder_id): PathParameters<Uuid>,
) -> Result<Success<&'static str>, Error> {
    state.repository.delete_folder(&session, &folder_id).await?;

    Ok(Success::<&'static str>::no_content())
}
