//! Tag API

use axum::extract::State;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::session::Session;
use crate::storage::Storage;
use crate::tags::Tag;

use super::AppState;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;

/// The tag response information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    /// The tag ID
    pub id: Uuid,

    /// The name of the tag
    pub name: String,
}

impl TagResponse {
    pub fn from_tag(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }

    fn from_tag_multiple(mut tags: Vec<Tag>) -> Vec<Self> {
        tags.drain(..).map(Self::from_tag).collect::<Vec<Self>>()
    }
}

/// Tag form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagForm {
    /// Name, surrounding whitespace is trimmed
    name: String,
}

/// List all tags of the user, by name
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/tags
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "id": "<uuid>", "name": "errand" } ] }
/// ```
pub async fn list<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
) -> Result<Success<Vec<TagResponse>>, Error> {
    let tags = state.repository.list_tags(&session).await?;

    Ok(Success::ok(TagResponse::from_tag_multiple(tags)))
}

/// Create a tag
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "name": "errand" }' \
///     http://localhost:6000/api/tags
/// ```
pub async fn create<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    Form(form): Form<TagForm>,
) -> Result<Success<TagResponse>, Error> {
    let tag = state.repository.create_tag(&session, &form.name).await?;

    Ok(Success::created(TagResponse::from_tag(tag)))
}

/// Delete a tag, it is removed from all notes
pub async fn delete<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
    PathParameters(tag_id): PathParameters<Uuid>,
) -> Result<Success<&'static str>, Error> {
    state.repository.delete_tag(&session, &tag_id).await?;

    Ok(Success::<&'static str>::no_content())
}
