//! Tags annotate notes, many-to-many through note tags

use uuid::Uuid;

/// A tag of a user
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Tag {
    /// Tag ID
    pub id: Uuid,

    /// The ID of the owner
    pub user_id: Uuid,

    /// Display name
    pub name: String,
}

/// Link between a note and a tag
///
/// Has no identity of its own, the pair is the key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoteTag {
    /// The tagged note
    pub note_id: Uuid,

    /// The tag on the note
    pub tag_id: Uuid,
}
