//! All things related to the storage of users, notes, folders and tags
//!
//! The storage is the single source of truth, everything else holds transient copies

use core::fmt;

use async_trait::async_trait;
use uuid::Uuid;

pub use memory::Memory;
pub use postgres::Postgres;

use crate::folders::Folder;
use crate::notes::Note;
use crate::tags::Tag;
use crate::users::User;

mod memory;
mod postgres;
#[cfg(test)]
pub mod recording;

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// A connection error with the storage
    Connection(String),

    /// The storage refused the write, like a duplicate or a dangling reference
    Constraint(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Connection(error) => write!(f, "Connection error: {error}"),
            Error::Constraint(error) => write!(f, "Constraint violation: {error}"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Storage configuration
pub enum Config {
    /// Detect configuration from environment
    ///
    /// Postgres when `DATABASE_URL` is set, memory otherwise
    DetectConfig,

    /// In-memory storage, gone on shutdown
    #[cfg_attr(not(test), allow(dead_code))]
    Memory,
}

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The initial session ID for the user
    pub session_id: &'a Uuid,

    /// The normalized email address
    pub email: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to create a Folder
pub struct CreateFolderValues<'a> {
    /// The user owning the folder
    pub user: &'a User,

    /// Normalized name of the folder
    pub name: &'a str,
}

/// Values to create a Tag
pub struct CreateTagValues<'a> {
    /// The user owning the tag
    pub user: &'a User,

    /// Normalized name of the tag
    pub name: &'a str,
}

/// Values to create a Note
pub struct CreateNoteValues<'a> {
    /// User owning the note
    pub user: &'a User,

    /// Title of the note, already validated
    pub title: &'a str,

    /// Markdown content
    pub content: &'a str,

    /// Folder of the note, already verified to be owned by the user
    pub folder_id: Option<&'a Uuid>,
}

/// Values to update a Note
///
/// A full overwrite of the mutable fields, the favorite flag is left alone
pub struct UpdateNoteValues<'a> {
    /// New title, already validated
    pub title: &'a str,

    /// New Markdown content
    pub content: &'a str,

    /// New folder, `None` removes the note from its folder
    pub folder_id: Option<&'a Uuid>,
}

/// Query to find notes of a single user
///
/// All given conditions must hold, results are ordered by last update, newest first
#[derive(Clone, Debug, Default)]
pub struct NoteQuery {
    /// Only notes in this folder
    pub folder_id: Option<Uuid>,

    /// Only notes with one of these IDs
    pub note_ids: Option<Vec<Uuid>>,

    /// Only notes marked as favorite
    pub favorites_only: bool,

    /// Only notes with this text in the title or the content, case-insensitive
    pub search: Option<String>,
}

/// Storage with all supported operations
///
/// Every lookup is scoped to the owning user, a record of somebody else does not exist
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Finds a single user by its email address
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Finds a single user by its ID
    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>>;

    /// Create a single user
    async fn create_user(&self, values: &CreateUserValues) -> Result<User>;

    /// Replace the session ID of a user, invalidating all tokens
    async fn rotate_session(&self, user: &User, session_id: &Uuid) -> Result<User>;

    /// Find all folders of a user, ordered by name
    async fn find_all_folders(&self, user: &User) -> Result<Vec<Folder>>;

    /// Find a single folder of a user
    async fn find_single_folder_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Folder>>;

    /// Create a folder
    async fn create_folder(&self, values: &CreateFolderValues) -> Result<Folder>;

    /// Delete a folder, its notes are kept without a folder
    async fn delete_folder(&self, folder: &Folder) -> Result<()>;

    /// Find all tags of a user, ordered by name
    async fn find_all_tags(&self, user: &User) -> Result<Vec<Tag>>;

    /// Find the tags of a user with one of the given IDs, ordered by name
    async fn find_tags_by_ids(&self, user: &User, ids: &[Uuid]) -> Result<Vec<Tag>>;

    /// Find a single tag of a user
    async fn find_single_tag_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Tag>>;

    /// Create a tag
    async fn create_tag(&self, values: &CreateTagValues) -> Result<Tag>;

    /// Delete a tag and all its links to notes
    async fn delete_tag(&self, tag: &Tag) -> Result<()>;

    /// Find the notes of a user matching the query
    async fn find_notes(&self, user: &User, query: &NoteQuery) -> Result<Vec<Note>>;

    /// Find a single note of a user
    async fn find_single_note_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Note>>;

    /// Create a note
    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note>;

    /// Update a note, refreshes the updated at
    async fn update_note(&self, note: &Note, values: &UpdateNoteValues) -> Result<Note>;

    /// Set the favorite flag of a note, leaves the updated at alone
    async fn set_favorite(&self, note: &Note, is_favorite: bool) -> Result<Note>;

    /// Delete a note and all its links to tags
    async fn delete_note(&self, note: &Note) -> Result<()>;

    /// Find the IDs of all notes linked to a tag
    async fn find_note_ids_by_tag(&self, tag: &Tag) -> Result<Vec<Uuid>>;

    /// Find the tags linked to a note, ordered by name
    async fn find_tags_by_note(&self, note: &Note) -> Result<Vec<Tag>>;

    /// Replace all tag links of a note
    ///
    /// Removes every existing link, then links exactly the given tags. Both steps succeed or
    /// neither does.
    async fn replace_note_tags(&self, note: &Note, tag_ids: &[Uuid]) -> Result<()>;
}
