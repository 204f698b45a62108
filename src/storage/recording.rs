//! Recording storage for tests
//!
//! Wraps the memory storage, remembers every operation and can simulate failures

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::folders::Folder;
use crate::notes::Note;
use crate::tags::Tag;
use crate::users::User;

use super::CreateFolderValues;
use super::CreateNoteValues;
use super::CreateTagValues;
use super::CreateUserValues;
use super::Error;
use super::Memory;
use super::NoteQuery;
use super::Result;
use super::Storage;
use super::UpdateNoteValues;

/// Memory storage that records the name of every operation
#[derive(Clone, Debug, Default)]
pub struct Recording {
    /// The actual storage
    inner: Memory,

    /// Names of the operations, in call order
    calls: Arc<Mutex<Vec<&'static str>>>,

    /// Names of the operations that fail
    failing: Arc<Mutex<Vec<&'static str>>>,
}

impl Recording {
    /// Create a new empty recording storage
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded operations, in call order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// How often an operation was called
    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    /// Forget all recorded operations
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Make an operation fail from now on
    pub fn fail_on(&self, operation: &'static str) {
        self.failing.lock().unwrap().push(operation);
    }

    /// Let all operations succeed again
    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Record a call, fails when the operation is marked as failing
    fn record(&self, operation: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(operation);

        if self.failing.lock().unwrap().contains(&operation) {
            Err(Error::Connection(format!("Simulated failure of {operation}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Storage for Recording {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.record("find_single_user_by_email")?;
        self.inner.find_single_user_by_email(email).await
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        self.record("find_single_user_by_id")?;
        self.inner.find_single_user_by_id(id).await
    }

    async fn create_user(&self, values: &CreateUserValues) -> Result<User> {
        self.record("create_user")?;
        self.inner.create_user(values).await
    }

    async fn rotate_session(&self, user: &User, session_id: &Uuid) -> Result<User> {
        self.record("rotate_session")?;
        self.inner.rotate_session(user, session_id).await
    }

    async fn find_all_folders(&self, user: &User) -> Result<Vec<Folder>> {
        self.record("find_all_folders")?;
        self.inner.find_all_folders(user).await
    }

    async fn find_single_folder_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Folder>> {
        self.record("find_single_folder_by_id")?;
        self.inner.find_single_folder_by_id(user, id).await
    }

    async fn create_folder(&self, values: &CreateFolderValues) -> Result<Folder> {
        self.record("create_folder")?;
        self.inner.create_folder(values).await
    }

    async fn delete_folder(&self, folder: &Folder) -> Result<()> {
        self.record("delete_folder")?;
        self.inner.delete_folder(folder).await
    }

    async fn find_all_tags(&self, user: &User) -> Result<Vec<Tag>> {
        self.record("find_all_tags")?;
        self.inner.find_all_tags(user).await
    }

    async fn find_tags_by_ids(&self, user: &User, ids: &[Uuid]) -> Result<Vec<Tag>> {
        self.record("find_tags_by_ids")?;
        self.inner.find_tags_by_ids(user, ids).await
    }

    async fn find_single_tag_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Tag>> {
        self.record("find_single_tag_by_id")?;
        self.inner.find_single_tag_by_id(user, id).await
    }

    async fn create_tag(&self, values: &CreateTagValues) -> Result<Tag> {
        self.record("create_tag")?;
        self.inner.create_tag(values).await
    }

    async fn delete_tag(&self, tag: &Tag) -> Result<()> {
        self.record("delete_tag")?;
        self.inner.delete_tag(tag).await
    }

    async fn find_notes(&self, user: &User, query: &NoteQuery) -> Result<Vec<Note>> {
        self.record("find_notes")?;
        self.inner.find_notes(user, query).await
    }

    async fn find_single_note_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Note>> {
        self.record("find_single_note_by_id")?;
        self.inner.find_single_note_by_id(user, id).await
    }

    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note> {
        self.record("create_note")?;
        self.inner.create_note(values).await
    }

    async fn update_note(&self, note: &Note, values: &UpdateNoteValues) -> Result<Note> {
        self.record("update_note")?;
        self.inner.update_note(note, values).await
    }

    async fn set_favorite(&self, note: &Note, is_favorite: bool) -> Result<Note> {
        self.record("set_favorite")?;
        self.inner.set_favorite(note, is_favorite).await
    }

    async fn delete_note(&self, note: &Note) -> Result<()> {
        self.record("delete_note")?;
        self.inner.delete_note(note).await
    }

    async fn find_note_ids_by_tag(&self, tag: &Tag) -> Result<Vec<Uuid>> {
        self.record("find_note_ids_by_tag")?;
        self.inner.find_note_ids_by_tag(tag).await
    }

    async fn find_tags_by_note(&self, note: &Note) -> Result<Vec<Tag>> {
        self.record("find_tags_by_note")?;
        self.inner.find_tags_by_note(note).await
    }

    async fn replace_note_tags(&self, note: &Note, tag_ids: &[Uuid]) -> Result<()> {
        self.record("replace_note_tags")?;
        self.inner.replace_note_tags(note, tag_ids).await
    }
}
