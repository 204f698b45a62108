//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::folders::Folder;
use crate::notes::Note;
use crate::tags::NoteTag;
use crate::tags::Tag;
use crate::users::User;

use super::CreateFolderValues;
use super::CreateNoteValues;
use super::CreateTagValues;
use super::CreateUserValues;
use super::Error;
use super::NoteQuery;
use super::Result;
use super::Storage;
use super::UpdateNoteValues;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
///
/// When a method needs more than one table, the locks are taken in field order
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All users in storage
    users: Arc<Mutex<HashMap<Uuid, User>>>,

    /// All folders in storage
    folders: Arc<Mutex<HashMap<Uuid, Folder>>>,

    /// All notes in storage
    notes: Arc<Mutex<HashMap<Uuid, Note>>>,

    /// All tags in storage
    tags: Arc<Mutex<HashMap<Uuid, Tag>>>,

    /// All links between notes and tags
    note_tags: Arc<Mutex<Vec<NoteTag>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

/// Current timestamp, without timezone like the Postgres columns
fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Does the note match the text search?
///
/// The search is expected to be lowercase already
fn matches_search(note: &Note, search: &str) -> bool {
    note.title.to_lowercase().contains(search) || note.content.to_lowercase().contains(search)
}

#[async_trait]
impl Storage for Memory {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn create_user(&self, values: &CreateUserValues) -> Result<User> {
        let mut users = self.users.lock().await;

        if users.values().any(|user| user.email == values.email) {
            return Err(Error::Constraint(format!(
                "Email {} is already taken",
                values.email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            session_id: *values.session_id,
            email: values.email.to_string(),
            hashed_password: values.hashed_password.to_string(),
            created_at: now(),
            updated_at: now(),
        };

        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn rotate_session(&self, user: &User, session_id: &Uuid) -> Result<User> {
        self.users
            .lock()
            .await
            .get_mut(&user.id)
            .map(|user| {
                user.session_id = *session_id;
                user.updated_at = now();

                user.clone()
            })
            .ok_or_else(|| Error::Constraint("User no longer exists".to_string()))
    }

    async fn find_all_folders(&self, user: &User) -> Result<Vec<Folder>> {
        let mut folders = self
            .folders
            .lock()
            .await
            .values()
            .filter(|folder| folder.user_id == user.id)
            .cloned()
            .collect::<Vec<Folder>>();

        folders.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(folders)
    }

    async fn find_single_folder_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Folder>> {
        Ok(self
            .folders
            .lock()
            .await
            .get(id)
            .filter(|folder| folder.user_id == user.id)
            .cloned())
    }

    async fn create_folder(&self, values: &CreateFolderValues) -> Result<Folder> {
        let folder = Folder {
            id: Uuid::new_v4(),
            user_id: values.user.id,
            name: values.name.to_string(),
        };

        self.folders.lock().await.insert(folder.id, folder.clone());

        Ok(folder)
    }

    async fn delete_folder(&self, folder: &Folder) -> Result<()> {
        let mut folders = self.folders.lock().await;
        let mut notes = self.notes.lock().await;

        folders.remove(&folder.id);

        for note in notes.values_mut() {
            if note.folder_id == Some(folder.id) {
                note.folder_id = None;
            }
        }

        Ok(())
    }

    async fn find_all_tags(&self, user: &User) -> Result<Vec<Tag>> {
        let mut tags = self
            .tags
            .lock()
            .await
            .values()
            .filter(|tag| tag.user_id == user.id)
            .cloned()
            .collect::<Vec<Tag>>();

        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(tags)
    }

    async fn find_tags_by_ids(&self, user: &User, ids: &[Uuid]) -> Result<Vec<Tag>> {
        let mut tags = self
            .tags
            .lock()
            .await
            .values()
            .filter(|tag| tag.user_id == user.id && ids.contains(&tag.id))
            .cloned()
            .collect::<Vec<Tag>>();

        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(tags)
    }

    async fn find_single_tag_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Tag>> {
        Ok(self
            .tags
            .lock()
            .await
            .get(id)
            .filter(|tag| tag.user_id == user.id)
            .cloned())
    }

    async fn create_tag(&self, values: &CreateTagValues) -> Result<Tag> {
        let tag = Tag {
            id: Uuid::new_v4(),
            user_id: values.user.id,
            name: values.name.to_string(),
        };

        self.tags.lock().await.insert(tag.id, tag.clone());

        Ok(tag)
    }

    async fn delete_tag(&self, tag: &Tag) -> Result<()> {
        let mut tags = self.tags.lock().await;
        let mut note_tags = self.note_tags.lock().await;

        tags.remove(&tag.id);
        note_tags.retain(|note_tag| note_tag.tag_id != tag.id);

        Ok(())
    }

    async fn find_notes(&self, user: &User, query: &NoteQuery) -> Result<Vec<Note>> {
        let search = query.search.as_deref().map(str::to_lowercase);

        let mut notes = self
            .notes
            .lock()
            .await
            .values()
            .filter(|note| note.user_id == user.id)
            .filter(|note| query.folder_id.is_none() || note.folder_id == query.folder_id)
            .filter(|note| {
                query
                    .note_ids
                    .as_ref()
                    .is_none_or(|note_ids| note_ids.contains(&note.id))
            })
            .filter(|note| !query.favorites_only || note.is_favorite)
            .filter(|note| {
                search
                    .as_deref()
                    .is_none_or(|search| matches_search(note, search))
            })
            .cloned()
            .collect::<Vec<Note>>();

        notes.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(notes)
    }

    async fn find_single_note_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Note>> {
        Ok(self
            .notes
            .lock()
            .await
            .get(id)
            .filter(|note| note.user_id == user.id)
            .cloned())
    }

    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note> {
        let note = Note {
            id: Uuid::new_v4(),
            user_id: values.user.id,
            folder_id: values.folder_id.copied(),
            title: values.title.to_string(),
            content: values.content.to_string(),
            is_favorite: false,
            created_at: now(),
            updated_at: now(),
        };

        self.notes.lock().await.insert(note.id, note.clone());

        Ok(note)
    }

    async fn update_note(&self, note: &Note, values: &UpdateNoteValues) -> Result<Note> {
        self.notes
            .lock()
            .await
            .get_mut(&note.id)
            .map(|note| {
                note.title = values.title.to_string();
                note.content = values.content.to_string();
                note.folder_id = values.folder_id.copied();
                note.updated_at = now().max(note.updated_at);

                note.clone()
            })
            .ok_or_else(|| Error::Constraint("Note no longer exists".to_string()))
    }

    async fn set_favorite(&self, note: &Note, is_favorite: bool) -> Result<Note> {
        self.notes
            .lock()
            .await
            .get_mut(&note.id)
            .map(|note| {
                note.is_favorite = is_favorite;

                note.clone()
            })
            .ok_or_else(|| Error::Constraint("Note no longer exists".to_string()))
    }

    async fn delete_note(&self, note: &Note) -> Result<()> {
        let mut notes = self.notes.lock().await;
        let mut note_tags = self.note_tags.lock().await;

        notes.remove(&note.id);
        note_tags.retain(|note_tag| note_tag.note_id != note.id);

        Ok(())
    }

    async fn find_note_ids_by_tag(&self, tag: &Tag) -> Result<Vec<Uuid>> {
        Ok(self
            .note_tags
            .lock()
            .await
            .iter()
            .filter(|note_tag| note_tag.tag_id == tag.id)
            .map(|note_tag| note_tag.note_id)
            .collect())
    }

    async fn find_tags_by_note(&self, note: &Note) -> Result<Vec<Tag>> {
        let tags = self.tags.lock().await;
        let note_tags = self.note_tags.lock().await;

        let mut linked = note_tags
            .iter()
            .filter(|note_tag| note_tag.note_id == note.id)
            .filter_map(|note_tag| tags.get(&note_tag.tag_id))
            .cloned()
            .collect::<Vec<Tag>>();

        linked.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(linked)
    }

    async fn replace_note_tags(&self, note: &Note, tag_ids: &[Uuid]) -> Result<()> {
        let notes = self.notes.lock().await;
        let tags = self.tags.lock().await;
        let mut note_tags = self.note_tags.lock().await;

        if !notes.contains_key(&note.id) {
            return Err(Error::Constraint("Note no longer exists".to_string()));
        }

        if let Some(tag_id) = tag_ids.iter().find(|tag_id| !tags.contains_key(tag_id)) {
            return Err(Error::Constraint(format!("Tag {tag_id} does not exist")));
        }

        note_tags.retain(|note_tag| note_tag.note_id != note.id);

        for tag_id in tag_ids {
            let note_tag = NoteTag {
                note_id: note.id,
                tag_id: *tag_id,
            };

            if !note_tags.contains(&note_tag) {
                note_tags.push(note_tag);
            }
        }

        Ok(())
    }
}
