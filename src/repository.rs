//! Note repository
//!
//! The operations on notes, folders, tags and their links, always on behalf of a session

use uuid::Uuid;

use crate::error::Error;
use crate::error::Result;
use crate::folders::Folder;
use crate::notes::Note;
use crate::notes::is_valid_title;
use crate::session::Session;
use crate::storage::CreateFolderValues;
use crate::storage::CreateNoteValues;
use crate::storage::CreateTagValues;
use crate::storage::NoteQuery;
use crate::storage::Storage;
use crate::storage::UpdateNoteValues;
use crate::tags::Tag;
use crate::utils::normalize_text;
use crate::utils::normalize_unicode;

/// Which notes to list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoteFilter {
    /// All notes
    All,

    /// Notes in a folder
    Folder(Uuid),

    /// Notes with a tag
    Tag(Uuid),

    /// Notes marked as favorite
    Favorites,

    /// Notes with the text in their title or content
    Search(String),
}

/// The editable fields of a note
#[derive(Clone, Copy, Debug)]
pub struct NoteFields<'a> {
    /// Title, may not be empty
    pub title: &'a str,

    /// Markdown content
    pub content: &'a str,

    /// Folder of the note
    pub folder_id: Option<Uuid>,
}

/// A note with its folder and tags resolved
#[derive(Clone, Debug)]
pub struct NoteDetails {
    /// The note itself
    pub note: Note,

    /// The folder of the note, if any
    pub folder: Option<Folder>,

    /// The tags on the note, ordered by name
    pub tags: Vec<Tag>,
}

/// Answer to "are you sure?" before something is destroyed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// Go ahead
    Confirmed,

    /// Leave it be
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Note repository on top of a storage
#[derive(Clone, Debug)]
pub struct NoteRepository<S: Storage> {
    /// The storage, source of truth
    storage: S,
}

impl<S: Storage> NoteRepository<S> {
    /// Create a repository for a storage
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// List the notes matching the filter, last updated first
    pub async fn list_notes(&self, session: &Session, filter: &NoteFilter) -> Result<Vec<Note>> {
        let query = match filter {
            NoteFilter::All => NoteQuery::default(),
            NoteFilter::Folder(folder_id) => NoteQuery {
                folder_id: Some(*folder_id),
                ..NoteQuery::default()
            },
            NoteFilter::Tag(tag_id) => {
                let note_ids = self.find_note_ids_by_tag(session, tag_id).await?;

                // nothing tagged, no need to look for notes
                if note_ids.is_empty() {
                    return Ok(Vec::new());
                }

                NoteQuery {
                    note_ids: Some(note_ids),
                    ..NoteQuery::default()
                }
            }
            NoteFilter::Favorites => NoteQuery {
                favorites_only: true,
                ..NoteQuery::default()
            },
            NoteFilter::Search(search) => NoteQuery {
                search: normalize_text(search),
                ..NoteQuery::default()
            },
        };

        let notes = self.storage.find_notes(session, &query).await?;

        tracing::debug!("Found {} notes for {filter:?}", notes.len());

        Ok(notes)
    }

    /// Get a single note with its folder and tags
    pub async fn get_note(&self, session: &Session, note_id: &Uuid) -> Result<NoteDetails> {
        let note = self.fetch_note(session, note_id).await?;

        let folder = match &note.folder_id {
            Some(folder_id) => {
                self.storage
                    .find_single_folder_by_id(session, folder_id)
                    .await?
            }
            None => None,
        };

        let tags = self.storage.find_tags_by_note(&note).await?;

        Ok(NoteDetails { note, folder, tags })
    }

    /// Create a note
    pub async fn create_note(&self, session: &Session, fields: &NoteFields<'_>) -> Result<Note> {
        validate_title(fields.title)?;
        self.verify_folder(session, fields.folder_id.as_ref()).await?;

        let title = normalize_unicode(fields.title);
        let content = normalize_unicode(fields.content);

        let values = CreateNoteValues {
            user: session,
            title: &title,
            content: &content,
            folder_id: fields.folder_id.as_ref(),
        };

        let note = self.storage.create_note(&values).await?;

        tracing::debug!("Created note {}", note.id);

        Ok(note)
    }

    /// Update the title, content and folder of a note
    pub async fn update_note(
        &self,
        session: &Session,
        note_id: &Uuid,
        fields: &NoteFields<'_>,
    ) -> Result<Note> {
        validate_title(fields.title)?;

        let note = self.fetch_note(session, note_id).await?;
        self.verify_folder(session, fields.folder_id.as_ref()).await?;

        let title = normalize_unicode(fields.title);
        let content = normalize_unicode(fields.content);

        let values = UpdateNoteValues {
            title: &title,
            content: &content,
            folder_id: fields.folder_id.as_ref(),
        };

        let note = self.storage.update_note(&note, &values).await?;

        tracing::debug!("Updated note {}", note.id);

        Ok(note)
    }

    /// Mark or unmark a note as favorite
    ///
    /// The returned note is what the storage confirmed
    pub async fn toggle_favorite(
        &self,
        session: &Session,
        note_id: &Uuid,
        is_favorite: bool,
    ) -> Result<Note> {
        let note = self.fetch_note(session, note_id).await?;

        Ok(self.storage.set_favorite(&note, is_favorite).await?)
    }

    /// Delete a note, with its tag links
    ///
    /// Without confirmation the storage is not contacted at all
    pub async fn delete_note(
        &self,
        session: &Session,
        note_id: &Uuid,
        confirmation: Confirmation,
    ) -> Result<()> {
        if confirmation != Confirmation::Confirmed {
            return Err(Error::validation("Deletion must be confirmed"));
        }

        let note = self.fetch_note(session, note_id).await?;

        self.storage.delete_note(&note).await?;

        tracing::debug!("Deleted note {}", note.id);

        Ok(())
    }

    /// Replace the tags of a note with exactly the given tags
    ///
    /// All links are removed first, then the given tags are linked. Repeated IDs count once.
    pub async fn replace_note_tags(
        &self,
        session: &Session,
        note_id: &Uuid,
        tag_ids: &[Uuid],
    ) -> Result<Vec<Tag>> {
        let note = self.fetch_note(session, note_id).await?;
        let tags = self.verify_tags(session, tag_ids).await?;

        self.link_tags(&note, &tags).await?;

        Ok(tags)
    }

    /// Replace the tags of a note that was just fetched or written, with verified tags
    pub async fn link_tags(&self, note: &Note, tags: &[Tag]) -> Result<()> {
        let tag_ids = tags.iter().map(|tag| tag.id).collect::<Vec<Uuid>>();

        self.storage.replace_note_tags(note, &tag_ids).await?;

        Ok(())
    }

    /// Make sure all tags belong to the session user
    pub async fn verify_tags(&self, session: &Session, tag_ids: &[Uuid]) -> Result<Vec<Tag>> {
        let unique_tag_ids = unique(tag_ids);

        let tags = self
            .storage
            .find_tags_by_ids(session, &unique_tag_ids)
            .await?;

        if tags.len() == unique_tag_ids.len() {
            Ok(tags)
        } else {
            Err(Error::validation("Unknown tag"))
        }
    }

    /// List all folders, ordered by name
    pub async fn list_folders(&self, session: &Session) -> Result<Vec<Folder>> {
        Ok(self.storage.find_all_folders(session).await?)
    }

    /// Get a single folder
    pub async fn get_folder(&self, session: &Session, folder_id: &Uuid) -> Result<Folder> {
        self.storage
            .find_single_folder_by_id(session, folder_id)
            .await?
            .ok_or(Error::NotFound("Folder not found"))
    }

    /// Create a folder
    pub async fn create_folder(&self, session: &Session, name: &str) -> Result<Folder> {
        let name = normalize_text(name).ok_or_else(|| Error::validation("Name is required"))?;

        let values = CreateFolderValues {
            user: session,
            name: &name,
        };

        Ok(self.storage.create_folder(&values).await?)
    }

    /// Delete a folder, its notes stay without folder
    pub async fn delete_folder(&self, session: &Session, folder_id: &Uuid) -> Result<()> {
        let folder = self.get_folder(session, folder_id).await?;

        Ok(self.storage.delete_folder(&folder).await?)
    }

    /// List all tags, ordered by name
    pub async fn list_tags(&self, session: &Session) -> Result<Vec<Tag>> {
        Ok(self.storage.find_all_tags(session).await?)
    }

    /// Get a single tag
    pub async fn get_tag(&self, session: &Session, tag_id: &Uuid) -> Result<Tag> {
        self.storage
            .find_single_tag_by_id(session, tag_id)
            .await?
            .ok_or(Error::NotFound("Tag not found"))
    }

    /// Create a tag
    pub async fn create_tag(&self, session: &Session, name: &str) -> Result<Tag> {
        let name = normalize_text(name).ok_or_else(|| Error::validation("Name is required"))?;

        let values = CreateTagValues {
            user: session,
            name: &name,
        };

        Ok(self.storage.create_tag(&values).await?)
    }

    /// Delete a tag, notes lose the tag
    pub async fn delete_tag(&self, session: &Session, tag_id: &Uuid) -> Result<()> {
        let tag = self.get_tag(session, tag_id).await?;

        Ok(self.storage.delete_tag(&tag).await?)
    }

    /// Fetch a note of the session user
    async fn fetch_note(&self, session: &Session, note_id: &Uuid) -> Result<Note> {
        self.storage
            .find_single_note_by_id(session, note_id)
            .await?
            .ok_or(Error::NotFound("Note not found"))
    }

    /// IDs of the notes with the tag, a tag of somebody else has no notes
    async fn find_note_ids_by_tag(&self, session: &Session, tag_id: &Uuid) -> Result<Vec<Uuid>> {
        match self.storage.find_single_tag_by_id(session, tag_id).await? {
            Some(tag) => Ok(self.storage.find_note_ids_by_tag(&tag).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Make sure the folder, if any, belongs to the session user
    async fn verify_folder(&self, session: &Session, folder_id: Option<&Uuid>) -> Result<()> {
        if let Some(folder_id) = folder_id {
            let folder = self
                .storage
                .find_single_folder_by_id(session, folder_id)
                .await?;

            if folder.is_none() {
                return Err(Error::validation("Unknown folder"));
            }
        }

        Ok(())
    }
}

/// IDs in order of first appearance, without repeats
fn unique(ids: &[Uuid]) -> Vec<Uuid> {
    let mut unique_ids = Vec::with_capacity(ids.len());

    for id in ids {
        if !unique_ids.contains(id) {
            unique_ids.push(*id);
        }
    }

    unique_ids
}

/// Refuse empty titles, before anything is sent to the storage
fn validate_title(title: &str) -> Result<()> {
    if is_valid_title(title) {
        Ok(())
    } else {
        Err(Error::validation("Title is required"))
    }
}
