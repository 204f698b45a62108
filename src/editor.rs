//! Note editor
//!
//! Holds the pending edits of a single note and brings the storage in line with them on save.
//!
//! ```text
//! Loading --fetched--> Editing --save--> Saving --ok--> Saved
//!                         ^                 |
//!                         +-----failed------+
//! ```

use uuid::Uuid;

use crate::error::Error;
use crate::error::Result;
use crate::notes::is_valid_title;
use crate::repository::NoteFields;
use crate::repository::NoteRepository;
use crate::session::Session;
use crate::storage::Storage;

/// Where the editor is in its life
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    /// Fetching the existing note and its tags
    Loading,

    /// Local edits pending
    Editing,

    /// Writing the note and its tags
    Saving,

    /// Done, with the ID of the saved note
    Saved(Uuid),
}

/// What the editor takes care of
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorMode {
    /// Title, content, folder and tags
    Organized,

    /// Title and content only, never in a folder, tags untouched
    Dump,
}

/// The desired state of a note
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteDraft {
    /// Title, checked on save
    pub title: String,

    /// Markdown content
    pub content: String,

    /// Folder, ignored for dump notes
    pub folder_id: Option<Uuid>,

    /// All tags, ignored for dump notes
    pub tag_ids: Vec<Uuid>,
}

/// Editor of a single note, new or existing
pub struct NoteEditor<S: Storage> {
    repository: NoteRepository<S>,
    mode: EditorMode,
    state: EditorState,

    /// Known once the note exists in the storage
    note_id: Option<Uuid>,

    draft: NoteDraft,
}

impl<S: Storage> NoteEditor<S> {
    /// Editor for a new note
    pub fn new(repository: NoteRepository<S>, mode: EditorMode) -> Self {
        Self {
            repository,
            mode,
            state: EditorState::Editing,
            note_id: None,
            draft: NoteDraft::default(),
        }
    }

    /// Editor for an existing note
    ///
    /// Fails when the note can not be fetched, the editor never gets to editing then
    pub async fn open(
        repository: NoteRepository<S>,
        session: &Session,
        note_id: &Uuid,
        mode: EditorMode,
    ) -> Result<Self> {
        let mut editor = Self {
            repository,
            mode,
            state: EditorState::Loading,
            note_id: Some(*note_id),
            draft: NoteDraft::default(),
        };

        let details = editor.repository.get_note(session, note_id).await?;

        editor.draft = NoteDraft {
            title: details.note.title,
            content: details.note.content,
            folder_id: details.note.folder_id,
            tag_ids: details.tags.iter().map(|tag| tag.id).collect(),
        };
        editor.state = EditorState::Editing;

        Ok(editor)
    }

    /// Current state
    pub fn state(&self) -> EditorState {
        self.state
    }

    /// ID of the note, `None` until a new note is created
    pub fn note_id(&self) -> Option<Uuid> {
        self.note_id
    }

    /// The pending edits
    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    /// Replace the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    /// Replace the content
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    /// Move to a folder, `None` for no folder
    pub fn set_folder(&mut self, folder_id: Option<Uuid>) {
        self.draft.folder_id = folder_id;
    }

    /// Replace all tags
    pub fn set_tags(&mut self, tag_ids: Vec<Uuid>) {
        self.draft.tag_ids = tag_ids;
    }

    /// Add a tag, once
    pub fn add_tag(&mut self, tag_id: Uuid) {
        if !self.draft.tag_ids.contains(&tag_id) {
            self.draft.tag_ids.push(tag_id);
        }
    }

    /// Remove a tag, if present
    pub fn remove_tag(&mut self, tag_id: &Uuid) {
        self.draft.tag_ids.retain(|id| id != tag_id);
    }

    /// Save the draft
    ///
    /// On failure the editor is back to editing with the draft as it was. A new note that was
    /// created before the failure is updated on the next save, not created again.
    pub async fn save(&mut self, session: &Session) -> Result<Uuid> {
        if self.state != EditorState::Editing {
            return Err(Error::Conflict("Note is not being edited"));
        }

        if !is_valid_title(&self.draft.title) {
            return Err(Error::validation("Title is required"));
        }

        self.state = EditorState::Saving;

        match self.persist(session).await {
            Ok(note_id) => {
                self.state = EditorState::Saved(note_id);

                Ok(note_id)
            }
            Err(err) => {
                tracing::warn!("Could not save note: {err}");

                self.state = EditorState::Editing;

                Err(err)
            }
        }
    }

    async fn persist(&mut self, session: &Session) -> Result<Uuid> {
        let fields = NoteFields {
            title: &self.draft.title,
            content: &self.draft.content,
            folder_id: match self.mode {
                EditorMode::Organized => self.draft.folder_id,
                EditorMode::Dump => None,
            },
        };

        // refuse unknown tags before the note is written
        let tags = match self.mode {
            EditorMode::Organized => Some(
                self.repository
                    .verify_tags(session, &self.draft.tag_ids)
                    .await?,
            ),
            EditorMode::Dump => None,
        };

        let existing_id = self.note_id;

        let note = match existing_id {
            Some(note_id) => {
                self.repository
                    .update_note(session, &note_id, &fields)
                    .await?
            }
            None => {
                let note = self.repository.create_note(session, &fields).await?;

                // tags are linked to this ID, also when linking fails
                self.note_id = Some(note.id);

                note
            }
        };

        if let Some(tags) = tags {
            self.repository.link_tags(&note, &tags).await?;
        }

        Ok(note.id)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::CreateUserValues;
    use crate::storage::recording::Recording;

    use super::*;

    async fn setup() -> (NoteRepository<Recording>, Recording, Session) {
        let storage = Recording::new();

        let user = storage
            .create_user(&CreateUserValues {
                session_id: &Uuid::new_v4(),
                email: "someone@example.com",
                hashed_password: "hashed",
            })
            .await
            .unwrap();

        storage.clear();

        (NoteRepository::new(storage.clone()), storage, Session::new(user))
    }

    #[tokio::test]
    async fn test_create_note() {
        let (repository, storage, session) = setup().await;

        let errand = repository.create_tag(&session, "errand").await.unwrap();
        storage.clear();

        let mut editor = NoteEditor::new(repository.clone(), EditorMode::Organized);
        editor.set_title("Groceries");
        editor.set_content("milk, eggs");
        editor.add_tag(errand.id);
        editor.add_tag(errand.id);

        let note_id = editor.save(&session).await.unwrap();

        assert_eq!(EditorState::Saved(note_id), editor.state());
        assert_eq!(Some(note_id), editor.note_id());

        let calls = storage.calls();
        let created = calls.iter().position(|call| *call == "create_note").unwrap();
        let tagged = calls
            .iter()
            .position(|call| *call == "replace_note_tags")
            .unwrap();
        assert!(created < tagged);

        let details = repository.get_note(&session, &note_id).await.unwrap();
        assert_eq!("Groceries", details.note.title);
        assert_eq!(vec![errand], details.tags);
    }

    #[tokio::test]
    async fn test_save_calls_storage_once_per_step() {
        let (repository, storage, session) = setup().await;

        let errand = repository.create_tag(&session, "errand").await.unwrap();
        let work = repository.create_tag(&session, "work").await.unwrap();

        let mut editor = NoteEditor::new(repository.clone(), EditorMode::Organized);
        editor.set_title("Groceries");
        editor.set_tags(vec![errand.id]);
        let note_id = editor.save(&session).await.unwrap();

        let mut editor =
            NoteEditor::open(repository.clone(), &session, &note_id, EditorMode::Organized)
                .await
                .unwrap();
        editor.add_tag(work.id);

        storage.clear();
        editor.save(&session).await.unwrap();

        assert_eq!(
            vec![
                "find_tags_by_ids",
                "find_single_note_by_id",
                "update_note",
                "replace_note_tags",
            ],
            storage.calls()
        );
    }

    #[tokio::test]
    async fn test_save_with_empty_title() {
        let (repository, storage, session) = setup().await;

        let mut editor = NoteEditor::new(repository, EditorMode::Organized);
        editor.set_title(" ");
        editor.set_content("milk, eggs");

        let result = editor.save(&session).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(EditorState::Editing, editor.state());
        assert!(storage.calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_twice() {
        let (repository, _, session) = setup().await;

        let mut editor = NoteEditor::new(repository.clone(), EditorMode::Organized);
        editor.set_title("Groceries");
        editor.save(&session).await.unwrap();

        let result = editor.save(&session).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_last_save_wins() {
        let (repository, _, session) = setup().await;

        let home = repository.create_folder(&session, "Home").await.unwrap();
        let errand = repository.create_tag(&session, "errand").await.unwrap();
        let work = repository.create_tag(&session, "work").await.unwrap();

        let mut editor = NoteEditor::new(repository.clone(), EditorMode::Organized);
        editor.set_title("T1");
        editor.set_folder(Some(home.id));
        editor.set_tags(vec![errand.id]);
        let note_id = editor.save(&session).await.unwrap();

        let mut editor =
            NoteEditor::open(repository.clone(), &session, &note_id, EditorMode::Organized)
                .await
                .unwrap();
        assert_eq!("T1", editor.draft().title);
        assert_eq!(Some(home.id), editor.draft().folder_id);
        assert_eq!(vec![errand.id], editor.draft().tag_ids);

        editor.set_title("T2");
        editor.set_folder(None);
        editor.remove_tag(&errand.id);
        editor.add_tag(work.id);
        editor.save(&session).await.unwrap();

        let details = repository.get_note(&session, &note_id).await.unwrap();
        assert_eq!("T2", details.note.title);
        assert_eq!(None, details.folder);
        assert_eq!(vec![work], details.tags);
    }

    #[tokio::test]
    async fn test_open_unknown_note() {
        let (repository, _, session) = setup().await;

        let result = NoteEditor::open(
            repository,
            &session,
            &Uuid::new_v4(),
            EditorMode::Organized,
        )
        .await;

        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits() {
        let (repository, storage, session) = setup().await;

        let mut editor = NoteEditor::new(repository.clone(), EditorMode::Organized);
        editor.set_title("Groceries");
        let note_id = editor.save(&session).await.unwrap();

        let mut editor =
            NoteEditor::open(repository.clone(), &session, &note_id, EditorMode::Organized)
                .await
                .unwrap();
        editor.set_title("Groceries for the week");
        editor.set_content("milk, eggs, bread");

        storage.fail_on("update_note");

        let result = editor.save(&session).await;
        assert!(matches!(result, Err(Error::Backend(_))));
        assert_eq!(EditorState::Editing, editor.state());
        assert_eq!("Groceries for the week", editor.draft().title);
        assert_eq!("milk, eggs, bread", editor.draft().content);

        storage.recover();

        editor.save(&session).await.unwrap();

        let details = repository.get_note(&session, &note_id).await.unwrap();
        assert_eq!("Groceries for the week", details.note.title);
    }

    #[tokio::test]
    async fn test_failed_tags_after_create() {
        let (repository, storage, session) = setup().await;

        let errand = repository.create_tag(&session, "errand").await.unwrap();

        let mut editor = NoteEditor::new(repository.clone(), EditorMode::Organized);
        editor.set_title("Groceries");
        editor.set_tags(vec![errand.id]);

        storage.fail_on("replace_note_tags");

        assert!(editor.save(&session).await.is_err());
        assert_eq!(EditorState::Editing, editor.state());
        let note_id = editor.note_id().unwrap();

        storage.recover();
        storage.clear();

        assert_eq!(note_id, editor.save(&session).await.unwrap());
        assert_eq!(0, storage.count("create_note"));
        assert_eq!(1, storage.count("update_note"));

        let notes = repository
            .list_notes(&session, &crate::repository::NoteFilter::All)
            .await
            .unwrap();
        assert_eq!(1, notes.len());
    }

    #[tokio::test]
    async fn test_unknown_tag_writes_nothing() {
        let (repository, storage, session) = setup().await;

        let mut editor = NoteEditor::new(repository, EditorMode::Organized);
        editor.set_title("Groceries");
        editor.add_tag(Uuid::new_v4());

        let result = editor.save(&session).await;

        assert!(matches!(result, Err(Error::Validation(message)) if message == "Unknown tag"));
        assert_eq!(None, editor.note_id());
        assert_eq!(0, storage.count("create_note"));
    }

    #[tokio::test]
    async fn test_dump_note() {
        let (repository, storage, session) = setup().await;

        let home = repository.create_folder(&session, "Home").await.unwrap();
        let errand = repository.create_tag(&session, "errand").await.unwrap();
        storage.clear();

        let mut editor = NoteEditor::new(repository.clone(), EditorMode::Dump);
        editor.set_title("Thoughts");
        editor.set_content("Just dumping this here");
        editor.set_folder(Some(home.id));
        editor.set_tags(vec![errand.id]);

        let note_id = editor.save(&session).await.unwrap();

        assert_eq!(0, storage.count("replace_note_tags"));
        assert_eq!(0, storage.count("find_tags_by_ids"));

        let details = repository.get_note(&session, &note_id).await.unwrap();
        assert_eq!(None, details.note.folder_id);
        assert!(details.tags.is_empty());
    }
}
