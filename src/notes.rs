//! Notes, the Markdown documents users write

use chrono::naive::NaiveDateTime;
use uuid::Uuid;

/// Maximum amount of characters in a note preview
const PREVIEW_LENGTH: usize = 100;

/// A single Markdown note
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Note {
    /// Note ID
    pub id: Uuid,

    /// The ID of the owner
    pub user_id: Uuid,

    /// Optional folder the note lives in
    pub folder_id: Option<Uuid>,

    /// Title, never empty
    pub title: String,

    /// Markdown content, might be empty
    pub content: String,

    /// Marked as favorite
    pub is_favorite: bool,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last saved at
    pub updated_at: NaiveDateTime,
}

impl Note {
    /// Plain-ish preview of the content
    ///
    /// Markdown markers (`#`, `*` and backticks) are dropped and the preview is cut after
    /// [`PREVIEW_LENGTH`] characters, with an ellipsis when the content is longer
    pub fn preview(&self) -> String {
        let mut preview = self
            .content
            .chars()
            .filter(|ch| !matches!(ch, '#' | '*' | '`'))
            .take(PREVIEW_LENGTH)
            .collect::<String>();

        if self.content.chars().count() > PREVIEW_LENGTH {
            preview.push_str("...");
        }

        preview
    }
}

/// Is the title usable?
///
/// Whitespace-only titles count as empty
pub fn is_valid_title(title: &str) -> bool {
    !title.trim().is_empty()
}
