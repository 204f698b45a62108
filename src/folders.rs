//! Folders group notes, a note lives in at most one folder

use uuid::Uuid;

/// A folder of a user
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Folder {
    /// Folder ID
    pub id: Uuid,

    /// The ID of the owner
    pub user_id: Uuid,

    /// Display name
    pub name: String,
}
