//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use sqlx::QueryBuilder;
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
use super::NoteQuery;
use super::Result;
use super::Storage;
use super::UpdateNoteValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone, Debug)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage from a connection string
    ///
    /// Migrations will be run
    pub async fn connect(database_connection_string: &str) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_connection_string)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Connection(format!("Migrations could not run: {err}")))?;

        Ok(Self { connection_pool })
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE email = $1
            LIMIT 1
            ",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_user(&self, values: &CreateUserValues) -> Result<User> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, session_id, email, hashed_password)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.session_id)
        .bind(values.email)
        .bind(values.hashed_password)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn rotate_session(&self, user: &User, session_id: &Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET session_id = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *
            ",
        )
        .bind(session_id)
        .bind(user.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_all_folders(&self, user: &User) -> Result<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            r"
            SELECT id, user_id, name
            FROM folders
            WHERE user_id = $1
            ORDER BY name
            ",
        )
        .bind(user.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_folder_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            r"
            SELECT id, user_id, name
            FROM folders
            WHERE user_id = $1 AND id = $2
            LIMIT 1
            ",
        )
        .bind(user.id)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_folder(&self, values: &CreateFolderValues) -> Result<Folder> {
        sqlx::query_as::<_, Folder>(
            r"
            INSERT INTO folders (id, user_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.user.id)
        .bind(values.name)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_folder(&self, folder: &Folder) -> Result<()> {
        // notes are detached by `ON DELETE SET NULL`
        sqlx::query(
            r"
            DELETE FROM folders
            WHERE id = $1
            ",
        )
        .bind(folder.id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }

    async fn find_all_tags(&self, user: &User) -> Result<Vec<Tag>> {
        sqlx::query_as::<_, Tag>(
            r"
            SELECT id, user_id, name
            FROM tags
            WHERE user_id = $1
            ORDER BY name
            ",
        )
        .bind(user.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_tags_by_ids(&self, user: &User, ids: &[Uuid]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Tag>(
            r"
            SELECT id, user_id, name
            FROM tags
            WHERE user_id = $1 AND id = ANY($2)
            ORDER BY name
            ",
        )
        .bind(user.id)
        .bind(ids)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_tag_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Tag>> {
        sqlx::query_as::<_, Tag>(
            r"
            SELECT id, user_id, name
            FROM tags
            WHERE user_id = $1 AND id = $2
            LIMIT 1
            ",
        )
        .bind(user.id)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_tag(&self, values: &CreateTagValues) -> Result<Tag> {
        sqlx::query_as::<_, Tag>(
            r"
            INSERT INTO tags (id, user_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.user.id)
        .bind(values.name)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_tag(&self, tag: &Tag) -> Result<()> {
        // links are removed by `ON DELETE CASCADE`
        sqlx::query(
            r"
            DELETE FROM tags
            WHERE id = $1
            ",
        )
        .bind(tag.id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }

    async fn find_notes(&self, user: &User, query: &NoteQuery) -> Result<Vec<Note>> {
        let mut builder = QueryBuilder::<sqlx::Postgres>::new(
            "SELECT * FROM notes WHERE user_id = ",
        );
        builder.push_bind(user.id);

        if let Some(folder_id) = query.folder_id {
            builder.push(" AND folder_id = ").push_bind(folder_id);
        }

        if let Some(note_ids) = &query.note_ids {
            builder
                .push(" AND id = ANY(")
                .push_bind(note_ids.clone())
                .push(")");
        }

        if query.favorites_only {
            builder.push(" AND is_favorite");
        }

        if let Some(search) = &query.search {
            let pattern = format!("%{}%", escape_like(search));

            builder
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR content ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder.push(" ORDER BY updated_at DESC, created_at DESC");

        builder
            .build_query_as::<Note>()
            .fetch_all(&self.connection_pool)
            .await
            .map_err(connection_error)
    }

    async fn find_single_note_by_id(&self, user: &User, id: &Uuid) -> Result<Option<Note>> {
        sqlx::query_as::<_, Note>(
            r"
            SELECT *
            FROM notes
            WHERE user_id = $1 AND id = $2
            LIMIT 1
            ",
        )
        .bind(user.id)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note> {
        sqlx::query_as::<_, Note>(
            r"
            INSERT INTO notes (id, user_id, folder_id, title, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.user.id)
        .bind(values.folder_id)
        .bind(values.title)
        .bind(values.content)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn update_note(&self, note: &Note, values: &UpdateNoteValues) -> Result<Note> {
        sqlx::query_as::<_, Note>(
            r"
            UPDATE notes
            SET title = $1,
                content = $2,
                folder_id = $3,
                updated_at = GREATEST(LOCALTIMESTAMP, updated_at)
            WHERE id = $4
            RETURNING *
            ",
        )
        .bind(values.title)
        .bind(values.content)
        .bind(values.folder_id)
        .bind(note.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn set_favorite(&self, note: &Note, is_favorite: bool) -> Result<Note> {
        sqlx::query_as::<_, Note>(
            r"
            UPDATE notes
            SET is_favorite = $1
            WHERE id = $2
            RETURNING *
            ",
        )
        .bind(is_favorite)
        .bind(note.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_note(&self, note: &Note) -> Result<()> {
        // links are removed by `ON DELETE CASCADE`
        sqlx::query(
            r"
            DELETE FROM notes
            WHERE id = $1
            ",
        )
        .bind(note.id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }

    async fn find_note_ids_by_tag(&self, tag: &Tag) -> Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            r"
            SELECT note_id
            FROM note_tags
            WHERE tag_id = $1
            ",
        )
        .bind(tag.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_tags_by_note(&self, note: &Note) -> Result<Vec<Tag>> {
        sqlx::query_as::<_, Tag>(
            r"
            SELECT tags.id, tags.user_id, tags.name
            FROM note_tags
            INNER JOIN tags ON tags.id = note_tags.tag_id
            WHERE note_tags.note_id = $1
            ORDER BY tags.name
            ",
        )
        .bind(note.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn replace_note_tags(&self, note: &Note, tag_ids: &[Uuid]) -> Result<()> {
        let mut transaction = self
            .connection_pool
            .begin()
            .await
            .map_err(connection_error)?;

        sqlx::query(
            r"
            DELETE FROM note_tags
            WHERE note_id = $1
            ",
        )
        .bind(note.id)
        .execute(&mut *transaction)
        .await
        .map_err(connection_error)?;

        if !tag_ids.is_empty() {
            sqlx::query(
                r"
                INSERT INTO note_tags (note_id, tag_id)
                SELECT $1, tag_id
                FROM UNNEST($2::uuid[]) AS tag_id
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(note.id)
            .bind(tag_ids)
            .execute(&mut *transaction)
            .await
            .map_err(connection_error)?;
        }

        transaction.commit().await.map_err(connection_error)
    }
}

/// Convert `SQLx` to storage error
///
/// Refused writes are reported as constraint violations, everything else as connection error
fn connection_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(database_error) = &err {
        if database_error.is_unique_violation()
            || database_error.is_foreign_key_violation()
            || database_error.is_check_violation()
        {
            return Error::Constraint(database_error.message().to_string());
        }
    }

    Error::Connection(err.to_string())
}

/// Escape the wildcards of a `LIKE` pattern
fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());

    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }

        escaped.push(ch);
    }

    escaped
}
