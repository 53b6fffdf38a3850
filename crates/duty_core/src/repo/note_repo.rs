//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide `list_all`/`insert`/`update`/`delete` over the `notes` table.
//! - Own the store lifecycle (open, verify, close).
//!
//! # Invariants
//! - `list_all` is ordered by `done ASC, id DESC`, the same order as
//!   `model::note::display_order`.
//! - Ids come from `AUTOINCREMENT` and are never reused.
//! - Every call is a single autocommit statement, durable on return.

use crate::db::{close_db, open_db, open_db_in_memory, DbError};
use crate::model::note::{Note, NoteId, NoteValidationError};
use log::{debug, error};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const NOTES_TABLE: &str = "notes";
const NOTES_COLUMNS: [&str; 4] = ["id", "title", "body", "done"];

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    body,
    done
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for note store operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    /// Connection does not carry the expected table.
    MissingRequiredTable(&'static str),
    /// Table exists but lacks an expected column.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row violates the note shape.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "note store unavailable: missing table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "note store unavailable: table `{table}` has no column `{column}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store contract consumed by the interaction controller.
pub trait NoteRepository {
    /// Returns every note ordered by `done ASC, id DESC`.
    fn list_all(&self) -> RepoResult<Vec<Note>>;
    /// Writes a new row and returns its freshly assigned id.
    ///
    /// The incoming `note.id` is ignored.
    fn insert(&self, note: &Note) -> RepoResult<NoteId>;
    /// Overwrites the row with `note.id`; returns rows affected.
    fn update(&self, note: &Note) -> RepoResult<usize>;
    /// Removes the row with `note.id`; returns rows affected.
    fn delete(&self, note: &Note) -> RepoResult<usize>;
    /// Loads one note by id.
    fn get(&self, id: NoteId) -> RepoResult<Option<Note>>;
}

/// SQLite-backed note store. Owns its connection exclusively.
#[derive(Debug)]
pub struct SqliteNoteRepository {
    conn: Connection,
}

impl SqliteNoteRepository {
    /// Opens (creating if needed) a notes database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a volatile store that lives as long as this instance.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps a ready connection after checking the `notes` table shape.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Releases the underlying connection.
    pub fn close(self) -> RepoResult<()> {
        close_db(self.conn)?;
        Ok(())
    }

    /// Borrow of the raw connection for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn list_all(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY done ASC, id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        debug!(
            "event=note_list module=repo status=ok count={}",
            notes.len()
        );
        Ok(notes)
    }

    fn insert(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        let result = self.conn.execute(
            "INSERT INTO notes (title, body, done) VALUES (?1, ?2, ?3);",
            params![note.title.as_str(), note.body.as_str(), note.done],
        );
        if let Err(err) = result {
            error!("event=note_insert module=repo status=error error={err}");
            return Err(err.into());
        }

        let id = self.conn.last_insert_rowid();
        debug!("event=note_insert module=repo status=ok id={id}");
        Ok(id)
    }

    fn update(&self, note: &Note) -> RepoResult<usize> {
        note.validate()?;

        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?1,
                body = ?2,
                done = ?3
             WHERE id = ?4;",
            params![
                note.title.as_str(),
                note.body.as_str(),
                note.done,
                note.id
            ],
        )?;

        debug!(
            "event=note_update module=repo status=ok id={} rows={changed}",
            note.id
        );
        Ok(changed)
    }

    fn delete(&self, note: &Note) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [note.id])?;

        debug!(
            "event=note_delete module=repo status=ok id={} rows={changed}",
            note.id
        );
        Ok(changed)
    }

    fn get(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        rows.next()?.map(parse_note_row).transpose()
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        done: parse_done(row.get("done")?)?,
    })
}

fn parse_done(value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid done value `{other}` in notes.done"
        ))),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, NOTES_TABLE)? {
        return Err(RepoError::MissingRequiredTable(NOTES_TABLE));
    }

    for column in NOTES_COLUMNS {
        if !table_has_column(conn, NOTES_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: NOTES_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
