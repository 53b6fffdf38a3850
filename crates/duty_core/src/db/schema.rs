//! Notes table bootstrap.
//!
//! # Invariants
//! - A fresh database is stamped with [`SCHEMA_VERSION`] in the same
//!   transaction that creates the table.
//! - A database stamped with another version is refused; nothing is ever
//!   migrated in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `PRAGMA user_version` written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const NOTES_SCHEMA_SQL: &str = include_str!("notes_schema.sql");

/// Creates the `notes` table on a fresh database, or checks the stamp on an
/// existing one.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    match found {
        SCHEMA_VERSION => Ok(()),
        0 => {
            let tx = conn.transaction()?;
            tx.execute_batch(NOTES_SCHEMA_SQL)?;
            tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
            tx.commit()?;
            info!("event=db_schema module=db status=ok version={SCHEMA_VERSION}");
            Ok(())
        }
        other => Err(DbError::UnsupportedSchemaVersion {
            db_version: other,
            latest_supported: SCHEMA_VERSION,
        }),
    }
}
