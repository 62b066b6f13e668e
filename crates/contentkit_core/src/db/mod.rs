//! Storage bootstrap for the document store.
//!
//! # Responsibility
//! - Hand out SQLite connections with the `documents` schema in place.
//! - Report bootstrap failures separately from document-level store errors.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - A connection returned by `open_db*` is at `migrations::latest_version()`;
//!   `SqliteDocumentStore::try_new` refuses any other.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Connection bootstrap failures. Fatal for the process opening the store.
#[derive(Debug)]
pub enum DbError {
    /// Opening the file or configuring the connection failed.
    Sqlite(rusqlite::Error),
    /// One migration script failed; the whole batch was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build of the document store.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Migration { version, source } => {
                write!(f, "document schema migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "document schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
