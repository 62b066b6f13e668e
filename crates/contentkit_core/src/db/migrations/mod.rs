//! Document store schema history.
//!
//! # Responsibility
//! - Bring the `documents` table, its indexes and its triggers up to the
//!   version this build expects.
//!
//! # Invariants
//! - Versions start at 1 and strictly increase.
//! - Every pending script runs inside one transaction together with its
//!   `PRAGMA user_version` bump; a failing script leaves the file at the
//!   version it had before the open.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_documents.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_relation_index.sql"),
    },
];

/// Schema version written by this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Upgrades the document schema on `conn`, refusing files from newer builds.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_pending(conn, MIGRATIONS)
}

/// Reads the document schema version recorded on the connection.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn apply_pending(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    let current = schema_version(conn)?;
    let latest = migrations.last().map_or(0, |migration| migration.version);

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    let pending = migrations
        .iter()
        .filter(|migration| migration.version > current)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending {
        let script = format!(
            "{}\nPRAGMA user_version = {};",
            migration.sql, migration.version
        );
        tx.execute_batch(&script)
            .map_err(|source| DbError::Migration {
                version: migration.version,
                source,
            })?;
    }
    tx.commit()?;

    Ok(())
}
