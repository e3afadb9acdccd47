//! Versioned schema migrations tracked in `PRAGMA user_version`.

pub mod v001_initial;
pub mod v002_fts;

use docweave_core::errors::StorageError;
use rusqlite::Connection;
use tracing::debug;

const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_initial::MIGRATION_SQL),
    (2, v002_fts::MIGRATION_SQL),
];

/// Latest schema version.
pub const LATEST_VERSION: u32 = 2;

/// Apply every migration newer than the database's current version.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StorageError::MigrationFailed {
            version: 0,
            reason: e.to_string(),
        })?;

    for &(version, sql) in MIGRATIONS {
        if version <= current {
            continue;
        }
        conn.execute_batch(sql)
            .and_then(|_| conn.pragma_update(None, "user_version", version))
            .map_err(|e| StorageError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        debug!(version, "applied migration");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let version: u32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, LATEST_VERSION);
    }
}
