//! Run-log schema management in an embedded SQLite database.
//!
//! When a database path is supplied, the fixed run-log schema is created
//! idempotently before the run is recorded. Schema setup is the whole of the
//! persistence step: row-level logging of the collected match data is an
//! explicitly unimplemented extension, so a populated database carries only
//! the tables. Persistence failures are reported by the caller and never
//! abort the run.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// DDL for the run-log schema. Idempotent; applied as one batch inside a
/// transaction so a failure leaves the database untouched.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS regex (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cli TEXT NOT NULL,
    compiled TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS file (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS regex_file (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    regex_id INTEGER NOT NULL,
    file_id INTEGER NOT NULL,
    FOREIGN KEY (regex_id) REFERENCES regex (id),
    FOREIGN KEY (file_id) REFERENCES file (id)
);

CREATE TABLE IF NOT EXISTS metadata (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    magic TEXT NOT NULL,
    atime TEXT NOT NULL,
    ctime TEXT NOT NULL,
    mtime TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    FOREIGN KEY (file_id) REFERENCES file (id)
);

CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    line INTEGER NOT NULL,
    "start" INTEGER NOT NULL,
    "end" INTEGER NOT NULL,
    file_id INTEGER NOT NULL,
    FOREIGN KEY (file_id) REFERENCES file (id)
);

CREATE TABLE IF NOT EXISTS run_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    epoch INTEGER NOT NULL,
    regex_id INTEGER NOT NULL,
    file_id INTEGER NOT NULL,
    metadata_id INTEGER NOT NULL,
    FOREIGN KEY (regex_id) REFERENCES regex (id),
    FOREIGN KEY (file_id) REFERENCES file (id),
    FOREIGN KEY (metadata_id) REFERENCES metadata (id)
);
"#;

/// Handle to the run-log database.
pub struct RunStore {
    conn: Connection,
}

impl RunStore {
    /// Opens (creating if necessary) the database at the given path, requests
    /// foreign-key enforcement, and ensures the run-log schema exists.
    ///
    /// Opening the same file twice is safe: the DDL is `IF NOT EXISTS`
    /// throughout, so no duplicate tables and no errors result.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema batch
    /// fails. On failure the whole batch is rolled back.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign key enforcement")?;

        let mut store = Self { conn };
        store.init_schema()?;

        Ok(store)
    }

    /// Applies the schema DDL inside a single transaction.
    fn init_schema(&mut self) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to begin schema transaction")?;
        tx.execute_batch(SCHEMA)
            .context("Failed to create run-log schema")?;
        tx.commit().context("Failed to commit run-log schema")?;

        Ok(())
    }

    /// Names of the user tables currently in the database, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .context("Failed to query schema tables")?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("Failed to list schema tables")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read schema table names")?;

        Ok(names)
    }

    /// Whether foreign-key enforcement is active on this connection.
    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        let enabled: i64 = self
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .context("Failed to read foreign_keys pragma")?;

        Ok(enabled == 1)
    }
}
