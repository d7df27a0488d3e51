use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::config::{Config, SchemaMode};

/// Table definitions, created in order. The content table cascades on subject
/// deletion, but `delete_subject` also removes content rows explicitly.
const SCHEMA: &[(&str, &str)] = &[
    (
        "subjects",
        "CREATE TABLE IF NOT EXISTS subjects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            module TEXT NOT NULL,
            status TEXT NOT NULL
        )",
    ),
    (
        "content_items",
        "CREATE TABLE IF NOT EXISTS content_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            name TEXT NOT NULL,
            path TEXT NOT NULL DEFAULT '',
            is_divider INTEGER NOT NULL DEFAULT 0,
            order_rank INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(subject_id) REFERENCES subjects(id) ON DELETE CASCADE
        )",
    ),
    (
        "content_items_order_idx",
        "CREATE INDEX IF NOT EXISTS content_items_order_idx
            ON content_items (subject_id, category, order_rank)",
    ),
];

/// Handle on the SQLite file. It only remembers where the file lives; each
/// operation opens and drops its own connection.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Prepare the database file and create the schema.
    ///
    /// Failing to create the data directory or to remove the file in
    /// [`SchemaMode::Reset`] is fatal. Failures while creating tables are
    /// logged and swallowed; the first real operation will surface them again.
    pub fn initialize(path: impl Into<PathBuf>, mode: SchemaMode) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }

        if mode == SchemaMode::Reset {
            match fs::remove_file(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "removed existing database"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err).context("failed to remove existing database");
                }
            }
        }

        let store = Self { path };
        store.create_tables();
        Ok(store)
    }

    /// Build the store described by the runtime configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::initialize(&config.database_path, config.schema_mode)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection with foreign keys enforced.
    pub fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).context("failed to open SQLite database")?;
        conn.execute("PRAGMA foreign_keys = ON", [])
            .context("failed to enable foreign keys")?;
        Ok(conn)
    }

    /// Run one store operation on its own connection. Errors are logged here
    /// and handed back to the caller unchanged.
    ///
    /// Every public `Store` method funnels through this, so each failure lands
    /// in the log file once with the operation name attached, while the UI
    /// still gets the full context chain to show in its status bar. The
    /// connection is dropped when `f` returns; nothing is held between calls.
    pub(crate) fn run<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let result = self.connect().and_then(|mut conn| f(&mut conn));
        if let Err(err) = &result {
            tracing::error!(operation, error = %format!("{err:#}"), "store operation failed");
        }
        result
    }

    fn create_tables(&self) {
        let conn = match self.connect() {
            Ok(conn) => conn,
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "schema setup could not connect");
                return;
            }
        };

        for (name, sql) in SCHEMA {
            if let Err(err) = conn.execute(sql, []) {
                tracing::error!(object = name, error = %err, "failed to create schema object");
            }
        }
        tracing::debug!(path = %self.path.display(), "schema ready");
    }
}
