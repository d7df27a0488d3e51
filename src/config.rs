//! Runtime configuration. Defaults place everything under a dot-folder in the
//! user's home directory; environment variables override individual values.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".study-organizer";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "material.db";
/// Log file written next to the database.
const LOG_FILE_NAME: &str = "study-organizer.log";

pub const ENV_DB_PATH: &str = "STUDY_ORGANIZER_DB";
pub const ENV_SCHEMA_MODE: &str = "STUDY_ORGANIZER_SCHEMA";
pub const ENV_LOG_PATH: &str = "STUDY_ORGANIZER_LOG";

/// How schema initialization treats an existing database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaMode {
    /// Delete the file and recreate the tables from scratch.
    Reset,
    /// Create the tables only if they are missing.
    #[default]
    Preserve,
}

impl SchemaMode {
    /// Parse `reset` / `preserve`, ignoring case. Anything else yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "reset" => Some(SchemaMode::Reset),
            "preserve" => Some(SchemaMode::Preserve),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub schema_mode: SchemaMode,
    pub log_path: PathBuf,
}

impl Config {
    /// Defaults rooted at `~/.study-organizer`, then environment overrides.
    pub fn load() -> Result<Self> {
        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        let mut config = Self::in_dir(base_dirs.home_dir().join(DATA_DIR_NAME));
        config.apply_env_overrides();
        Ok(config)
    }

    /// Place the database and log file inside `dir` with the default schema mode.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            database_path: dir.join(DB_FILE_NAME),
            schema_mode: SchemaMode::default(),
            log_path: dir.join(LOG_FILE_NAME),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Invalid schema modes are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(mode) = lookup(ENV_SCHEMA_MODE).and_then(|m| SchemaMode::parse(&m)) {
            self.schema_mode = mode;
        }
        if let Some(path) = lookup(ENV_LOG_PATH).filter(|p| !p.trim().is_empty()) {
            self.log_path = PathBuf::from(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn in_dir_places_files_together() {
        let config = Config::in_dir("/tmp/study");
        assert_eq!(config.database_path, PathBuf::from("/tmp/study/material.db"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/study/study-organizer.log"));
        assert_eq!(config.schema_mode, SchemaMode::Preserve);
    }

    #[test]
    fn overrides_replace_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_DB_PATH, "/data/other.db"),
            (ENV_SCHEMA_MODE, "RESET"),
        ]);
        let mut config = Config::in_dir("/tmp/study");
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path, PathBuf::from("/data/other.db"));
        assert_eq!(config.schema_mode, SchemaMode::Reset);
        assert_eq!(config.log_path, PathBuf::from("/tmp/study/study-organizer.log"));
    }

    #[test]
    fn invalid_schema_mode_is_ignored() {
        let mut config = Config::in_dir("/tmp/study");
        config.apply_overrides(|key| (key == ENV_SCHEMA_MODE).then(|| "wipe".to_string()));
        assert_eq!(config.schema_mode, SchemaMode::Preserve);
    }
}
