//! Store configuration loaded from TOML
//!
//! Every key is optional:
//!
//! ```toml
//! [database]
//! path = "content.db"
//! foreign_keys = true
//! journal_mode = "wal"
//! busy_timeout_ms = 5000
//!
//! [logging]
//! profile = "production"
//! ```

use crate::errors::{config_error, io_error, Result};
use folio_core::logging_facility::Profile;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file; `None` opens an in-memory database
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,

    #[serde(default)]
    pub journal_mode: JournalMode,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            foreign_keys: default_foreign_keys(),
            journal_mode: JournalMode::default(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_foreign_keys() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// SQLite `journal_mode` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    #[default]
    Wal,
    Off,
}

impl JournalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Memory => "MEMORY",
            JournalMode::Wal => "WAL",
            JournalMode::Off => "OFF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub profile: Profile,
}

impl StoreConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Config` when the document is not valid TOML or carries
    /// unknown keys or values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| config_error(e.to_string()))
    }

    /// Read and parse a TOML file
    ///
    /// A relative `database.path` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Io` when the file cannot be read, `ExErrorKind::Config`
    /// when it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| io_error("load_config", e))?;
        let mut config = Self::from_toml_str(&source)?;

        if let (Some(db_path), Some(dir)) = (&config.database.path, path.parent()) {
            if db_path.is_relative() {
                config.database.path = Some(dir.join(db_path));
            }
        }

        tracing::debug!(path = %path.display(), "store config loaded");
        Ok(config)
    }
}
