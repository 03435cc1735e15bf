//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

use crate::config::DatabaseConfig;
use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open a SQLite database at the given path
///
/// # Errors
///
/// `Persistence` when SQLite fails to open the file.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
///
/// # Errors
///
/// `Persistence` when SQLite fails to allocate the database.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection with the default settings
///
/// Foreign keys on, WAL journal.
///
/// # Errors
///
/// `Persistence` when SQLite fails to apply a pragma.
pub fn configure(conn: &Connection) -> Result<()> {
    apply_pragmas(conn, &DatabaseConfig::default())
}

/// Open the database described by `config` and apply its pragmas
///
/// A config without `path` opens an in-memory database.
///
/// # Errors
///
/// `Persistence` when SQLite fails to open the file or apply a pragma.
pub fn open_with_config(config: &DatabaseConfig) -> Result<Connection> {
    let conn = match &config.path {
        Some(path) => open(path)?,
        None => open_in_memory()?,
    };
    apply_pragmas(&conn, config)?;

    tracing::debug!(
        path = ?config.path,
        journal_mode = config.journal_mode.as_str(),
        foreign_keys = config.foreign_keys,
        "database opened"
    );
    Ok(conn)
}

/// Apply foreign key, journal mode and busy timeout settings
///
/// # Errors
///
/// `Persistence` when SQLite fails to apply a setting.
pub fn apply_pragmas(conn: &Connection, config: &DatabaseConfig) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", config.foreign_keys)
        .map_err(from_rusqlite)?;

    // journal_mode reports the resulting mode as a row
    let _mode: String = conn
        .query_row(
            &format!("PRAGMA journal_mode = {}", config.journal_mode.as_str()),
            [],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(from_rusqlite)?;

    Ok(())
}
