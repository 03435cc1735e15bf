//! Folio Store - SQLite backend for folio-core repositories
//!
//! Provides:
//! - `SqliteExecutor`, the rusqlite implementation of `folio_core::Executor`
//! - Connection helpers and pragma setup
//! - TOML configuration
//! - `MetadataRegistry` and `EntityManager` for handing out repositories

pub mod config;
pub mod db;
pub mod errors;
pub mod executor;
pub mod manager;
pub mod registry;

// Re-export key types
pub use config::{DatabaseConfig, JournalMode, LoggingConfig, StoreConfig};
pub use errors::Result;
pub use executor::SqliteExecutor;
pub use manager::EntityManager;
pub use registry::MetadataRegistry;
