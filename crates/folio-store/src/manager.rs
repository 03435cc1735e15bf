//! Entity manager
//!
//! Owns the SQLite executor, the event dispatcher and the metadata registry,
//! and hands out repositories that borrow all three.

use crate::config::StoreConfig;
use crate::db;
use crate::errors::Result;
use crate::executor::SqliteExecutor;
use crate::registry::MetadataRegistry;
use folio_core::events::{EventDispatcher, StorageEvent, StorageEventKind};
use folio_core::logging_facility;
use folio_core::model::{ClassMetadata, Entity};
use folio_core::Repository;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Repository factory over one connection
///
/// # Example
///
/// ```
/// use folio_core::{ClassMetadata, Entity, FieldType};
/// use folio_store::EntityManager;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Tag {
///     id: Option<i64>,
///     label: String,
/// }
///
/// impl Entity for Tag {
///     fn entity_name() -> &'static str {
///         "tag"
///     }
///     fn id(&self) -> Option<i64> {
///         self.id
///     }
///     fn set_id(&mut self, id: i64) {
///         self.id = Some(id);
///     }
/// }
///
/// let mut manager = EntityManager::open_in_memory().unwrap();
/// manager
///     .connection()
///     .execute_batch("CREATE TABLE tags (id INTEGER PRIMARY KEY, label TEXT NOT NULL)")
///     .unwrap();
/// manager
///     .register(ClassMetadata::new("tag", "tags").with_field("label", "label", FieldType::Text))
///     .unwrap();
///
/// let tags = manager.repository::<Tag>().unwrap();
/// let mut tag = Tag { id: None, label: "rust".into() };
/// tags.save(&mut tag).unwrap();
/// assert_eq!(tag.id, Some(1));
/// ```
#[derive(Debug)]
pub struct EntityManager {
    executor: SqliteExecutor,
    events: EventDispatcher,
    registry: MetadataRegistry,
}

impl EntityManager {
    pub fn new(conn: Connection) -> Self {
        Self {
            executor: SqliteExecutor::new(conn),
            events: EventDispatcher::new(),
            registry: MetadataRegistry::new(),
        }
    }

    /// Manager over a fresh in-memory database
    ///
    /// # Errors
    ///
    /// `Persistence` when SQLite cannot open the database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?))
    }

    /// Initialize logging and open the configured database
    ///
    /// # Errors
    ///
    /// `Persistence` when the database cannot be opened or configured.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        logging_facility::init(config.logging.profile);
        Ok(Self::new(db::open_with_config(&config.database)?))
    }

    /// Validate and register the metadata of one entity type
    ///
    /// # Errors
    ///
    /// Validation failures or an already registered entity name.
    pub fn register(&mut self, metadata: ClassMetadata) -> Result<()> {
        self.registry.register(metadata)
    }

    pub fn add_listener<F>(&mut self, kind: StorageEventKind, priority: i32, listener: F)
    where
        F: Fn(&mut StorageEvent<'_>) -> folio_core::Result<()> + Send + Sync + 'static,
    {
        self.events.add_listener(kind, priority, listener);
    }

    /// Repository for `E` with the default strategies
    ///
    /// # Errors
    ///
    /// `MissingMapping` when no metadata is registered for `E`.
    pub fn repository<E>(&self) -> Result<Repository<'_, E>>
    where
        E: Entity + Serialize + DeserializeOwned,
    {
        let metadata = self.registry.get_for::<E>()?;
        Ok(Repository::new(&self.executor, metadata, &self.events))
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    pub fn executor(&self) -> &SqliteExecutor {
        &self.executor
    }

    pub fn connection(&self) -> &Connection {
        self.executor.connection()
    }
}
