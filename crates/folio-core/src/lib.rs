//! Folio Core - entity mapping over a fluent query builder
//!
//! This crate provides the driver-independent half of Folio:
//! - `ClassMetadata` and the `Entity` contract
//! - A fluent `QueryBuilder` with equality `Criteria`
//! - Six storage lifecycle events and their dispatcher
//! - Injectable `Loader` / `Persister` / `Hydrator` strategies
//! - `Repository`, which runs them against any `Executor`
//!
//! The SQLite executor and configuration live in `folio-store`.

pub mod errors;
pub mod events;
pub mod executor;
pub mod logging_facility;
pub mod mapping;
pub mod model;
pub mod query;
pub mod repository;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, FolioError, Result};
pub use events::{EventDispatcher, StorageEvent, StorageEventKind, Subject};
pub use executor::Executor;
pub use mapping::{FieldHydrator, FieldPersister, Hydrator, Loader, MetadataLoader, Persister};
pub use model::{ClassMetadata, Entity, FieldMapping, FieldType, Row, Value};
pub use query::{Criteria, Order, OrderBy, QueryBuilder, QueryKind};
pub use repository::Repository;

#[doc(hidden)]
pub mod __private {
    pub use folio_core_types::schema;
    pub use tracing;
}
