//! Mapping strategies
//!
//! A repository delegates three concerns to injectable strategies:
//!
//! - [`Loader`] shapes the read query (selects, joins, filters)
//! - [`Persister`] writes entity fields onto an insert or update statement
//! - [`Hydrator`] turns a result row into an entity
//!
//! The defaults are driven purely by `ClassMetadata` and use serde to move
//! field values in and out of the entity.

mod convert;
pub mod hydrator;
pub mod loader;
pub mod persister;

pub use hydrator::{FieldHydrator, Hydrator};
pub use loader::{Loader, MetadataLoader};
pub use persister::{FieldPersister, Persister};
