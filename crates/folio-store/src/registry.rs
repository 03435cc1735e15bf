//! Class metadata registry
//!
//! Holds one validated `ClassMetadata` per entity name.

use crate::errors::Result;
use folio_core::errors::{ExError, FolioError};
use folio_core::model::{ClassMetadata, Entity};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entries: BTreeMap<String, ClassMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store `metadata` under its entity name
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` or `DuplicateMapping` from validation, or
    /// `DuplicateMapping` when the entity name is already registered.
    pub fn register(&mut self, metadata: ClassMetadata) -> Result<()> {
        metadata.validate()?;

        let name = metadata.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(FolioError::MetadataAlreadyRegistered { entity: name }.into());
        }

        tracing::debug!(
            entity = %name,
            table = metadata.table_name(),
            fields = metadata.fields().len(),
            "metadata registered"
        );
        self.entries.insert(name, metadata);
        Ok(())
    }

    /// Metadata for an entity name
    ///
    /// # Errors
    ///
    /// `MissingMapping` when nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<&ClassMetadata> {
        self.entries.get(name).ok_or_else(|| {
            ExError::from(FolioError::MetadataNotFound {
                entity: name.to_string(),
            })
        })
    }

    /// Metadata for an entity type
    ///
    /// # Errors
    ///
    /// `MissingMapping` when the type's entity name is not registered.
    pub fn get_for<E: Entity>(&self) -> Result<&ClassMetadata> {
        self.get(E::entity_name())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
