//! Row-to-entity conversion

use crate::errors::{FolioError, Result};
use crate::mapping::convert::column_to_json;
use crate::model::{ClassMetadata, Entity, Row};
use crate::query::QueryBuilder;
use serde::de::DeserializeOwned;

/// Builds an entity from one result row
///
/// Implementations must be pure: the same row, query and metadata always
/// produce the same entity, and nothing else is touched.
pub trait Hydrator<E> {
    fn hydrate(&self, row: &Row, query: &QueryBuilder, metadata: &ClassMetadata) -> Result<E>;
}

/// Default hydrator: reads every mapped column and deserializes the entity
/// from the resulting field map
///
/// Columns missing from the row read as null, so optional fields may be
/// left out of a custom select list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldHydrator;

impl<E: Entity + DeserializeOwned> Hydrator<E> for FieldHydrator {
    fn hydrate(&self, row: &Row, _query: &QueryBuilder, metadata: &ClassMetadata) -> Result<E> {
        let mut object = serde_json::Map::new();
        for mapping in metadata.all_mappings() {
            let value = row.value(&mapping.column);
            object.insert(
                mapping.field.clone(),
                column_to_json(&value, mapping, metadata)?,
            );
        }

        serde_json::from_value(serde_json::Value::Object(object)).map_err(|e| {
            FolioError::HydrationFailed {
                entity: metadata.name().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
