//! Entity-to-statement field mapping

use crate::errors::{FolioError, Result};
use crate::mapping::convert::json_to_column;
use crate::model::{ClassMetadata, Entity, Value};
use crate::query::{QueryBuilder, QueryKind};
use serde::Serialize;

/// Writes an entity's column assignments onto an insert or update statement
///
/// Persisters only shape `query`; the repository executes it.
pub trait Persister<E> {
    fn persist(&self, query: &mut QueryBuilder, entity: &E, metadata: &ClassMetadata)
        -> Result<()>;
}

/// Default persister: serializes the entity and binds one named parameter
/// per mapped column
///
/// The identifier is written only by inserts of entities that already carry
/// one; updates never SET the identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldPersister;

impl<E: Entity + Serialize> Persister<E> for FieldPersister {
    fn persist(
        &self,
        query: &mut QueryBuilder,
        entity: &E,
        metadata: &ClassMetadata,
    ) -> Result<()> {
        let kind = query.kind();
        if !matches!(kind, QueryKind::Insert | QueryKind::Update) {
            return Err(FolioError::MissingTable {
                statement: kind.as_str().to_string(),
            }
            .into());
        }

        let serialized = serde_json::to_value(entity).map_err(|e| FolioError::SerializationFailed {
            entity: metadata.name().to_string(),
            reason: e.to_string(),
        })?;
        let object = serialized
            .as_object()
            .ok_or_else(|| FolioError::SerializationFailed {
                entity: metadata.name().to_string(),
                reason: "entity does not serialize to a map".to_string(),
            })?;

        if kind == QueryKind::Insert {
            if let Some(id) = entity.id() {
                bind(query, &metadata.identifier().column, Value::Integer(id));
            }
        }

        for mapping in metadata.fields() {
            let json = object.get(&mapping.field).unwrap_or(&serde_json::Value::Null);
            let value = json_to_column(json, mapping, metadata)?;
            bind(query, &mapping.column, value);
        }
        Ok(())
    }
}

fn bind(query: &mut QueryBuilder, column: &str, value: Value) {
    let placeholder = format!(":{}", column);
    match query.kind() {
        QueryKind::Insert => query.set_value(column, placeholder),
        _ => query.set(column, placeholder),
    };
    query.set_parameter(column, value);
}
