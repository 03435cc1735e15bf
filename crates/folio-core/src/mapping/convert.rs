//! Conversions between column values and serde's data model

use crate::errors::{FolioError, Result};
use crate::model::{ClassMetadata, FieldMapping, FieldType, Value};
use serde_json::Value as Json;

fn mismatch(metadata: &ClassMetadata, mapping: &FieldMapping) -> FolioError {
    FolioError::TypeMismatch {
        entity: metadata.name().to_string(),
        column: mapping.column.clone(),
        expected: mapping.field_type.name().to_string(),
    }
}

/// Column value to the JSON shape the entity deserializes from
pub(crate) fn column_to_json(
    value: &Value,
    mapping: &FieldMapping,
    metadata: &ClassMetadata,
) -> Result<Json> {
    let json = match (mapping.field_type, value) {
        (_, Value::Null) => Json::Null,
        (FieldType::Integer, Value::Integer(i)) => Json::from(*i),
        (FieldType::Float, Value::Integer(i)) => Json::from(*i as f64),
        (FieldType::Float, Value::Real(f)) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| mismatch(metadata, mapping))?,
        (FieldType::Text, Value::Text(s)) => Json::String(s.clone()),
        (FieldType::Boolean, Value::Integer(i)) => Json::Bool(*i != 0),
        (FieldType::Json, Value::Text(s)) => {
            serde_json::from_str(s).map_err(|_| mismatch(metadata, mapping))?
        }
        _ => return Err(mismatch(metadata, mapping).into()),
    };
    Ok(json)
}

/// Serialized entity field to the value bound for its column
pub(crate) fn json_to_column(
    json: &Json,
    mapping: &FieldMapping,
    metadata: &ClassMetadata,
) -> Result<Value> {
    let failed = || FolioError::SerializationFailed {
        entity: metadata.name().to_string(),
        reason: format!(
            "field {} does not serialize as {}",
            mapping.field,
            mapping.field_type.name()
        ),
    };

    let value = match (mapping.field_type, json) {
        (_, Json::Null) => Value::Null,
        (FieldType::Integer, Json::Number(n)) => Value::Integer(n.as_i64().ok_or_else(failed)?),
        (FieldType::Float, Json::Number(n)) => Value::Real(n.as_f64().ok_or_else(failed)?),
        (FieldType::Text, Json::String(s)) => Value::Text(s.clone()),
        (FieldType::Boolean, Json::Bool(b)) => Value::from(*b),
        (FieldType::Json, other) => Value::Text(other.to_string()),
        _ => return Err(failed().into()),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    fn meta() -> ClassMetadata {
        ClassMetadata::new("page", "pages")
    }

    #[test]
    fn test_boolean_round_trips_through_integer() {
        let mapping = FieldMapping::new("published", "is_published", FieldType::Boolean);
        let json = column_to_json(&Value::Integer(1), &mapping, &meta()).unwrap();
        assert_eq!(json, Json::Bool(true));
        let back = json_to_column(&json, &mapping, &meta()).unwrap();
        assert_eq!(back, Value::Integer(1));
    }

    #[test]
    fn test_json_field_is_stored_as_text() {
        let mapping = FieldMapping::new("tags", "tags", FieldType::Json);
        let value = json_to_column(&serde_json::json!(["a", "b"]), &mapping, &meta()).unwrap();
        assert_eq!(value, Value::Text("[\"a\",\"b\"]".to_string()));
    }

    #[test]
    fn test_text_in_integer_column_is_a_type_mismatch() {
        let mapping = FieldMapping::new("position", "position", FieldType::Integer);
        let err = column_to_json(&Value::Text("7".to_string()), &mapping, &meta()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Hydration);
        assert_eq!(err.column(), Some("position"));
    }

    #[test]
    fn test_float_field_rejects_string() {
        let mapping = FieldMapping::new("rating", "rating", FieldType::Float);
        let err = json_to_column(&Json::String("high".to_string()), &mapping, &meta()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }
}
