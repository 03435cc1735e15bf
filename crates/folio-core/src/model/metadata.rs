//! Class metadata: the table/column/alias descriptor of an entity type

use crate::errors::{FolioError, Result};
use crate::query::validate_identifier;
use std::collections::HashSet;

/// Storage type of a mapped field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Float,
    Text,
    /// Stored as 0/1
    Boolean,
    /// Stored as serialized JSON text
    Json,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::Json => "json",
        }
    }
}

/// Maps one entity field onto one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub field: String,
    pub column: String,
    pub field_type: FieldType,
}

impl FieldMapping {
    pub fn new(field: impl Into<String>, column: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            column: column.into(),
            field_type,
        }
    }
}

/// External descriptor of an entity's table, alias and field mappings
///
/// Repositories only read metadata. One instance may back any number of
/// repositories.
///
/// # Example
///
/// ```
/// use folio_core::model::{ClassMetadata, FieldType};
///
/// let meta = ClassMetadata::new("page", "pages")
///     .with_alias("p")
///     .with_field("title", "title", FieldType::Text)
///     .with_field("published", "is_published", FieldType::Boolean);
///
/// assert_eq!(meta.table_name(), "pages");
/// assert_eq!(meta.alias_name(), "p");
/// assert_eq!(meta.column_for("published"), Some("is_published"));
/// assert!(meta.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetadata {
    name: String,
    table_name: String,
    alias_name: String,
    identifier: FieldMapping,
    fields: Vec<FieldMapping>,
}

impl ClassMetadata {
    /// Metadata with alias equal to the table name and an `id` identifier
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        Self {
            name: name.into(),
            alias_name: table_name.clone(),
            table_name,
            identifier: FieldMapping::new("id", "id", FieldType::Integer),
            fields: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias_name = alias.into();
        self
    }

    pub fn with_identifier(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.identifier = FieldMapping::new(field, column, FieldType::Integer);
        self
    }

    pub fn with_field(
        mut self,
        field: impl Into<String>,
        column: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        self.fields.push(FieldMapping::new(field, column, field_type));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn alias_name(&self) -> &str {
        &self.alias_name
    }

    pub fn identifier(&self) -> &FieldMapping {
        &self.identifier
    }

    /// Non-identifier field mappings in declaration order
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Identifier first, then the declared fields
    pub fn all_mappings(&self) -> impl Iterator<Item = &FieldMapping> {
        std::iter::once(&self.identifier).chain(self.fields.iter())
    }

    /// Column mapped to `field`, including the identifier
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.all_mappings()
            .find(|m| m.field == field)
            .map(|m| m.column.as_str())
    }

    /// Resolve a criteria key: a mapped field name wins, otherwise the key is
    /// taken as a column name
    pub fn resolve_column<'a>(&'a self, key: &'a str) -> &'a str {
        self.column_for(key).unwrap_or(key)
    }

    /// Check that every name is a plain SQL identifier and that no field or
    /// column is mapped twice
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` or `DuplicateMapping`.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table_name)?;
        validate_identifier(&self.alias_name)?;

        let mut fields = HashSet::new();
        let mut columns = HashSet::new();
        for mapping in self.all_mappings() {
            validate_identifier(&mapping.column)?;
            if !fields.insert(mapping.field.as_str()) {
                return Err(FolioError::DuplicateFieldMapping {
                    entity: self.name.clone(),
                    name: mapping.field.clone(),
                }
                .into());
            }
            if !columns.insert(mapping.column.as_str()) {
                return Err(FolioError::DuplicateFieldMapping {
                    entity: self.name.clone(),
                    name: mapping.column.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}
