//! Read-query shaping

use crate::errors::Result;
use crate::model::ClassMetadata;
use crate::query::{validate_identifier, QueryBuilder};

/// Augments the base load query of a repository
///
/// The loader receives the builder the repository will execute and mutates
/// it in place: extra selects, joins, default filters.
pub trait Loader {
    fn load(&self, query: &mut QueryBuilder, metadata: &ClassMetadata) -> Result<()>;
}

/// Default loader: selects exactly the mapped columns, each aliased to its
/// own name so rows are keyed by column
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataLoader;

impl Loader for MetadataLoader {
    fn load(&self, query: &mut QueryBuilder, metadata: &ClassMetadata) -> Result<()> {
        let alias = validate_identifier(metadata.alias_name())?;
        let mut columns = Vec::new();
        for mapping in metadata.all_mappings() {
            let column = validate_identifier(&mapping.column)?;
            columns.push(format!("{}.{} AS {}", alias, column, column));
        }
        query.select(columns);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;

    #[test]
    fn test_selects_identifier_and_fields() {
        let meta = ClassMetadata::new("page", "pages")
            .with_alias("p")
            .with_field("title", "title", FieldType::Text);
        let mut qb = QueryBuilder::new();
        qb.select(["p.*"]).from("pages", "p");

        MetadataLoader.load(&mut qb, &meta).unwrap();

        assert_eq!(
            qb.get_sql().unwrap(),
            "SELECT p.id AS id, p.title AS title FROM pages p"
        );
    }
}
