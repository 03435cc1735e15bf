//! Equality criteria and single-column ordering for `find_by`

use crate::errors::Result;
use crate::model::{ClassMetadata, Value};
use crate::query::{validate_identifier, Order, QueryBuilder};
use std::collections::BTreeMap;

/// Prefix of every parameter bound by `Criteria::apply`
pub const CRITERIA_PARAM_PREFIX: &str = "__criteria_";

/// A set of `key = value` constraints joined with AND
///
/// Keys are entity field names or raw column names. They are kept sorted, so
/// the order in which they were added never changes the rendered SQL.
///
/// # Example
///
/// ```
/// use folio_core::query::Criteria;
///
/// let a = Criteria::new().with("status", "published").with("author_id", 7);
/// let b = Criteria::new().with("author_id", 7).with("status", "published");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Criteria {
    entries: BTreeMap<String, Value>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one predicate per key to `query`
    ///
    /// Each key becomes `alias.column = :__criteria_column`; a `Null` value
    /// becomes `alias.column IS NULL` since `= NULL` never matches in SQL.
    /// Parameters live under the `__criteria_` prefix so they never replace
    /// one a `Loader` bound. A field name and its column name are distinct
    /// keys; the second one for a column binds `:__criteria_column_2`.
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` when a key does not resolve to a plain column name.
    pub fn apply(&self, query: &mut QueryBuilder, metadata: &ClassMetadata) -> Result<()> {
        let alias = metadata.alias_name();
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for (key, value) in &self.entries {
            let column = validate_identifier(metadata.resolve_column(key))?;
            if value.is_null() {
                query.and_where(format!("{}.{} IS NULL", alias, column));
                continue;
            }
            let count = seen.entry(column).or_insert(0);
            *count += 1;
            let param = match *count {
                1 => format!("{}{}", CRITERIA_PARAM_PREFIX, column),
                n => format!("{}{}_{}", CRITERIA_PARAM_PREFIX, column, n),
            };
            query
                .and_where(format!("{}.{} = :{}", alias, column, param))
                .set_parameter(param, value.clone());
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut criteria = Criteria::new();
        for (k, v) in iter {
            criteria.insert(k, v);
        }
        criteria
    }
}

/// Single-column ordering for `find_by`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub key: String,
    pub order: Order,
}

impl OrderBy {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            order: Order::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            order: Order::Desc,
        }
    }

    /// Replace the ordering of `query` with this column
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` when the key does not resolve to a plain column name.
    pub fn apply(&self, query: &mut QueryBuilder, metadata: &ClassMetadata) -> Result<()> {
        let column = validate_identifier(metadata.resolve_column(&self.key))?;
        query.order_by(format!("{}.{}", metadata.alias_name(), column), self.order);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::model::FieldType;

    fn meta() -> ClassMetadata {
        ClassMetadata::new("page", "pages")
            .with_alias("p")
            .with_field("published", "is_published", FieldType::Boolean)
    }

    #[test]
    fn test_empty_criteria_adds_nothing() {
        let mut qb = QueryBuilder::new();
        qb.from("pages", "p");
        Criteria::new().apply(&mut qb, &meta()).unwrap();
        assert!(qb.conditions().is_empty());
        assert!(qb.parameters().is_empty());
    }

    #[test]
    fn test_field_names_resolve_to_columns() {
        let mut qb = QueryBuilder::new();
        Criteria::new()
            .with("published", true)
            .apply(&mut qb, &meta())
            .unwrap();
        assert_eq!(qb.conditions(), ["p.is_published = :__criteria_is_published"]);
        assert_eq!(
            qb.parameter("__criteria_is_published"),
            Some(&Value::Integer(1))
        );
    }

    #[test]
    fn test_criteria_keep_parameters_bound_by_loader() {
        let mut qb = QueryBuilder::new();
        qb.where_clause("p.is_published = :is_published")
            .set_parameter("is_published", true);
        Criteria::new()
            .with("published", false)
            .apply(&mut qb, &meta())
            .unwrap();

        assert_eq!(
            qb.conditions(),
            [
                "p.is_published = :is_published",
                "p.is_published = :__criteria_is_published"
            ]
        );
        assert_eq!(qb.parameter("is_published"), Some(&Value::Integer(1)));
        assert_eq!(
            qb.parameter("__criteria_is_published"),
            Some(&Value::Integer(0))
        );
    }

    #[test]
    fn test_field_and_column_keys_bind_separately() {
        let mut qb = QueryBuilder::new();
        Criteria::new()
            .with("published", true)
            .with("is_published", false)
            .apply(&mut qb, &meta())
            .unwrap();

        // BTreeMap order: "is_published" < "published"
        assert_eq!(
            qb.conditions(),
            [
                "p.is_published = :__criteria_is_published",
                "p.is_published = :__criteria_is_published_2"
            ]
        );
        assert_eq!(
            qb.parameter("__criteria_is_published"),
            Some(&Value::Integer(0))
        );
        assert_eq!(
            qb.parameter("__criteria_is_published_2"),
            Some(&Value::Integer(1))
        );
    }

    #[test]
    fn test_null_renders_is_null_without_parameter() {
        let mut qb = QueryBuilder::new();
        Criteria::new()
            .with("parent_id", Value::Null)
            .apply(&mut qb, &meta())
            .unwrap();
        assert_eq!(qb.conditions(), ["p.parent_id IS NULL"]);
        assert!(qb.parameters().is_empty());
    }

    #[test]
    fn test_unsafe_key_is_rejected() {
        let mut qb = QueryBuilder::new();
        let err = Criteria::new()
            .with("1=1 OR slug", "x")
            .apply(&mut qb, &meta())
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidIdentifier);
    }

    #[test]
    fn test_order_by_resolves_field_name() {
        let mut qb = QueryBuilder::new();
        qb.from("pages", "p");
        OrderBy::desc("published").apply(&mut qb, &meta()).unwrap();
        assert_eq!(
            qb.get_sql().unwrap(),
            "SELECT * FROM pages p ORDER BY p.is_published DESC"
        );
    }
}
