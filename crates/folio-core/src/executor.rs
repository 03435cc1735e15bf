//! Seam between repositories and the database driver

use crate::errors::Result;
use crate::model::Row;
use crate::query::QueryBuilder;

/// Runs rendered statements against a connection
///
/// Implementations surface driver failures as `ExErrorKind::Persistence`
/// and must not retry or swallow them.
pub trait Executor {
    /// Run a select and collect every row
    fn fetch_all(&self, query: &QueryBuilder) -> Result<Vec<Row>>;

    /// Run an insert, update or delete and return the affected row count
    fn execute(&self, query: &QueryBuilder) -> Result<usize>;

    /// Identifier generated by the most recent successful insert
    fn last_insert_id(&self) -> i64;
}
