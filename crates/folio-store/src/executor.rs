//! rusqlite implementation of the `Executor` seam

use crate::errors::{from_rusqlite, Result};
use folio_core::model::{Row, Value};
use folio_core::query::QueryBuilder;
use folio_core::Executor;
use rusqlite::types::{ToSql, Value as SqlValue, ValueRef};
use rusqlite::Connection;

/// Runs `QueryBuilder` statements on one SQLite connection
///
/// Parameters are bound by name (`:name`), so values never reach the SQL
/// text. Statements are prepared through the connection's statement cache.
#[derive(Debug)]
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// The underlying connection, for schema setup and raw queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl Executor for SqliteExecutor {
    fn fetch_all(&self, query: &QueryBuilder) -> Result<Vec<Row>> {
        let sql = query.get_sql()?;
        let params = bind_parameters(query);
        tracing::debug!(sql = %sql, param_count = params.len(), "fetch_all");

        let mut stmt = self.conn.prepare_cached(&sql).map_err(from_rusqlite)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let named = named_params(&params);
        let mut rows = stmt.query(named.as_slice()).map_err(from_rusqlite)?;

        let mut result = Vec::new();
        while let Some(sql_row) = rows.next().map_err(from_rusqlite)? {
            let mut row = Row::new();
            for (index, column) in columns.iter().enumerate() {
                let value = sql_row.get_ref(index).map_err(from_rusqlite)?;
                row.insert(column.clone(), from_sql(value));
            }
            result.push(row);
        }

        tracing::debug!(row_count = result.len(), "fetch_all done");
        Ok(result)
    }

    fn execute(&self, query: &QueryBuilder) -> Result<usize> {
        let sql = query.get_sql()?;
        let params = bind_parameters(query);
        tracing::debug!(sql = %sql, param_count = params.len(), "execute");

        let mut stmt = self.conn.prepare_cached(&sql).map_err(from_rusqlite)?;
        let named = named_params(&params);
        let affected = stmt.execute(named.as_slice()).map_err(from_rusqlite)?;

        tracing::debug!(affected, "execute done");
        Ok(affected)
    }

    fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

/// `(":name", value)` pairs for every builder parameter
fn bind_parameters(query: &QueryBuilder) -> Vec<(String, SqlValue)> {
    query
        .parameters()
        .iter()
        .map(|(name, value)| (format!(":{}", name), to_sql(value)))
        .collect()
}

fn named_params(params: &[(String, SqlValue)]) -> Vec<(&str, &dyn ToSql)> {
    params
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect()
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}
