//! SQL query builder
//!
//! A mutable, chainable builder in the style of `std::process::Command`:
//! every setter takes `&mut self` and returns `&mut Self`, so a loader or
//! persister can shape the very builder the repository later executes.
//!
//! # Example
//!
//! ```
//! use folio_core::query::{Order, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(["p.*"])
//!     .from("pages", "p")
//!     .where_clause("p.status = :status")
//!     .set_parameter("status", "published")
//!     .order_by("p.title", Order::Asc)
//!     .set_max_results(10);
//!
//! assert_eq!(
//!     qb.get_sql().unwrap(),
//!     "SELECT p.* FROM pages p WHERE p.status = :status ORDER BY p.title ASC LIMIT 10"
//! );
//! ```

use crate::errors::{ExError, ExErrorKind, FolioError, Result};
use crate::executor::Executor;
use crate::model::{Row, Value};
use crate::query::validate_identifier;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Statement type the builder renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl FromStr for Order {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Order::Asc),
            "DESC" => Ok(Order::Desc),
            _ => Err(ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Unknown sort direction: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    kind: JoinKind,
    table: String,
    alias: String,
    condition: String,
}

/// Fluent SQL builder for select, insert, update and delete statements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryBuilder {
    kind: QueryKind,
    select: Vec<String>,
    from: Option<(String, String)>,
    joins: Vec<Join>,
    target: Option<String>,
    assignments: Vec<(String, String)>,
    conditions: Vec<String>,
    order_by: Vec<(String, Order)>,
    max_results: Option<u64>,
    first_result: Option<u64>,
    parameters: BTreeMap<String, Value>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    // ---------- SELECT ----------

    /// Replace the select list
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind = QueryKind::Select;
        self.select = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append to the select list
    pub fn add_select(&mut self, column: impl Into<String>) -> &mut Self {
        self.kind = QueryKind::Select;
        self.select.push(column.into());
        self
    }

    pub fn select_list(&self) -> &[String] {
        &self.select
    }

    pub fn from(&mut self, table: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.from = Some((table.into(), alias.into()));
        self
    }

    /// Table and alias of the FROM clause
    pub fn from_clause(&self) -> Option<(&str, &str)> {
        self.from.as_ref().map(|(t, a)| (t.as_str(), a.as_str()))
    }

    pub fn inner_join(
        &mut self,
        table: impl Into<String>,
        alias: impl Into<String>,
        condition: impl Into<String>,
    ) -> &mut Self {
        self.join(JoinKind::Inner, table, alias, condition)
    }

    pub fn left_join(
        &mut self,
        table: impl Into<String>,
        alias: impl Into<String>,
        condition: impl Into<String>,
    ) -> &mut Self {
        self.join(JoinKind::Left, table, alias, condition)
    }

    fn join(
        &mut self,
        kind: JoinKind,
        table: impl Into<String>,
        alias: impl Into<String>,
        condition: impl Into<String>,
    ) -> &mut Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            alias: alias.into(),
            condition: condition.into(),
        });
        self
    }

    // ---------- write statements ----------

    pub fn insert(&mut self, table: impl Into<String>) -> &mut Self {
        self.kind = QueryKind::Insert;
        self.target = Some(table.into());
        self
    }

    pub fn update(&mut self, table: impl Into<String>) -> &mut Self {
        self.kind = QueryKind::Update;
        self.target = Some(table.into());
        self
    }

    pub fn delete(&mut self, table: impl Into<String>) -> &mut Self {
        self.kind = QueryKind::Delete;
        self.target = Some(table.into());
        self
    }

    /// Target table of an insert, update or delete
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// `column = expression` in an UPDATE's SET list
    pub fn set(&mut self, column: impl Into<String>, expression: impl Into<String>) -> &mut Self {
        self.assign(column.into(), expression.into())
    }

    /// Column and value expression of an INSERT
    pub fn set_value(
        &mut self,
        column: impl Into<String>,
        expression: impl Into<String>,
    ) -> &mut Self {
        self.assign(column.into(), expression.into())
    }

    fn assign(&mut self, column: String, expression: String) -> &mut Self {
        match self.assignments.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = expression,
            None => self.assignments.push((column, expression)),
        }
        self
    }

    /// Column assignments in the order they were first set
    pub fn assignments(&self) -> &[(String, String)] {
        &self.assignments
    }

    // ---------- filtering ----------

    /// Replace all conditions with `condition`
    pub fn where_clause(&mut self, condition: impl Into<String>) -> &mut Self {
        self.conditions = vec![condition.into()];
        self
    }

    /// Add a condition joined with AND
    ///
    /// Conditions are rendered verbatim; parenthesize any that contain OR.
    pub fn and_where(&mut self, condition: impl Into<String>) -> &mut Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// Bind `value` to `:name`
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    // ---------- ordering and paging ----------

    /// Replace the ordering
    pub fn order_by(&mut self, column: impl Into<String>, order: Order) -> &mut Self {
        self.order_by = vec![(column.into(), order)];
        self
    }

    pub fn add_order_by(&mut self, column: impl Into<String>, order: Order) -> &mut Self {
        self.order_by.push((column.into(), order));
        self
    }

    pub fn set_max_results(&mut self, max: u64) -> &mut Self {
        self.max_results = Some(max);
        self
    }

    pub fn max_results(&self) -> Option<u64> {
        self.max_results
    }

    pub fn set_first_result(&mut self, first: u64) -> &mut Self {
        self.first_result = Some(first);
        self
    }

    pub fn first_result(&self) -> Option<u64> {
        self.first_result
    }

    // ---------- execution ----------

    /// Run this insert, update or delete on `executor`
    ///
    /// # Errors
    ///
    /// Rendering failures, or whatever the executor reports.
    pub fn execute(&self, executor: &dyn Executor) -> Result<usize> {
        executor.execute(self)
    }

    /// Run this select on `executor`
    ///
    /// # Errors
    ///
    /// Rendering failures, or whatever the executor reports.
    pub fn fetch_all(&self, executor: &dyn Executor) -> Result<Vec<Row>> {
        executor.fetch_all(self)
    }

    // ---------- rendering ----------

    /// Render the statement
    ///
    /// # Errors
    ///
    /// `InvalidQuery` when a select has no FROM, a write has no target table
    /// or an update has nothing to SET; `InvalidIdentifier` when a table,
    /// alias, column or parameter name is not a plain identifier.
    pub fn get_sql(&self) -> Result<String> {
        for name in self.parameters.keys() {
            validate_identifier(name)?;
        }
        match self.kind {
            QueryKind::Select => self.render_select(),
            QueryKind::Insert => self.render_insert(),
            QueryKind::Update => self.render_update(),
            QueryKind::Delete => self.render_delete(),
        }
    }

    fn render_select(&self) -> Result<String> {
        let (table, alias) = self.from.as_ref().ok_or(FolioError::MissingFrom)?;
        validate_identifier(table)?;
        validate_identifier(alias)?;

        let columns = if self.select.is_empty() {
            "*".to_string()
        } else {
            self.select.join(", ")
        };
        let mut sql = format!("SELECT {} FROM {} {}", columns, table, alias);

        for join in &self.joins {
            validate_identifier(&join.table)?;
            validate_identifier(&join.alias)?;
            sql.push_str(&format!(
                " {} {} {} ON {}",
                join.kind.as_sql(),
                join.table,
                join.alias,
                join.condition
            ));
        }

        self.push_where(&mut sql);

        if !self.order_by.is_empty() {
            let parts: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, order)| format!("{} {}", column, order.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        // Both are signed 64-bit there, so larger values saturate.
        let clamp = |n: u64| n.min(i64::MAX as u64);
        match (self.max_results.map(clamp), self.first_result.map(clamp)) {
            (Some(max), Some(first)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", max, first)),
            (Some(max), None) => sql.push_str(&format!(" LIMIT {}", max)),
            (None, Some(first)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", first)),
            (None, None) => {}
        }

        Ok(sql)
    }

    fn render_insert(&self) -> Result<String> {
        let table = self.write_target()?;
        if self.assignments.is_empty() {
            return Ok(format!("INSERT INTO {} DEFAULT VALUES", table));
        }
        let mut columns = Vec::with_capacity(self.assignments.len());
        let mut values = Vec::with_capacity(self.assignments.len());
        for (column, expression) in &self.assignments {
            columns.push(validate_identifier(column)?);
            values.push(expression.as_str());
        }
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            values.join(", ")
        ))
    }

    fn render_update(&self) -> Result<String> {
        let table = self.write_target()?;
        if self.assignments.is_empty() {
            return Err(FolioError::EmptyAssignments {
                statement: QueryKind::Update.as_str().to_string(),
                table: table.to_string(),
            }
            .into());
        }
        let mut sets = Vec::with_capacity(self.assignments.len());
        for (column, expression) in &self.assignments {
            sets.push(format!("{} = {}", validate_identifier(column)?, expression));
        }
        let mut sql = format!("UPDATE {} SET {}", table, sets.join(", "));
        self.push_where(&mut sql);
        Ok(sql)
    }

    fn render_delete(&self) -> Result<String> {
        let table = self.write_target()?;
        let mut sql = format!("DELETE FROM {}", table);
        self.push_where(&mut sql);
        Ok(sql)
    }

    fn write_target(&self) -> Result<&str> {
        let table = self.target.as_deref().ok_or_else(|| FolioError::MissingTable {
            statement: self.kind.as_str().to_string(),
        })?;
        validate_identifier(table)
    }

    fn push_where(&self, sql: &mut String) {
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
    }
}
