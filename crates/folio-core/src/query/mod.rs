//! Fluent SQL building
//!
//! Statements are only rendered by `QueryBuilder::get_sql`. Repositories,
//! loaders and persisters describe them through the builder, and values
//! travel as named parameters.

pub mod builder;
pub mod criteria;
mod ident;

pub use builder::{JoinKind, Order, QueryBuilder, QueryKind};
pub use criteria::{Criteria, OrderBy};
pub use ident::validate_identifier;
