//! Data model shared by the query builder, the mapping strategies and the
//! repository

pub mod entity;
pub mod metadata;
pub mod row;
pub mod value;

pub use entity::Entity;
pub use metadata::{ClassMetadata, FieldMapping, FieldType};
pub use row::Row;
pub use value::Value;
