//! Core types shared across Folio facilities
//!
//! This crate holds the canonical schema constants used by both the error
//! facility and the logging facility, so that every crate in the workspace
//! emits the same field keys and event names.

pub mod schema;
