//! Domain layer for the todo service.
//!
//! Holds the `Todo` entity, payload validation and normalization, list query
//! parsing and the shared [`error::CoreError`] type. Nothing in this crate
//! performs I/O.

pub mod error;
pub mod listing;
pub mod todo;
pub mod types;
