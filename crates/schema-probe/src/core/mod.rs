//! Core abstractions for engine-independent schema discovery.
//!
//! - [`schema`]: the canonical model (tables, columns, constraints, indexes, databases)
//! - [`value`]: scalar values and row sets at the executor boundary
//! - [`traits`]: the statement executor and catalog provider seams
//! - [`catalog`]: driver registry keyed by engine identifier

pub mod catalog;
pub mod schema;
pub mod traits;
pub mod value;

// Re-export commonly used types for convenience
pub use catalog::DriverCatalog;
pub use schema::{Column, Constraint, Database, Index, SchemaSnapshot, Table};
pub use traits::{CatalogProvider, StatementExecutor};
pub use value::{Row, RowSet, Value};
