//! sd-db - Database abstraction layer for Spindle
//!
//! This crate provides the `Database` trait, the set of primitives the
//! migration engine treats as black boxes (structural changes awaited as
//! long-running operations, transactions, partitioned updates, atomic
//! buffered writes and row reads), and a DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Database, Operation, OperationKind};
pub use value::{Mutation, Row, Value};
