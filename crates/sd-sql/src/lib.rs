//! sd-sql - SQL lexing layer for Spindle
//!
//! Spindle never interprets the statements it applies. This crate lexes
//! migration bodies with sqlparser-rs so that statement boundaries and
//! leading keywords are found without being fooled by comments or quoted
//! text, and renders statement lists back into the schema file format.

pub mod classify;
pub mod dialect;
pub mod error;
pub mod splitter;

pub use classify::{classify_statement, StatementClass};
pub use dialect::{DuckDbDialect, GoogleSqlDialect, SqlDialect};
pub use error::SqlError;
pub use splitter::{join_statements, split_statements, STATEMENT_SEPARATOR};
