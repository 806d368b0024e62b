//! SQL dialect abstraction

use sqlparser::dialect::{BigQueryDialect, Dialect, DuckDbDialect as SqlParserDuckDb};
use sqlparser::tokenizer::{TokenWithSpan, Tokenizer};

use crate::error::{SqlError, SqlResult};

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect used for lexing
    fn lexer_dialect(&self) -> &dyn Dialect;

    /// Tokenize SQL, keeping whitespace, comments and source spans
    fn tokenize(&self, sql: &str) -> SqlResult<Vec<TokenWithSpan>> {
        Tokenizer::new(self.lexer_dialect(), sql)
            .tokenize_with_location()
            .map_err(|e| SqlError::TokenizeError {
                message: e.message.clone(),
                line: e.location.line as usize,
                column: e.location.column as usize,
            })
    }

    /// Quote an identifier for this dialect
    fn quote_ident(&self, ident: &str) -> String;

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// DuckDB SQL dialect
pub struct DuckDbDialect {
    dialect: SqlParserDuckDb,
}

impl DuckDbDialect {
    /// Create a new DuckDB dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserDuckDb {},
        }
    }
}

impl Default for DuckDbDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for DuckDbDialect {
    fn lexer_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn name(&self) -> &'static str {
        "duckdb"
    }
}

/// GoogleSQL dialect (Spanner-style DDL and DML).
///
/// Lexed with the BigQuery rules, which share GoogleSQL's lexical structure:
/// backtick identifiers, `#` comments, triple-quoted and raw strings.
pub struct GoogleSqlDialect {
    dialect: BigQueryDialect,
}

impl GoogleSqlDialect {
    /// Create a new GoogleSQL dialect
    pub fn new() -> Self {
        Self {
            dialect: BigQueryDialect {},
        }
    }
}

impl Default for GoogleSqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for GoogleSqlDialect {
    fn lexer_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "\\`"))
    }

    fn name(&self) -> &'static str {
        "googlesql"
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
