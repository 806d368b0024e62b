//! Statement classification by leading keyword

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;

use crate::dialect::SqlDialect;
use crate::error::{SqlError, SqlResult};

/// What a single statement does to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementClass {
    /// Alters schema shape (tables, indexes, columns, grants)
    Structural,
    /// Inserts rows
    Insert,
    /// Updates rows
    Update,
    /// Deletes rows
    Delete,
}

impl StatementClass {
    /// Whether this statement changes schema shape.
    pub fn is_structural(self) -> bool {
        matches!(self, StatementClass::Structural)
    }

    /// Whether this statement can run as a partitioned, non-transactional
    /// operation. Inserts cannot.
    pub fn is_partitionable(self) -> bool {
        matches!(self, StatementClass::Update | StatementClass::Delete)
    }
}

/// Classify a statement by its first keyword, skipping comments.
pub fn classify_statement(dialect: &dyn SqlDialect, statement: &str) -> SqlResult<StatementClass> {
    let tokens = dialect.tokenize(statement)?;
    let first = tokens
        .iter()
        .map(|t| &t.token)
        .find(|t| !matches!(t, Token::Whitespace(_) | Token::EOF));

    match first {
        None => Err(SqlError::EmptySql),
        Some(Token::Word(word)) => match word.keyword {
            Keyword::CREATE
            | Keyword::ALTER
            | Keyword::DROP
            | Keyword::RENAME
            | Keyword::GRANT
            | Keyword::REVOKE
            | Keyword::ANALYZE
            | Keyword::COMMENT => Ok(StatementClass::Structural),
            Keyword::INSERT => Ok(StatementClass::Insert),
            Keyword::UPDATE => Ok(StatementClass::Update),
            Keyword::DELETE => Ok(StatementClass::Delete),
            _ => Err(SqlError::UnsupportedStatement(word.value.to_uppercase())),
        },
        Some(other) => Err(SqlError::UnsupportedStatement(other.to_string())),
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
