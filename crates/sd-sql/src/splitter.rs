//! Statement splitting and schema file rendering
//!
//! A schema file is a sequence of statements, each terminated by `;` and a
//! newline, with a blank line between consecutive statements. Splitting and
//! joining must round-trip: `split(join(stmts)) == stmts`.

use sqlparser::tokenizer::{Location, Token};

use crate::dialect::SqlDialect;
use crate::error::SqlResult;

/// Statement terminator used in schema and migration files.
pub const STATEMENT_SEPARATOR: &str = ";";

/// Split a SQL body into individual statements.
///
/// Only top-level semicolons separate statements; semicolons inside string
/// literals, quoted identifiers or comments are left alone. Each statement
/// keeps its original text (trimmed), and chunks containing nothing but
/// whitespace or comments are dropped.
pub fn split_statements(dialect: &dyn SqlDialect, sql: &str) -> SqlResult<Vec<String>> {
    let tokens = dialect.tokenize(sql)?;
    let lines = LineIndex::new(sql);

    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_content = false;

    for token in &tokens {
        match &token.token {
            Token::SemiColon => {
                let end = lines.byte_offset(sql, token.span.start);
                if has_content {
                    statements.push(sql[start..end].trim().to_string());
                }
                start = end + STATEMENT_SEPARATOR.len();
                has_content = false;
            }
            Token::Whitespace(_) | Token::EOF => {}
            _ => has_content = true,
        }
    }

    if has_content && start < sql.len() {
        statements.push(sql[start..].trim().to_string());
    }

    Ok(statements)
}

/// Render statements in schema file format.
///
/// Every statement is terminated with `;` and a newline; every statement but
/// the last is followed by a blank line. When the last line of a statement
/// may end in a line comment, the `;` goes on a line of its own so the
/// comment cannot swallow it.
pub fn join_statements<S: AsRef<str>>(statements: &[S]) -> String {
    statements
        .iter()
        .map(|s| {
            let s = s.as_ref();
            let break_before = if may_end_in_line_comment(s) { "\n" } else { "" };
            format!("{s}{break_before}{STATEMENT_SEPARATOR}\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `--` and `#` start line comments in the supported dialects.
fn may_end_in_line_comment(statement: &str) -> bool {
    let last_line = statement.lines().last().unwrap_or_default();
    last_line.contains("--") || last_line.contains('#')
}

/// Maps tokenizer locations (1-based line, 1-based char column) to byte
/// offsets in the source text.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(sql: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(sql.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn byte_offset(&self, sql: &str, location: Location) -> usize {
        let line = location.line.saturating_sub(1) as usize;
        let column = location.column.saturating_sub(1) as usize;
        let Some(&line_start) = self.starts.get(line) else {
            return sql.len();
        };
        sql[line_start..]
            .char_indices()
            .nth(column)
            .map_or(sql.len(), |(i, _)| line_start + i)
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
