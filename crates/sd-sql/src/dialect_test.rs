use super::*;

#[test]
fn test_duckdb_tokenize() {
    let dialect = DuckDbDialect::new();
    let tokens = dialect.tokenize("SELECT 1").unwrap();
    assert!(!tokens.is_empty());
}

#[test]
fn test_quote_ident() {
    let dialect = DuckDbDialect::new();
    assert_eq!(dialect.quote_ident("user"), "\"user\"");
    assert_eq!(dialect.quote_ident("user\"name"), "\"user\"\"name\"");
}

#[test]
fn test_googlesql_quote_ident() {
    let dialect = GoogleSqlDialect::new();
    assert_eq!(dialect.quote_ident("Singers"), "`Singers`");
}

#[test]
fn test_tokenize_error_location() {
    let dialect = DuckDbDialect::new();
    let result = dialect.tokenize("SELECT 1;\nSELECT 'unterminated");
    match result {
        Err(SqlError::TokenizeError { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected tokenize error, got {other:?}"),
    }
}
