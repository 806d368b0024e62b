//! Strongly-typed table name wrapper.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use crate::error::{CoreError, CoreResult};

/// Longest identifier accepted for a table name.
const MAX_TABLE_NAME_LEN: usize = 128;

/// Table name that is safe to splice into generated SQL.
///
/// Only plain identifiers are accepted: an ASCII letter or `_` followed by
/// ASCII letters, digits or `_`. Keywords such as `order` are valid names;
/// generated SQL quotes the name in the backend's dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Validate and wrap a table name.
    pub fn parse(name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        let invalid = |reason: &str| CoreError::InvalidTableName {
            name: name.clone(),
            reason: reason.to_string(),
        };

        let mut chars = name.chars();
        match chars.next() {
            None => return Err(invalid("must not be empty")),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(invalid("must start with a letter or '_'"))
            }
            Some(_) => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("may only contain letters, digits and '_'"));
        }
        if name.len() > MAX_TABLE_NAME_LEN {
            return Err(invalid("is longer than 128 characters"));
        }
        Ok(Self(name))
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TableName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TableName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableName {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for TableName {
    type Error = CoreError;

    fn try_from(value: &str) -> CoreResult<Self> {
        Self::parse(value)
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.0
    }
}

impl PartialEq<str> for TableName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TableName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["SchemaMigrations", "_schema", "schema_migrations_v2", "order"] {
            assert_eq!(TableName::parse(name).unwrap(), name);
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            TableName::parse(""),
            Err(CoreError::InvalidTableName { .. })
        ));
    }

    #[test]
    fn test_rejects_injection() {
        assert!(TableName::parse("t; DROP TABLE users").is_err());
        assert!(TableName::parse("1table").is_err());
        assert!(TableName::parse("schema.table").is_err());
    }

    #[test]
    fn test_rejects_overlong() {
        assert!(TableName::parse("a".repeat(129)).is_err());
        assert!(TableName::parse("a".repeat(128)).is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let name: TableName = serde_yaml::from_str("Versions").unwrap();
        assert_eq!(name, "Versions");
        assert_eq!(serde_yaml::to_string(&name).unwrap().trim(), "Versions");
        assert!(serde_yaml::from_str::<TableName>("'bad name'").is_err());
    }
}
