//! Row values and buffered mutations

/// A single column value read from or written to the database.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
}

impl Value {
    /// The value as an `i64`, if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a `bool`, if it is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Name of the value's type, for decode error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::Int64(_) => "INT64",
            Value::Float64(_) => "FLOAT64",
            Value::String(_) => "STRING",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// One row of column values, in the order the columns were requested.
pub type Row = Vec<Value>;

/// A write buffered inside a read-write transaction.
///
/// A slice of mutations passed to [`crate::Database::write_mutations`] is
/// committed as one unit: either every mutation is visible or none is.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Delete every row of a table
    DeleteAll { table: String },
    /// Insert one row
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<Value>,
    },
}

impl Mutation {
    pub fn delete_all(table: impl Into<String>) -> Self {
        Mutation::DeleteAll {
            table: table.into(),
        }
    }

    pub fn insert(table: impl Into<String>, columns: &[&str], values: Vec<Value>) -> Self {
        Mutation::Insert {
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }
}
