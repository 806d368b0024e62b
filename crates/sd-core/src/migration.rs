//! Migration model
//!
//! A migration is an immutable, versioned batch of statements together with
//! the execution mode it must be applied with. The mode is decided once, when
//! the migration is built, and the engine only dispatches on it.

use std::fmt;

use sd_sql::{classify_statement, SqlDialect, SqlError};

use crate::error::{CoreError, CoreResult};

/// Whether a migration changes schema shape or row contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Structural change (DDL)
    Ddl,
    /// Data change (DML)
    Dml,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Ddl => write!(f, "ddl"),
            StatementKind::Dml => write!(f, "dml"),
        }
    }
}

/// How the statements of a migration are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// One structural-change batch, awaited to completion
    StructuralApply,
    /// All statements inside one read-write transaction
    TransactionalDataApply,
    /// Each statement as an independent large-scale update
    PartitionedDataApply,
}

impl ExecutionMode {
    /// Select the execution mode for a statement kind.
    ///
    /// `partitioned` is only meaningful for data changes.
    pub fn select(kind: StatementKind, partitioned: bool) -> Self {
        match (kind, partitioned) {
            (StatementKind::Ddl, _) => ExecutionMode::StructuralApply,
            (StatementKind::Dml, false) => ExecutionMode::TransactionalDataApply,
            (StatementKind::Dml, true) => ExecutionMode::PartitionedDataApply,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::StructuralApply => write!(f, "structural"),
            ExecutionMode::TransactionalDataApply => write!(f, "transactional"),
            ExecutionMode::PartitionedDataApply => write!(f, "partitioned"),
        }
    }
}

/// A versioned batch of statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Unique, monotonically increasing version
    pub version: u64,
    /// Optional human-readable name
    pub name: Option<String>,
    /// Statements in execution order
    pub statements: Vec<String>,
    /// Structural or data change
    pub kind: StatementKind,
    /// Data changes only: run each statement as a large-scale update
    pub partitioned: bool,
}

impl Migration {
    /// Build a structural-change migration.
    pub fn ddl(version: u64, name: Option<String>, statements: Vec<String>) -> Self {
        Self {
            version,
            name,
            statements,
            kind: StatementKind::Ddl,
            partitioned: false,
        }
    }

    /// Build a data-change migration.
    pub fn dml(
        version: u64,
        name: Option<String>,
        statements: Vec<String>,
        partitioned: bool,
    ) -> Self {
        Self {
            version,
            name,
            statements,
            kind: StatementKind::Dml,
            partitioned,
        }
    }

    /// Build a migration, deriving its kind from the statements.
    ///
    /// All statements must be structural, or all must be data changes. A data
    /// migration runs partitioned only when every statement is an `UPDATE` or
    /// `DELETE`; a single `INSERT` makes it transactional.
    pub fn classify(
        version: u64,
        name: Option<String>,
        statements: Vec<String>,
        dialect: &dyn SqlDialect,
    ) -> CoreResult<Self> {
        if statements.is_empty() {
            return Err(CoreError::EmptyMigration { version });
        }

        let classes = statements
            .iter()
            .map(|stmt| {
                classify_statement(dialect, stmt).map_err(|e| match e {
                    SqlError::UnsupportedStatement(detail) => {
                        CoreError::UnknownStatementKind { version, detail }
                    }
                    other => CoreError::Sql(other),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let structural = classes.iter().filter(|c| c.is_structural()).count();
        if structural == classes.len() {
            Ok(Self::ddl(version, name, statements))
        } else if structural == 0 {
            let partitioned = classes.iter().all(|c| c.is_partitionable());
            Ok(Self::dml(version, name, statements, partitioned))
        } else {
            Err(CoreError::MixedStatementKinds { version })
        }
    }

    /// Execution mode the engine must use for this migration.
    pub fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::select(self.kind, self.partitioned)
    }

    /// Short label used in progress output: `3` or `3 add_users`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.version, name),
            None => self.version.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
