//! Version bookkeeping
//!
//! The version table holds at most one row `(Version, Dirty)`. Replacing it
//! is always a delete-all followed by an insert in one atomic write, so a
//! reader never observes zero or two rows.

use crate::error::{MigrateError, MigrateResult};
use async_trait::async_trait;
use sd_core::TableName;
use sd_db::{Database, DbError, Mutation, Value};
use sd_sql::{DuckDbDialect, GoogleSqlDialect, SqlDialect};
use std::fmt;

/// Column holding the applied version
pub const VERSION_COLUMN: &str = "Version";

/// Column holding the in-flight flag
pub const DIRTY_COLUMN: &str = "Dirty";

/// Recorded migration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionState {
    /// `version` was applied completely
    Clean { version: u64 },
    /// `version` was started and may be partially applied
    Dirty { version: u64 },
}

impl VersionState {
    pub fn from_parts(version: u64, dirty: bool) -> Self {
        if dirty {
            VersionState::Dirty { version }
        } else {
            VersionState::Clean { version }
        }
    }

    pub fn version(self) -> u64 {
        match self {
            VersionState::Clean { version } | VersionState::Dirty { version } => version,
        }
    }

    pub fn is_dirty(self) -> bool {
        matches!(self, VersionState::Dirty { .. })
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionState::Clean { version } => write!(f, "{version}"),
            VersionState::Dirty { version } => write!(f, "{version} (dirty)"),
        }
    }
}

/// Durable storage for the [`VersionState`].
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Current state. Fails with `NoMigration` when nothing was recorded.
    async fn get(&self) -> MigrateResult<VersionState>;

    /// Replace the recorded state atomically.
    async fn set(&self, state: VersionState) -> MigrateResult<()>;

    /// Create the backing storage if it does not exist yet.
    async fn ensure(&self) -> MigrateResult<()>;
}

/// [`VersionStore`] backed by a table in the target database.
pub struct TableVersionStore<'a> {
    db: &'a dyn Database,
    table: &'a TableName,
}

impl<'a> TableVersionStore<'a> {
    pub fn new(db: &'a dyn Database, table: &'a TableName) -> Self {
        Self { db, table }
    }

    fn decode(&self, row: &[Value]) -> MigrateResult<VersionState> {
        let undecodable = |detail: String| {
            MigrateError::GetMigrationVersion(DbError::Internal(format!(
                "unexpected row in {}: {detail}",
                self.table
            )))
        };

        let (version, dirty) = match row {
            [version, dirty] => (version, dirty),
            _ => return Err(undecodable(format!("expected 2 columns, got {}", row.len()))),
        };
        let version = version
            .as_i64()
            .ok_or_else(|| undecodable(format!("{VERSION_COLUMN} is {}", version.type_name())))?;
        let version = u64::try_from(version)
            .map_err(|_| undecodable(format!("negative {VERSION_COLUMN} {version}")))?;
        let dirty = dirty
            .as_bool()
            .ok_or_else(|| undecodable(format!("{DIRTY_COLUMN} is {}", dirty.type_name())))?;

        Ok(VersionState::from_parts(version, dirty))
    }
}

#[async_trait]
impl VersionStore for TableVersionStore<'_> {
    async fn get(&self) -> MigrateResult<VersionState> {
        let rows = self
            .db
            .read_rows(self.table, &[VERSION_COLUMN, DIRTY_COLUMN], Some(1))
            .await
            .map_err(MigrateError::GetMigrationVersion)?;

        match rows.first() {
            Some(row) => self.decode(row),
            None => Err(MigrateError::NoMigration),
        }
    }

    async fn set(&self, state: VersionState) -> MigrateResult<()> {
        let version = i64::try_from(state.version()).map_err(|_| {
            MigrateError::SetMigrationVersion(DbError::Internal(format!(
                "version {} does not fit the {VERSION_COLUMN} column",
                state.version()
            )))
        })?;

        let mutations = [
            Mutation::delete_all(self.table.as_str()),
            Mutation::insert(
                self.table.as_str(),
                &[VERSION_COLUMN, DIRTY_COLUMN],
                vec![Value::Int64(version), Value::Bool(state.is_dirty())],
            ),
        ];
        self.db
            .write_mutations(&mutations)
            .await
            .map_err(MigrateError::SetMigrationVersion)?;

        log::debug!("Recorded version {state} in {}", self.table);
        Ok(())
    }

    async fn ensure(&self) -> MigrateResult<()> {
        if self
            .db
            .read_rows(self.table, &[VERSION_COLUMN], Some(1))
            .await
            .is_ok()
        {
            return Ok(());
        }

        let ddl = version_table_ddl(self.db.db_type(), self.table);
        log::info!("Creating version table {}", self.table);
        let operation = self
            .db
            .update_ddl(std::slice::from_ref(&ddl))
            .await
            .map_err(MigrateError::UpdateDdl)?;
        self.db
            .wait_operation(operation)
            .await
            .map_err(MigrateError::WaitOperation)
    }
}

/// `CREATE TABLE` statement for the version table on the given backend.
///
/// The table name is quoted in the backend's dialect, so names that collide
/// with keywords (`order`, `select`) still create a table.
pub fn version_table_ddl(db_type: &str, table: &TableName) -> String {
    match db_type {
        "duckdb" => format!(
            "CREATE TABLE {} ({VERSION_COLUMN} BIGINT NOT NULL, {DIRTY_COLUMN} BOOLEAN NOT NULL, PRIMARY KEY ({VERSION_COLUMN}))",
            DuckDbDialect::new().quote_ident(table.as_str())
        ),
        _ => format!(
            "CREATE TABLE {} ({VERSION_COLUMN} INT64 NOT NULL, {DIRTY_COLUMN} BOOL NOT NULL) PRIMARY KEY({VERSION_COLUMN})",
            GoogleSqlDialect::new().quote_ident(table.as_str())
        ),
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
