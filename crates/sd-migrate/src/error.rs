//! Error types for sd-migrate
//!
//! Every failure is tagged with the phase that failed. Callers branch on
//! [`MigrateError::kind`], never on the message.

use sd_core::CoreError;
use sd_db::DbError;
use sd_sql::SqlError;
use std::fmt;
use thiserror::Error;

/// The phase a [`MigrateError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CreateClient,
    CreateDatabase,
    DropDatabase,
    LoadSchema,
    UpdateDdl,
    UpdateDml,
    UpdatePartitionedDml,
    WaitOperation,
    GetMigrationVersion,
    SetMigrationVersion,
    NoMigration,
    MigrationVersionDirty,
    ExecuteMigrations,
    UnknownStatementKind,
    CloseClient,
    LoadMigrations,
    InvalidStatements,
}

impl ErrorKind {
    /// Stable error code
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::CreateClient => "W001",
            ErrorKind::CreateDatabase => "W002",
            ErrorKind::DropDatabase => "W003",
            ErrorKind::LoadSchema => "W004",
            ErrorKind::UpdateDdl => "W005",
            ErrorKind::UpdateDml => "W006",
            ErrorKind::UpdatePartitionedDml => "W007",
            ErrorKind::WaitOperation => "W008",
            ErrorKind::GetMigrationVersion => "W009",
            ErrorKind::SetMigrationVersion => "W010",
            ErrorKind::NoMigration => "W011",
            ErrorKind::MigrationVersionDirty => "W012",
            ErrorKind::ExecuteMigrations => "W013",
            ErrorKind::UnknownStatementKind => "W014",
            ErrorKind::CloseClient => "W015",
            ErrorKind::LoadMigrations => "W016",
            ErrorKind::InvalidStatements => "W017",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.code())
    }
}

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// W001: Database client could not be constructed
    #[error("[W001] Failed to create database client: {0}")]
    CreateClient(#[source] DbError),

    /// W002: Create-database request rejected
    #[error("[W002] Failed to create database: {0}")]
    CreateDatabase(#[source] DbError),

    /// W003: Drop-database request failed
    #[error("[W003] Failed to drop database: {0}")]
    DropDatabase(#[source] DbError),

    /// W004: Structural definition could not be read
    #[error("[W004] Failed to load schema: {0}")]
    LoadSchema(#[source] DbError),

    /// W005: Structural change request rejected
    #[error("[W005] Failed to apply DDL: {0}")]
    UpdateDdl(#[source] DbError),

    /// W006: Transactional data change failed (nothing committed)
    #[error("[W006] Failed to apply DML: {0}")]
    UpdateDml(#[source] DbError),

    /// W007: Partitioned data change failed; earlier statements stay applied
    #[error("[W007] Failed to apply partitioned DML after {rows_affected} affected rows: {source}")]
    UpdatePartitionedDml {
        rows_affected: i64,
        #[source]
        source: DbError,
    },

    /// W008: Long-running operation did not complete
    #[error("[W008] Failed to wait for operation: {0}")]
    WaitOperation(#[source] DbError),

    /// W009: Version row could not be read or decoded
    #[error("[W009] Failed to get migration version: {0}")]
    GetMigrationVersion(#[source] DbError),

    /// W010: Version row could not be replaced
    #[error("[W010] Failed to set migration version: {0}")]
    SetMigrationVersion(#[source] DbError),

    /// W011: Version table is empty
    #[error("[W011] No migration has been applied")]
    NoMigration,

    /// W012: A previous run left a version in flight
    #[error("[W012] Database version {version} is dirty, please fix it")]
    MigrationVersionDirty { version: u64 },

    /// W013: Migration run aborted
    #[error("[W013] Failed to execute migrations: {0}")]
    ExecuteMigrations(#[source] Box<MigrateError>),

    /// W014: Migration statements are neither all structural nor all data
    #[error("[W014] Unknown statement kind in migration {version}: {detail}")]
    UnknownStatementKind { version: u64, detail: String },

    /// W015: Client could not be closed cleanly
    #[error("[W015] Failed to close database client: {0}")]
    CloseClient(#[source] DbError),

    /// W016: Migration files could not be loaded
    #[error("[W016] Failed to load migrations: {0}")]
    LoadMigrations(#[source] CoreError),

    /// W017: Statement file could not be split
    #[error("[W017] Invalid statements: {0}")]
    InvalidStatements(#[source] SqlError),
}

impl MigrateError {
    /// The phase this error came from.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrateError::CreateClient(_) => ErrorKind::CreateClient,
            MigrateError::CreateDatabase(_) => ErrorKind::CreateDatabase,
            MigrateError::DropDatabase(_) => ErrorKind::DropDatabase,
            MigrateError::LoadSchema(_) => ErrorKind::LoadSchema,
            MigrateError::UpdateDdl(_) => ErrorKind::UpdateDdl,
            MigrateError::UpdateDml(_) => ErrorKind::UpdateDml,
            MigrateError::UpdatePartitionedDml { .. } => ErrorKind::UpdatePartitionedDml,
            MigrateError::WaitOperation(_) => ErrorKind::WaitOperation,
            MigrateError::GetMigrationVersion(_) => ErrorKind::GetMigrationVersion,
            MigrateError::SetMigrationVersion(_) => ErrorKind::SetMigrationVersion,
            MigrateError::NoMigration => ErrorKind::NoMigration,
            MigrateError::MigrationVersionDirty { .. } => ErrorKind::MigrationVersionDirty,
            MigrateError::ExecuteMigrations(_) => ErrorKind::ExecuteMigrations,
            MigrateError::UnknownStatementKind { .. } => ErrorKind::UnknownStatementKind,
            MigrateError::CloseClient(_) => ErrorKind::CloseClient,
            MigrateError::LoadMigrations(_) => ErrorKind::LoadMigrations,
            MigrateError::InvalidStatements(_) => ErrorKind::InvalidStatements,
        }
    }

    /// Kind of the innermost wrapped error.
    ///
    /// `ExecuteMigrations` only says a run aborted; this says which step.
    pub fn root_kind(&self) -> ErrorKind {
        match self {
            MigrateError::ExecuteMigrations(inner) => inner.root_kind(),
            other => other.kind(),
        }
    }

    pub(crate) fn execute(inner: MigrateError) -> Self {
        MigrateError::ExecuteMigrations(Box::new(inner))
    }
}

impl From<CoreError> for MigrateError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownStatementKind { version, detail } => {
                MigrateError::UnknownStatementKind { version, detail }
            }
            CoreError::MixedStatementKinds { version } => MigrateError::UnknownStatementKind {
                version,
                detail: "structural and data statements in one migration".to_string(),
            },
            other => MigrateError::LoadMigrations(other),
        }
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
