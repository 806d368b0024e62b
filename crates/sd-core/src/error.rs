//! Error types for sd-core

use sd_sql::SqlError;
use thiserror::Error;

/// Core error type for Spindle
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Migrations directory not found
    #[error("[E003] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// E004: Two migrations declare the same version
    #[error("[E004] Duplicate migration version {version}: {first} and {second}")]
    DuplicateMigrationVersion {
        version: u64,
        first: String,
        second: String,
    },

    /// E005: Migration file name has a version that cannot be represented
    #[error("[E005] Invalid migration file name '{name}': {reason}")]
    InvalidMigrationFileName { name: String, reason: String },

    /// E006: Migration contains no statements
    #[error("[E006] Migration {version} contains no statements")]
    EmptyMigration { version: u64 },

    /// E007: Migration mixes structural and data statements
    #[error("[E007] Migration {version} mixes structural and data statements")]
    MixedStatementKinds { version: u64 },

    /// E008: Statement is neither a structural nor a data change
    #[error("[E008] Unknown statement kind in migration {version}: {detail}")]
    UnknownStatementKind { version: u64, detail: String },

    /// E009: Invalid table name
    #[error("[E009] Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    /// E010: Invalid name for a new migration
    #[error("[E010] Invalid migration name '{name}': names may only contain letters, digits, '_' and '-'")]
    InvalidMigrationName { name: String },

    /// E011: IO error
    #[error("[E011] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E012: IO error with file path context
    #[error("[E012] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E013: Config YAML parse error
    #[error("[E013] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// E014: Migration body could not be lexed
    #[error("[E014] {0}")]
    Sql(#[from] SqlError),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
