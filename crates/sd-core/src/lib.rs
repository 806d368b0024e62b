//! sd-core - Core library for Spindle
//!
//! This crate provides configuration parsing, the migration model (versioned
//! statement batches with a static execution mode), the ordered migration
//! set, and discovery of migration files on disk.

pub mod config;
pub mod error;
pub mod loading;
pub mod migration;
pub mod migration_set;
pub mod table_name;

pub use config::{Config, DatabaseConfig, Dialect};
pub use error::{CoreError, CoreResult};
pub use loading::{create_migration_file, load_migrations, parse_migration_file_name};
pub use migration::{ExecutionMode, Migration, StatementKind};
pub use migration_set::{ExecutionPlan, MigrationSet};
pub use table_name::TableName;
