//! sd-migrate - Migration engine for Spindle
//!
//! [`Migrator`] owns one database client and applies a [`MigrationSet`]
//! in version order. Progress is tracked in a single-row version table: the
//! row is marked dirty before a migration's statements are dispatched and
//! marked clean once they complete, so an interrupted run leaves durable
//! evidence that must be resolved by an operator before the next run.
//!
//! [`MigrationSet`]: sd_core::MigrationSet

pub mod admin;
pub mod engine;
pub mod error;
pub mod progress;
pub mod version;

pub use engine::{AppliedMigration, MigrationReport, Migrator};
pub use error::{ErrorKind, MigrateError, MigrateResult};
pub use progress::{LogProgress, MigrationEvent, ProgressSink};
pub use version::{TableVersionStore, VersionState, VersionStore};
