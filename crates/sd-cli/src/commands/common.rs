//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sd_migrate::{MigrationEvent, ProgressSink};
use std::path::Path;

/// Prints migration progress lines to stdout.
pub(crate) struct PrintProgress;

impl ProgressSink for PrintProgress {
    fn notify(&self, event: &MigrationEvent) {
        println!("{event}");
    }
}

/// Read a SQL file, naming it in the error.
pub(crate) fn read_sql_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
