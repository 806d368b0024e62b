//! Create command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::read_sql_file;
use crate::context::CommandContext;

/// Execute the create command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::new(global)?;
    let schema = read_sql_file(&ctx.schema_file())?;

    ctx.migrator
        .create_database_from_schema(&schema)
        .await
        .context("Failed to create database")?;

    if global.verbose {
        println!("Created database from {}", ctx.schema_file().display());
    }
    ctx.finish().await
}
