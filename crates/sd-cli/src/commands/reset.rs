//! Reset command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::read_sql_file;
use crate::context::CommandContext;

/// Execute the reset command: drop, then create from the schema file
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::new(global)?;
    let schema = read_sql_file(&ctx.schema_file())?;

    ctx.migrator
        .reset_database(&schema)
        .await
        .context("Failed to reset database")?;

    ctx.finish().await
}
