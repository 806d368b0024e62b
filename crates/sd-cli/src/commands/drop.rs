//! Drop command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::context::CommandContext;

/// Execute the drop command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::new(global)?;

    ctx.migrator
        .drop_database()
        .await
        .context("Failed to drop database")?;

    if global.verbose {
        println!("Dropped database {}", ctx.config.database.path);
    }
    ctx.finish().await
}
