//! Load command implementation

use anyhow::{Context, Result};
use std::fs;

use crate::cli::GlobalArgs;
use crate::context::CommandContext;

/// Execute the load command: write the current schema to the schema file
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::new(global)?;
    let schema = ctx
        .migrator
        .load_schema()
        .await
        .context("Failed to load schema")?;

    let path = ctx.schema_file();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, schema).with_context(|| format!("Failed to write {}", path.display()))?;

    if global.verbose {
        println!("Wrote schema to {}", path.display());
    }
    ctx.finish().await
}
