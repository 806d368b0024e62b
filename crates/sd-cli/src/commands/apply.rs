//! Apply command implementation

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::commands::common::read_sql_file;
use crate::context::CommandContext;

/// Execute the apply command
pub async fn execute(args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::new(global)?;

    if let Some(ddl) = &args.ddl {
        let sql = read_sql_file(Path::new(ddl))?;
        ctx.migrator
            .apply_ddl_file(&sql)
            .await
            .with_context(|| format!("Failed to apply {ddl}"))?;
    } else if let Some(dml) = &args.dml {
        let sql = read_sql_file(Path::new(dml))?;
        let rows = ctx
            .migrator
            .apply_dml_file(&sql, args.partitioned)
            .await
            .with_context(|| format!("Failed to apply {dml}"))?;
        println!("{rows} rows affected.");
    }

    ctx.finish().await
}
