//! Migrate command implementation

use anyhow::{Context, Result};
use sd_core::create_migration_file;
use sd_migrate::{MigrateError, VersionState};
use serde::Serialize;

use crate::cli::{
    GlobalArgs, MigrateArgs, MigrateCommands, MigrateCreateArgs, MigrateSetArgs, MigrateUpArgs,
    MigrateVersionArgs, VersionOutput,
};
use crate::context::{load_config, CommandContext};

/// Recorded version as printed by `migrate version --output json`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct VersionReport {
    pub version: Option<u64>,
    pub dirty: bool,
}

impl From<Option<VersionState>> for VersionReport {
    fn from(state: Option<VersionState>) -> Self {
        Self {
            version: state.map(VersionState::version),
            dirty: state.is_some_and(VersionState::is_dirty),
        }
    }
}

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    match &args.command {
        MigrateCommands::Up(up) => execute_up(up, global).await,
        MigrateCommands::Create(create) => execute_create(create, global),
        MigrateCommands::Version(version) => execute_version(version, global).await,
        MigrateCommands::Set(set) => execute_set(set, global).await,
    }
}

/// Connect and make sure the version table exists
async fn open(global: &GlobalArgs) -> Result<CommandContext> {
    let ctx = CommandContext::new(global)?;
    ctx.migrator
        .ensure_migration_table(ctx.version_table())
        .await
        .context("Failed to prepare the migration version table")?;
    Ok(ctx)
}

async fn execute_up(args: &MigrateUpArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = open(global).await?;
    let migrations = ctx
        .migrator
        .load_migrations(&ctx.migrations_dir())
        .context("Failed to load migrations")?;

    let report = ctx
        .migrator
        .execute_migrations(&migrations, args.limit.unwrap_or(-1), ctx.version_table())
        .await
        .context("Migration failed")?;

    log::debug!(
        "Migrated from {} to {}",
        report.starting,
        report.final_version()
    );
    ctx.finish().await
}

fn execute_create(args: &MigrateCreateArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let dir = config.migrations_dir_absolute(std::path::Path::new(&global.directory));

    let path = create_migration_file(&dir, args.name.as_deref())
        .context("Failed to create migration file")?;

    println!("{}", path.display());
    Ok(())
}

async fn execute_version(args: &MigrateVersionArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = open(global).await?;

    let state = match ctx.migrator.get_migration_version(ctx.version_table()).await {
        Ok(state) => Some(state),
        Err(MigrateError::NoMigration) => None,
        Err(e) => return Err(e).context("Failed to read migration version"),
    };

    match args.output {
        VersionOutput::Text => println!("{}", format_version(state)),
        VersionOutput::Json => {
            println!("{}", serde_json::to_string(&VersionReport::from(state))?)
        }
    }
    ctx.finish().await
}

async fn execute_set(args: &MigrateSetArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = open(global).await?;
    let state = VersionState::from_parts(args.version, args.dirty);

    ctx.migrator
        .set_migration_version(state, ctx.version_table())
        .await
        .context("Failed to set migration version")?;

    if global.verbose {
        println!("Recorded version {state}");
    }
    ctx.finish().await
}

/// Text form of `migrate version`
pub(crate) fn format_version(state: Option<VersionState>) -> String {
    match state {
        Some(state) => state.to_string(),
        None => "No migrations.".to_string(),
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
