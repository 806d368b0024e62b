//! Runtime context for CLI commands

use anyhow::{Context, Result};
use sd_core::{Config, TableName};
use sd_migrate::Migrator;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;
use crate::commands::common::PrintProgress;

const MEMORY_DATABASE: &str = ":memory:";

/// Loaded configuration plus an open migrator
pub(crate) struct CommandContext {
    /// Project directory
    pub root: PathBuf,

    /// Configuration with command-line overrides applied
    pub config: Config,

    /// Migrator connected to the configured database
    pub migrator: Migrator,
}

impl CommandContext {
    /// Load configuration and connect to the database
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.directory);
        let config = load_config(global)?;
        let migrator = Migrator::connect(&config)
            .with_context(|| format!("Failed to open database {}", config.database.path))?
            .with_progress(Box::new(PrintProgress));

        Ok(Self {
            root,
            config,
            migrator,
        })
    }

    pub fn schema_file(&self) -> PathBuf {
        self.config.schema_file_absolute(&self.root)
    }

    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_dir_absolute(&self.root)
    }

    pub fn version_table(&self) -> &TableName {
        &self.config.version_table
    }

    /// Close the database client
    pub async fn finish(self) -> Result<()> {
        self.migrator
            .close()
            .await
            .context("Failed to close database client")
    }
}

/// Load the project configuration and apply command-line overrides.
///
/// Relative paths in the configuration are resolved against the project
/// directory.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let root = Path::new(&global.directory);

    let mut config = match &global.config {
        Some(path) => Config::load(Path::new(path)).context("Failed to load configuration file")?,
        None => Config::load_or_default(root).context("Failed to load project configuration")?,
    };

    if let Some(database) = &global.database {
        config.database.path = database.clone();
    } else if config.database.path != MEMORY_DATABASE {
        let path = Path::new(&config.database.path);
        if path.is_relative() {
            config.database.path = root.join(path).display().to_string();
        }
    }

    if let Some(schema_file) = &global.schema_file {
        config.schema_file = schema_file.clone();
    }

    if let Some(table) = &global.version_table {
        config.version_table = TableName::parse(table.as_str())
            .with_context(|| format!("Invalid --version-table '{table}'"))?;
    }

    Ok(config)
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
