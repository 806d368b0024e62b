//! Configuration types and parsing for spindle.yml

use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;
use sd_sql::{DuckDbDialect, GoogleSqlDialect, SqlDialect};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names looked up in a project directory, in order.
const CONFIG_FILE_NAMES: &[&str] = &["spindle.yml", "spindle.yaml"];

const DEFAULT_DB_PATH: &str = "spindle.duckdb";

const DEFAULT_VERSION_TABLE: &str = "SchemaMigrations";

/// Project configuration from spindle.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Target database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// SQL dialect used to split and classify migration files
    #[serde(default)]
    pub dialect: Dialect,

    /// Directory holding `<version>[_<name>].sql` migration files
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,

    /// Structural definition file read by `create`/`reset` and written by `load`
    #[serde(default = "default_schema_file")]
    pub schema_file: String,

    /// Table recording the applied migration version
    #[serde(default = "default_version_table")]
    pub version_table: TableName,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB database file, or `:memory:`. Relative paths resolve against the
    /// project directory.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// DuckDB SQL dialect
    #[default]
    DuckDb,
    /// GoogleSQL (Spanner) dialect
    GoogleSql,
}

impl Dialect {
    /// Build the lexer-level dialect for splitting and classification.
    pub fn sql_dialect(self) -> Box<dyn SqlDialect> {
        match self {
            Dialect::DuckDb => Box::new(DuckDbDialect::new()),
            Dialect::GoogleSql => Box::new(GoogleSqlDialect::new()),
        }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_migrations_dir() -> String {
    "migrations".to_string()
}

fn default_schema_file() -> String {
    "schema.sql".to_string()
}

fn default_version_table() -> TableName {
    TableName::parse(DEFAULT_VERSION_TABLE).expect("default version table name is valid")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            dialect: Dialect::default(),
            migrations_dir: default_migrations_dir(),
            schema_file: default_schema_file(),
            version_table: default_version_table(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory, falling back to the
    /// defaults when the directory has no config file.
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!("No config file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        if self.migrations_dir.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_dir cannot be empty".to_string(),
            });
        }
        if self.schema_file.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "schema_file cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Migrations directory resolved against the project root
    pub fn migrations_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_dir)
    }

    /// Schema file resolved against the project root
    pub fn schema_file_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.schema_file)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
