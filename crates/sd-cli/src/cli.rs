//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Spindle - schema migrations for relational databases
#[derive(Parser, Debug)]
#[command(name = "spindle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory holding spindle.yml, the schema file and migrations
    #[arg(short, long, global = true, default_value = ".")]
    pub directory: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path (DuckDB file or :memory:, default spindle.duckdb)
    #[arg(long, global = true, env = "SPINDLE_DATABASE")]
    pub database: Option<String>,

    /// Override schema file path
    #[arg(long, global = true)]
    pub schema_file: Option<String>,

    /// Override version table name
    #[arg(long, global = true)]
    pub version_table: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database from the schema file
    Create,

    /// Drop the database
    Drop,

    /// Drop the database and create it again from the schema file
    Reset,

    /// Write the database's current schema to the schema file
    Load,

    /// Apply a DDL or DML file directly
    Apply(ApplyArgs),

    /// Manage versioned migrations
    Migrate(MigrateArgs),
}

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// DDL file to apply as one structural change
    #[arg(long, required_unless_present = "dml", conflicts_with = "dml")]
    pub ddl: Option<String>,

    /// DML file to apply as data changes
    #[arg(long)]
    pub dml: Option<String>,

    /// Run each DML statement as an independent large-scale update
    #[arg(long, requires = "dml")]
    pub partitioned: bool,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommands,
}

/// Migrate subcommands
#[derive(Subcommand, Debug)]
pub enum MigrateCommands {
    /// Apply pending migrations
    Up(MigrateUpArgs),

    /// Create a new, empty migration file
    Create(MigrateCreateArgs),

    /// Show the recorded migration version
    Version(MigrateVersionArgs),

    /// Overwrite the recorded migration version
    Set(MigrateSetArgs),
}

/// Arguments for migrate up
#[derive(Args, Debug)]
pub struct MigrateUpArgs {
    /// Apply at most LIMIT migrations (default: all pending)
    #[arg(allow_negative_numbers = true)]
    pub limit: Option<i64>,
}

/// Arguments for migrate create
#[derive(Args, Debug)]
pub struct MigrateCreateArgs {
    /// Name appended to the version in the file name
    pub name: Option<String>,
}

/// Arguments for migrate version
#[derive(Args, Debug)]
pub struct MigrateVersionArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: VersionOutput,
}

/// Version output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOutput {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Arguments for migrate set
#[derive(Args, Debug)]
pub struct MigrateSetArgs {
    /// Version to record
    pub version: u64,

    /// Record the version as dirty
    #[arg(long)]
    pub dirty: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
