//! Spindle CLI - schema migrations and database administration

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use commands::{apply, create, drop, load, migrate, reset};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        Commands::Create => create::execute(&cli.global).await,
        Commands::Drop => drop::execute(&cli.global).await,
        Commands::Reset => reset::execute(&cli.global).await,
        Commands::Load => load::execute(&cli.global).await,
        Commands::Apply(args) => apply::execute(args, &cli.global).await,
        Commands::Migrate(args) => migrate::execute(args, &cli.global).await,
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}
