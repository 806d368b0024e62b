use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_migrate_up_limit() {
    let cli = Cli::try_parse_from(["spindle", "migrate", "up", "2"]).unwrap();
    match cli.command {
        Commands::Migrate(MigrateArgs {
            command: MigrateCommands::Up(args),
        }) => assert_eq!(args.limit, Some(2)),
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from(["spindle", "migrate", "up"]).unwrap();
    match cli.command {
        Commands::Migrate(MigrateArgs {
            command: MigrateCommands::Up(args),
        }) => assert_eq!(args.limit, None),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_apply_requires_exactly_one_file() {
    assert!(Cli::try_parse_from(["spindle", "apply"]).is_err());
    assert!(Cli::try_parse_from(["spindle", "apply", "--ddl", "a.sql", "--dml", "b.sql"]).is_err());
    assert!(Cli::try_parse_from(["spindle", "apply", "--ddl", "a.sql", "--partitioned"]).is_err());

    let cli =
        Cli::try_parse_from(["spindle", "apply", "--dml", "b.sql", "--partitioned"]).unwrap();
    match cli.command {
        Commands::Apply(args) => {
            assert_eq!(args.dml.as_deref(), Some("b.sql"));
            assert!(args.partitioned);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_migrate_set_dirty() {
    let cli = Cli::try_parse_from(["spindle", "migrate", "set", "7", "--dirty"]).unwrap();
    match cli.command {
        Commands::Migrate(MigrateArgs {
            command: MigrateCommands::Set(args),
        }) => {
            assert_eq!(args.version, 7);
            assert!(args.dirty);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_global_overrides() {
    let cli = Cli::try_parse_from([
        "spindle",
        "migrate",
        "version",
        "--database",
        "app.duckdb",
        "--version-table",
        "Versions",
        "-o",
        "json",
    ])
    .unwrap();
    assert_eq!(cli.global.database.as_deref(), Some("app.duckdb"));
    assert_eq!(cli.global.version_table.as_deref(), Some("Versions"));
    match cli.command {
        Commands::Migrate(MigrateArgs {
            command: MigrateCommands::Version(args),
        }) => assert_eq!(args.output, VersionOutput::Json),
        other => panic!("unexpected command: {other:?}"),
    }
}
