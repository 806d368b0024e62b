//! Migration file discovery
//!
//! Migrations live in one directory as `<version>[_<name>].sql` files, e.g.
//! `000001_create_singers.sql`. Anything else in the directory is ignored.

use regex::Regex;
use sd_sql::{split_statements, SqlDialect};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{CoreError, CoreResult};
use crate::migration::Migration;
use crate::migration_set::MigrationSet;

/// Zero-padded width of versions in generated file names.
const VERSION_WIDTH: usize = 6;

static MIGRATION_FILE_RE: OnceLock<Regex> = OnceLock::new();

fn migration_file_re() -> &'static Regex {
    MIGRATION_FILE_RE
        .get_or_init(|| Regex::new(r"^(\d+)(?:_(.+))?\.sql$").expect("valid regex literal"))
}

/// Parse a migration file name into `(version, name)`.
///
/// Returns `None` for files that are not migrations at all, and an error
/// for names that look like migrations but carry an unusable version.
pub fn parse_migration_file_name(file_name: &str) -> Option<CoreResult<(u64, Option<String>)>> {
    let caps = migration_file_re().captures(file_name)?;
    let digits = &caps[1];
    let name = caps.get(2).map(|m| m.as_str().to_string());

    let parsed = digits
        .parse::<u64>()
        .map_err(|e| CoreError::InvalidMigrationFileName {
            name: file_name.to_string(),
            reason: e.to_string(),
        })
        .and_then(|version| {
            if version == 0 || version > i64::MAX as u64 {
                Err(CoreError::InvalidMigrationFileName {
                    name: file_name.to_string(),
                    reason: format!("version must be between 1 and {}", i64::MAX),
                })
            } else {
                Ok((version, name))
            }
        });
    Some(parsed)
}

/// Migration files in `dir` as `(version, name, path)`, unsorted.
fn discover(dir: &Path) -> CoreResult<Vec<(u64, Option<String>, PathBuf)>> {
    if !dir.is_dir() {
        return Err(CoreError::MigrationsDirNotFound {
            path: dir.display().to_string(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match parse_migration_file_name(file_name) {
            Some(parsed) => {
                let (version, name) = parsed?;
                found.push((version, name, path));
            }
            None => log::debug!("Ignoring non-migration file {}", path.display()),
        }
    }
    Ok(found)
}

/// Load and classify every migration in `dir`.
pub fn load_migrations(dir: &Path, dialect: &dyn SqlDialect) -> CoreResult<MigrationSet> {
    let mut migrations = Vec::new();
    for (version, name, path) in discover(dir)? {
        let body = std::fs::read_to_string(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let statements = split_statements(dialect, &body)?;
        let migration = Migration::classify(version, name, statements, dialect)?;
        log::debug!(
            "Loaded migration {} ({}, {} statements)",
            migration.label(),
            migration.execution_mode(),
            migration.statements.len()
        );
        migrations.push(migration);
    }
    MigrationSet::new(migrations)
}

/// Create an empty migration file with the next free version.
///
/// The directory is created if missing. Returns the path of the new file.
pub fn create_migration_file(dir: &Path, name: Option<&str>) -> CoreResult<PathBuf> {
    if let Some(name) = name {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CoreError::InvalidMigrationName {
                name: name.to_string(),
            });
        }
    }

    std::fs::create_dir_all(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let next = discover(dir)?
        .iter()
        .map(|(version, _, _)| *version)
        .max()
        .unwrap_or(0)
        + 1;

    let file_name = match name {
        Some(name) => format!("{next:0width$}_{name}.sql", width = VERSION_WIDTH),
        None => format!("{next:0width$}.sql", width = VERSION_WIDTH),
    };
    let path = dir.join(file_name);
    std::fs::write(&path, "").map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path)
}

#[cfg(test)]
#[path = "loading_test.rs"]
mod tests;
