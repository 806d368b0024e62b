//! Ordered migration set and execution plans

use crate::error::{CoreError, CoreResult};
use crate::migration::Migration;

/// Migrations sorted ascending by version, with unique versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSet {
    migrations: Vec<Migration>,
}

impl MigrationSet {
    /// Sort migrations by version and reject duplicate versions.
    ///
    /// The sort is stable, so callers that feed the same input get the same
    /// order on every run.
    pub fn new(mut migrations: Vec<Migration>) -> CoreResult<Self> {
        migrations.sort_by_key(|m| m.version);

        if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
            return Err(CoreError::DuplicateMigrationVersion {
                version: pair[0].version,
                first: pair[0].label(),
                second: pair[1].label(),
            });
        }

        Ok(Self { migrations })
    }

    /// Iterate migrations in ascending version order.
    pub fn iter(&self) -> std::slice::Iter<'_, Migration> {
        self.migrations.iter()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Look up a migration by version.
    pub fn get(&self, version: u64) -> Option<&Migration> {
        self.migrations
            .binary_search_by_key(&version, |m| m.version)
            .ok()
            .map(|idx| &self.migrations[idx])
    }

    /// Pending migrations after `current`, limited to `limit` entries.
    ///
    /// `limit == 0` selects nothing, a negative limit selects every pending
    /// migration.
    pub fn plan(&self, current: u64, limit: i64) -> ExecutionPlan<'_> {
        let pending = self.migrations.iter().filter(|m| m.version > current);
        let migrations = match usize::try_from(limit) {
            Ok(n) => pending.take(n).collect(),
            Err(_) => pending.collect(),
        };
        ExecutionPlan { migrations }
    }
}

impl<'a> IntoIterator for &'a MigrationSet {
    type Item = &'a Migration;
    type IntoIter = std::slice::Iter<'a, Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.migrations.iter()
    }
}

/// The migrations one engine invocation will apply, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan<'a> {
    migrations: Vec<&'a Migration>,
}

impl<'a> ExecutionPlan<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Migration> + '_ {
        self.migrations.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Versions in application order.
    pub fn versions(&self) -> Vec<u64> {
        self.migrations.iter().map(|m| m.version).collect()
    }
}

#[cfg(test)]
#[path = "migration_set_test.rs"]
mod tests;
