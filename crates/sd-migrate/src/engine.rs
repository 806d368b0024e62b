//! Migration engine
//!
//! A run reads the recorded version, refuses to start if it is dirty, and
//! then applies each pending migration with the same three steps: record the
//! version as dirty, dispatch the statements, record the version as clean.

use crate::error::{MigrateError, MigrateResult};
use crate::progress::{LogProgress, MigrationEvent, ProgressSink};
use crate::version::{TableVersionStore, VersionState, VersionStore};
use sd_core::{load_migrations, Config, ExecutionMode, Migration, MigrationSet, TableName};
use sd_db::{Database, DuckDbBackend};
use sd_sql::{DuckDbDialect, SqlDialect};
use std::path::Path;
use std::sync::Arc;

/// One migration completed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: u64,
    pub name: Option<String>,
    pub mode: ExecutionMode,
    /// Rows affected by data changes; 0 for structural changes
    pub rows_affected: i64,
}

/// Outcome of [`Migrator::execute_migrations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// State recorded when the run started
    pub starting: VersionState,
    /// Migrations applied, in order
    pub applied: Vec<AppliedMigration>,
}

impl MigrationReport {
    pub fn is_no_change(&self) -> bool {
        self.applied.is_empty()
    }

    /// Version recorded after the run
    pub fn final_version(&self) -> u64 {
        self.applied
            .last()
            .map(|m| m.version)
            .unwrap_or_else(|| self.starting.version())
    }
}

/// Owns a database client and applies migrations through it.
pub struct Migrator {
    db: Arc<dyn Database>,
    dialect: Box<dyn SqlDialect>,
    progress: Box<dyn ProgressSink>,
}

impl Migrator {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            dialect: Box::new(DuckDbDialect::new()),
            progress: Box::new(LogProgress),
        }
    }

    /// Open the database named by `config`.
    pub fn connect(config: &Config) -> MigrateResult<Self> {
        let backend =
            DuckDbBackend::new(&config.database.path).map_err(MigrateError::CreateClient)?;
        let dialect = config.dialect.sql_dialect();
        log::debug!("Opened {} client for {}", dialect.name(), config.database.path);
        Ok(Self::new(Arc::new(backend)).with_dialect(dialect))
    }

    /// Dialect used to split and classify statement files
    pub fn with_dialect(mut self, dialect: Box<dyn SqlDialect>) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn database(&self) -> &dyn Database {
        self.db.as_ref()
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    /// Release the client.
    pub async fn close(&self) -> MigrateResult<()> {
        self.db.close().await.map_err(MigrateError::CloseClient)
    }

    /// Version store over `table` in this client's database.
    pub fn version_store<'a>(&'a self, table: &'a TableName) -> TableVersionStore<'a> {
        TableVersionStore::new(self.db.as_ref(), table)
    }

    pub async fn ensure_migration_table(&self, table: &TableName) -> MigrateResult<()> {
        self.version_store(table).ensure().await
    }

    pub async fn get_migration_version(&self, table: &TableName) -> MigrateResult<VersionState> {
        self.version_store(table).get().await
    }

    pub async fn set_migration_version(
        &self,
        state: VersionState,
        table: &TableName,
    ) -> MigrateResult<()> {
        self.version_store(table).set(state).await
    }

    /// Load and classify the migration files in `dir`.
    pub fn load_migrations(&self, dir: &Path) -> MigrateResult<MigrationSet> {
        let migrations = load_migrations(dir, self.dialect())?;
        log::debug!("Loaded {} migrations from {}", migrations.len(), dir.display());
        Ok(migrations)
    }

    /// Apply up to `limit` pending migrations, tracking progress in `table`.
    ///
    /// A negative `limit` applies every pending migration; `0` applies none.
    pub async fn execute_migrations(
        &self,
        migrations: &MigrationSet,
        limit: i64,
        table: &TableName,
    ) -> MigrateResult<MigrationReport> {
        let store = self.version_store(table);
        self.execute_migrations_with_store(migrations, limit, &store)
            .await
    }

    /// [`Migrator::execute_migrations`] against any [`VersionStore`].
    pub async fn execute_migrations_with_store(
        &self,
        migrations: &MigrationSet,
        limit: i64,
        store: &dyn VersionStore,
    ) -> MigrateResult<MigrationReport> {
        let starting = match store.get().await {
            Ok(state) => state,
            Err(MigrateError::NoMigration) => VersionState::Clean { version: 0 },
            Err(e) => return Err(MigrateError::execute(e)),
        };

        if let VersionState::Dirty { version } = starting {
            log::warn!("Refusing to migrate: version {version} is dirty");
            return Err(MigrateError::MigrationVersionDirty { version });
        }

        let plan = migrations.plan(starting.version(), limit);
        log::debug!(
            "Current version {}, {} pending migrations selected",
            starting,
            plan.len()
        );

        let mut applied = Vec::with_capacity(plan.len());
        for migration in plan.iter() {
            let version = migration.version;

            store
                .set(VersionState::Dirty { version })
                .await
                .map_err(MigrateError::execute)?;

            let rows_affected = self
                .apply_migration(migration)
                .await
                .map_err(MigrateError::execute)?;

            self.progress.notify(&MigrationEvent::Applied {
                version,
                name: migration.name.clone(),
            });

            store
                .set(VersionState::Clean { version })
                .await
                .map_err(MigrateError::execute)?;

            applied.push(AppliedMigration {
                version,
                name: migration.name.clone(),
                mode: migration.execution_mode(),
                rows_affected,
            });
        }

        if applied.is_empty() {
            self.progress.notify(&MigrationEvent::NoChange);
        }

        Ok(MigrationReport { starting, applied })
    }

    async fn apply_migration(&self, migration: &Migration) -> MigrateResult<i64> {
        let mode = migration.execution_mode();
        log::debug!(
            "Applying migration {} ({mode}, {} statements)",
            migration.label(),
            migration.statements.len()
        );

        match mode {
            ExecutionMode::StructuralApply => {
                self.apply_ddl(&migration.statements).await?;
                Ok(0)
            }
            ExecutionMode::TransactionalDataApply => self.apply_dml(&migration.statements).await,
            ExecutionMode::PartitionedDataApply => {
                self.apply_partitioned_dml(&migration.statements).await
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
