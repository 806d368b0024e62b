//! End-to-end migration runs against an in-memory DuckDB database.
//!
//! Migrations are loaded from files in a temporary directory, and a
//! fault-injecting `Database` wrapper counts calls and fails chosen
//! primitives.

use async_trait::async_trait;
use sd_core::{Migration, MigrationSet, TableName};
use sd_db::{Database, DbError, DbResult, DuckDbBackend, Mutation, Operation, Row};
use sd_migrate::{ErrorKind, MigrationEvent, Migrator, ProgressSink, VersionState};
use sd_sql::{split_statements, DuckDbDialect};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Helpers ────────────────────────────────────────────────────────────

/// Wraps a real backend, counting statement dispatches and failing on demand.
struct FaultyDatabase {
    inner: DuckDbBackend,
    dispatched: AtomicUsize,
    fail_mutations: AtomicBool,
    fail_statements_containing: Mutex<Option<String>>,
}

impl FaultyDatabase {
    fn new() -> Self {
        Self {
            inner: DuckDbBackend::in_memory().unwrap(),
            dispatched: AtomicUsize::new(0),
            fail_mutations: AtomicBool::new(false),
            fail_statements_containing: Mutex::new(None),
        }
    }

    fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    fn fail_on(&self, needle: &str) {
        *self.fail_statements_containing.lock().unwrap() = Some(needle.to_string());
    }

    fn check(&self, statements: &[String]) -> DbResult<()> {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        let needle = self.fail_statements_containing.lock().unwrap().clone();
        match needle {
            Some(n) if statements.iter().any(|s| s.contains(&n)) => {
                Err(DbError::ExecutionError(format!("injected failure on '{n}'")))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Database for FaultyDatabase {
    fn db_type(&self) -> &'static str {
        self.inner.db_type()
    }

    async fn create_database(&self, statements: &[String]) -> DbResult<Operation> {
        self.inner.create_database(statements).await
    }

    async fn drop_database(&self) -> DbResult<()> {
        self.inner.drop_database().await
    }

    async fn database_ddl(&self) -> DbResult<Vec<String>> {
        self.inner.database_ddl().await
    }

    async fn update_ddl(&self, statements: &[String]) -> DbResult<Operation> {
        self.check(statements)?;
        self.inner.update_ddl(statements).await
    }

    async fn wait_operation(&self, operation: Operation) -> DbResult<()> {
        self.inner.wait_operation(operation).await
    }

    async fn execute_transaction(&self, statements: &[String]) -> DbResult<i64> {
        self.check(statements)?;
        self.inner.execute_transaction(statements).await
    }

    async fn write_mutations(&self, mutations: &[Mutation]) -> DbResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(DbError::ExecutionError("injected mutation failure".into()));
        }
        self.inner.write_mutations(mutations).await
    }

    async fn partitioned_update(&self, statement: &str) -> DbResult<i64> {
        self.check(std::slice::from_ref(&statement.to_string()))?;
        self.inner.partitioned_update(statement).await
    }

    async fn read_rows(
        &self,
        table: &str,
        columns: &[&str],
        limit: Option<usize>,
    ) -> DbResult<Vec<Row>> {
        self.inner.read_rows(table, columns, limit).await
    }

    async fn close(&self) -> DbResult<()> {
        self.inner.close().await
    }
}

#[derive(Default)]
struct Lines(Arc<Mutex<Vec<String>>>);

impl ProgressSink for Lines {
    fn notify(&self, event: &MigrationEvent) {
        self.0.lock().unwrap().push(event.to_string());
    }
}

struct Harness {
    db: Arc<FaultyDatabase>,
    migrator: Migrator,
    lines: Arc<Mutex<Vec<String>>>,
    table: TableName,
}

async fn harness() -> Harness {
    let db = Arc::new(FaultyDatabase::new());
    let lines = Lines::default();
    let captured = lines.0.clone();
    let migrator = Migrator::new(db.clone()).with_progress(Box::new(lines));
    let table = TableName::parse("SchemaMigrations").unwrap();
    migrator.ensure_migration_table(&table).await.unwrap();
    Harness {
        db,
        migrator,
        lines: captured,
        table,
    }
}

fn write_migrations(dir: &Path) {
    let files = [
        ("000001_create_singers.sql", "CREATE TABLE Singers (id BIGINT NOT NULL, name VARCHAR);\n"),
        (
            "000002_seed.sql",
            "INSERT INTO Singers VALUES (1, 'Marc');\nINSERT INTO Singers VALUES (2, 'Catalina');\n",
        ),
        ("000003_add_index.sql", "CREATE INDEX SingersByName ON Singers (name);\n"),
        ("000004_rename.sql", "-- bulk backfill\nUPDATE Singers SET name = upper(name);\n"),
        ("README.md", "not a migration"),
    ];
    for (name, body) in files {
        std::fs::write(dir.join(name), body).unwrap();
    }
}

fn lines(h: &Harness) -> Vec<String> {
    h.lines.lock().unwrap().clone()
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fresh_database_applies_everything() {
    let h = harness().await;
    let dir = tempfile::tempdir().unwrap();
    write_migrations(dir.path());
    let set = h.migrator.load_migrations(dir.path()).unwrap();
    assert_eq!(set.len(), 4);

    h.migrator.execute_migrations(&set, -1, &h.table).await.unwrap();

    assert_eq!(
        lines(&h),
        vec!["1/up create_singers", "2/up seed", "3/up add_index", "4/up rename"]
    );
    assert_eq!(
        h.migrator.get_migration_version(&h.table).await.unwrap(),
        VersionState::Clean { version: 4 }
    );

    let names = h
        .db
        .read_rows("Singers", &["name"], None)
        .await
        .unwrap()
        .into_iter()
        .filter_map(|row| match &row[0] {
            sd_db::Value::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert!(names.contains(&"MARC".to_string()));
}

#[tokio::test]
async fn test_second_run_reports_no_change() {
    let h = harness().await;
    let dir = tempfile::tempdir().unwrap();
    write_migrations(dir.path());
    let set = h.migrator.load_migrations(dir.path()).unwrap();

    h.migrator.execute_migrations(&set, -1, &h.table).await.unwrap();
    h.lines.lock().unwrap().clear();
    let before = h.db.dispatched();

    let report = h.migrator.execute_migrations(&set, -1, &h.table).await.unwrap();

    assert!(report.is_no_change());
    assert_eq!(lines(&h), vec!["no change"]);
    assert_eq!(h.db.dispatched(), before);
}

#[tokio::test]
async fn test_limit_from_clean_two_applies_only_next() {
    let h = harness().await;
    let set = MigrationSet::new(
        (1..=4)
            .map(|v| Migration::ddl(v, None, vec![format!("CREATE TABLE T{v} (id BIGINT)")]))
            .collect(),
    )
    .unwrap();
    h.migrator
        .set_migration_version(VersionState::Clean { version: 2 }, &h.table)
        .await
        .unwrap();

    h.migrator.execute_migrations(&set, 1, &h.table).await.unwrap();

    assert_eq!(lines(&h), vec!["3/up"]);
    assert_eq!(
        h.migrator.get_migration_version(&h.table).await.unwrap(),
        VersionState::Clean { version: 3 }
    );
    assert!(h.db.read_rows("T4", &["id"], None).await.is_err());

    h.lines.lock().unwrap().clear();
    h.migrator.execute_migrations(&set, 5, &h.table).await.unwrap();
    assert_eq!(lines(&h), vec!["4/up"]);
}

#[tokio::test]
async fn test_dirty_record_blocks_every_limit() {
    let h = harness().await;
    let dir = tempfile::tempdir().unwrap();
    write_migrations(dir.path());
    let set = h.migrator.load_migrations(dir.path()).unwrap();
    h.migrator
        .set_migration_version(VersionState::Dirty { version: 1 }, &h.table)
        .await
        .unwrap();

    for limit in [-1, 0, 1, 10] {
        let err = h
            .migrator
            .execute_migrations(&set, limit, &h.table)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MigrationVersionDirty);
        assert!(err.to_string().contains("1 is dirty"));
    }
    assert_eq!(h.db.dispatched(), 1);
    assert!(lines(&h).is_empty());
}

#[tokio::test]
async fn test_failure_leaves_dirty_until_operator_resets() {
    let h = harness().await;
    let dir = tempfile::tempdir().unwrap();
    write_migrations(dir.path());
    let set = h.migrator.load_migrations(dir.path()).unwrap();
    h.db.fail_on("CREATE INDEX");

    let err = h
        .migrator
        .execute_migrations(&set, -1, &h.table)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExecuteMigrations);
    assert_eq!(err.root_kind(), ErrorKind::UpdateDdl);
    assert_eq!(lines(&h), vec!["1/up create_singers", "2/up seed"]);
    assert_eq!(
        h.migrator.get_migration_version(&h.table).await.unwrap(),
        VersionState::Dirty { version: 3 }
    );

    let err = h
        .migrator
        .execute_migrations(&set, -1, &h.table)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MigrationVersionDirty);

    // Operator fixes the database by hand, then marks 3 as applied.
    *h.db.fail_statements_containing.lock().unwrap() = None;
    h.migrator
        .apply_ddl(&["CREATE INDEX SingersByName ON Singers (name)".to_string()])
        .await
        .unwrap();
    h.migrator
        .set_migration_version(VersionState::Clean { version: 3 }, &h.table)
        .await
        .unwrap();

    h.lines.lock().unwrap().clear();
    h.migrator.execute_migrations(&set, -1, &h.table).await.unwrap();
    assert_eq!(lines(&h), vec!["4/up rename"]);
}

#[tokio::test]
async fn test_bookkeeping_failure_aborts_before_statements() {
    let h = harness().await;
    let set = MigrationSet::new(vec![Migration::ddl(
        1,
        None,
        vec!["CREATE TABLE T (id BIGINT)".to_string()],
    )])
    .unwrap();
    h.db.fail_mutations.store(true, Ordering::SeqCst);
    let before = h.db.dispatched();

    let err = h
        .migrator
        .execute_migrations(&set, -1, &h.table)
        .await
        .unwrap_err();

    assert_eq!(err.root_kind(), ErrorKind::SetMigrationVersion);
    assert_eq!(h.db.dispatched(), before);
}

#[tokio::test]
async fn test_partitioned_failure_reports_rows_and_stays_dirty() {
    let h = harness().await;
    let set = MigrationSet::new(vec![
        Migration::ddl(1, None, vec!["CREATE TABLE T (id BIGINT)".to_string()]),
        Migration::dml(
            2,
            None,
            vec!["INSERT INTO T VALUES (1), (2), (3)".to_string()],
            false,
        ),
        Migration::dml(
            3,
            None,
            vec![
                "DELETE FROM T WHERE id = 1".to_string(),
                "UPDATE T SET id = 0 WHERE id = 99".to_string(),
            ],
            true,
        ),
    ])
    .unwrap();
    h.db.fail_on("id = 99");

    let err = h
        .migrator
        .execute_migrations(&set, -1, &h.table)
        .await
        .unwrap_err();

    match err {
        sd_migrate::MigrateError::ExecuteMigrations(inner) => match *inner {
            sd_migrate::MigrateError::UpdatePartitionedDml { rows_affected, .. } => {
                assert_eq!(rows_affected, 1)
            }
            other => panic!("unexpected inner error: {other}"),
        },
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.db.read_rows("T", &["id"], None).await.unwrap().len(), 2);
    assert_eq!(
        h.migrator.get_migration_version(&h.table).await.unwrap(),
        VersionState::Dirty { version: 3 }
    );
}

#[tokio::test]
async fn test_loaded_schema_splits_back_to_database_ddl() {
    let h = harness().await;
    let dir = tempfile::tempdir().unwrap();
    write_migrations(dir.path());
    let set = h.migrator.load_migrations(dir.path()).unwrap();
    h.migrator.execute_migrations(&set, -1, &h.table).await.unwrap();

    let schema = h.migrator.load_schema().await.unwrap();
    let split = split_statements(&DuckDbDialect::new(), &schema).unwrap();

    assert_eq!(split, h.db.database_ddl().await.unwrap());
    assert_eq!(split.len(), 3);
}

#[tokio::test]
async fn test_close_rejects_further_calls() {
    let h = harness().await;
    h.migrator.close().await.unwrap();

    let err = h
        .migrator
        .get_migration_version(&h.table)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GetMigrationVersion);
}
