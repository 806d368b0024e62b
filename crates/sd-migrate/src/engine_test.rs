use super::*;
use crate::error::ErrorKind;
use async_trait::async_trait;
use sd_db::DuckDbBackend;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct RecordingProgress {
    events: Arc<Mutex<Vec<MigrationEvent>>>,
}

impl ProgressSink for RecordingProgress {
    fn notify(&self, event: &MigrationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Version store whose `set` fails from the `fail_at`-th call on.
struct FlakyStore<'a> {
    inner: TableVersionStore<'a>,
    sets: AtomicUsize,
    fail_at: usize,
}

#[async_trait]
impl VersionStore for FlakyStore<'_> {
    async fn get(&self) -> MigrateResult<VersionState> {
        self.inner.get().await
    }

    async fn set(&self, state: VersionState) -> MigrateResult<()> {
        let n = self.sets.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= self.fail_at {
            return Err(MigrateError::SetMigrationVersion(sd_db::DbError::Internal(
                "injected".into(),
            )));
        }
        self.inner.set(state).await
    }

    async fn ensure(&self) -> MigrateResult<()> {
        self.inner.ensure().await
    }
}

fn table() -> TableName {
    TableName::parse("SchemaMigrations").unwrap()
}

fn migrator() -> (Migrator, Arc<Mutex<Vec<MigrationEvent>>>) {
    let progress = RecordingProgress::default();
    let events = progress.events.clone();
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    (Migrator::new(db).with_progress(Box::new(progress)), events)
}

fn sample_set() -> MigrationSet {
    MigrationSet::new(vec![
        Migration::ddl(
            1,
            Some("create_singers".into()),
            vec!["CREATE TABLE Singers (id BIGINT NOT NULL, name VARCHAR)".into()],
        ),
        Migration::dml(
            2,
            None,
            vec![
                "INSERT INTO Singers VALUES (1, 'a')".into(),
                "INSERT INTO Singers VALUES (2, 'b')".into(),
            ],
            false,
        ),
        Migration::dml(
            3,
            Some("bump_ids".into()),
            vec!["UPDATE Singers SET id = id + 10".into()],
            true,
        ),
    ])
    .unwrap()
}

async fn singer_ids(m: &Migrator) -> Vec<i64> {
    let mut ids: Vec<i64> = m
        .database()
        .read_rows("Singers", &["id"], None)
        .await
        .unwrap()
        .iter()
        .filter_map(|row| row[0].as_i64())
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_applies_all_pending_in_order() {
    let (m, events) = migrator();
    let t = table();
    m.ensure_migration_table(&t).await.unwrap();

    let report = m.execute_migrations(&sample_set(), -1, &t).await.unwrap();

    assert_eq!(report.starting, VersionState::Clean { version: 0 });
    assert_eq!(report.final_version(), 3);
    let modes: Vec<_> = report.applied.iter().map(|a| a.mode).collect();
    assert_eq!(
        modes,
        vec![
            ExecutionMode::StructuralApply,
            ExecutionMode::TransactionalDataApply,
            ExecutionMode::PartitionedDataApply,
        ]
    );
    assert_eq!(report.applied[1].rows_affected, 2);
    assert_eq!(report.applied[2].rows_affected, 2);

    assert_eq!(
        m.get_migration_version(&t).await.unwrap(),
        VersionState::Clean { version: 3 }
    );
    assert_eq!(singer_ids(&m).await, vec![11, 12]);

    let lines: Vec<String> = events.lock().unwrap().iter().map(|e| e.to_string()).collect();
    assert_eq!(lines, vec!["1/up create_singers", "2/up", "3/up bump_ids"]);
}

#[tokio::test]
async fn test_limit_applies_prefix() {
    let (m, _) = migrator();
    let t = table();
    m.ensure_migration_table(&t).await.unwrap();

    let report = m.execute_migrations(&sample_set(), 1, &t).await.unwrap();
    assert_eq!(report.final_version(), 1);

    let report = m.execute_migrations(&sample_set(), 1, &t).await.unwrap();
    assert_eq!(report.starting.version(), 1);
    assert_eq!(report.final_version(), 2);
}

#[tokio::test]
async fn test_zero_limit_is_no_change() {
    let (m, events) = migrator();
    let t = table();
    m.ensure_migration_table(&t).await.unwrap();

    let report = m.execute_migrations(&sample_set(), 0, &t).await.unwrap();

    assert!(report.is_no_change());
    assert_eq!(*events.lock().unwrap(), vec![MigrationEvent::NoChange]);
    assert_eq!(
        m.get_migration_version(&t).await.unwrap_err().kind(),
        ErrorKind::NoMigration
    );
}

#[tokio::test]
async fn test_up_to_date_is_no_change() {
    let (m, events) = migrator();
    let t = table();
    m.ensure_migration_table(&t).await.unwrap();
    m.execute_migrations(&sample_set(), -1, &t).await.unwrap();
    events.lock().unwrap().clear();

    let report = m.execute_migrations(&sample_set(), -1, &t).await.unwrap();

    assert!(report.is_no_change());
    assert_eq!(report.final_version(), 3);
    assert_eq!(*events.lock().unwrap(), vec![MigrationEvent::NoChange]);
}

#[tokio::test]
async fn test_dirty_version_blocks_run() {
    let (m, events) = migrator();
    let t = table();
    m.ensure_migration_table(&t).await.unwrap();
    m.set_migration_version(VersionState::Dirty { version: 1 }, &t)
        .await
        .unwrap();

    let err = m
        .execute_migrations(&sample_set(), -1, &t)
        .await
        .unwrap_err();

    assert!(matches!(err, MigrateError::MigrationVersionDirty { version: 1 }));
    assert!(events.lock().unwrap().is_empty());
    assert!(m
        .database()
        .read_rows("Singers", &["id"], None)
        .await
        .is_err());
}

#[tokio::test]
async fn test_failed_migration_leaves_version_dirty() {
    let (m, _) = migrator();
    let t = table();
    m.ensure_migration_table(&t).await.unwrap();
    let set = MigrationSet::new(vec![
        Migration::ddl(1, None, vec!["CREATE TABLE Singers (id BIGINT)".into()]),
        Migration::dml(
            2,
            None,
            vec!["INSERT INTO Singers VALUES (1)".into(), "INSERT INTO Missing VALUES (1)".into()],
            false,
        ),
    ])
    .unwrap();

    let err = m.execute_migrations(&set, -1, &t).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExecuteMigrations);
    assert_eq!(err.root_kind(), ErrorKind::UpdateDml);
    assert_eq!(
        m.get_migration_version(&t).await.unwrap(),
        VersionState::Dirty { version: 2 }
    );
    assert!(singer_ids(&m).await.is_empty());
}

#[tokio::test]
async fn test_missing_version_table_aborts() {
    let (m, _) = migrator();
    let t = table();

    let err = m
        .execute_migrations(&sample_set(), -1, &t)
        .await
        .unwrap_err();

    assert_eq!(err.root_kind(), ErrorKind::GetMigrationVersion);
}

#[tokio::test]
async fn test_failure_to_mark_clean_keeps_changes_and_dirty_flag() {
    let (m, events) = migrator();
    let t = table();
    m.ensure_migration_table(&t).await.unwrap();
    let store = FlakyStore {
        inner: m.version_store(&t),
        sets: AtomicUsize::new(0),
        fail_at: 2,
    };

    let err = m
        .execute_migrations_with_store(&sample_set(), -1, &store)
        .await
        .unwrap_err();

    assert_eq!(err.root_kind(), ErrorKind::SetMigrationVersion);
    assert_eq!(
        m.get_migration_version(&t).await.unwrap(),
        VersionState::Dirty { version: 1 }
    );
    // Statements ran and were reported before the bookkeeping failed.
    assert!(singer_ids(&m).await.is_empty());
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failure_to_mark_dirty_runs_nothing() {
    let (m, events) = migrator();
    let t = table();
    m.ensure_migration_table(&t).await.unwrap();
    let store = FlakyStore {
        inner: m.version_store(&t),
        sets: AtomicUsize::new(0),
        fail_at: 1,
    };

    let err = m
        .execute_migrations_with_store(&sample_set(), -1, &store)
        .await
        .unwrap_err();

    assert_eq!(err.root_kind(), ErrorKind::SetMigrationVersion);
    assert!(events.lock().unwrap().is_empty());
    assert!(m
        .database()
        .read_rows("Singers", &["id"], None)
        .await
        .is_err());
}

#[tokio::test]
async fn test_load_migrations_reports_mixed_kinds() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("000001_mixed.sql"),
        "CREATE TABLE t (id BIGINT);\nINSERT INTO t VALUES (1);\n",
    )
    .unwrap();
    let (m, _) = migrator();

    let err = m.load_migrations(dir.path()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownStatementKind);
}
