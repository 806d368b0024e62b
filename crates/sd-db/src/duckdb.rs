//! DuckDB database backend implementation
//!
//! DuckDB runs in-process, so long-running operations are modelled as
//! accepted-then-executed work: `create_database` and `update_ddl` only
//! validate and queue the request, and `wait_operation` runs it. Failures of
//! the statements themselves therefore surface when the operation is awaited.

use crate::error::{DbError, DbResult};
use crate::traits::{Database, Operation, OperationKind};
use crate::value::{Mutation, Row, Value};
use async_trait::async_trait;
use duckdb::types::{ToSqlOutput, Value as DuckValue};
use duckdb::{Connection, ToSql};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Structural statements of user objects, in creation order.
const DATABASE_DDL_SQL: &str = "\
SELECT sql FROM (
    SELECT table_oid AS oid, sql FROM duckdb_tables()
        WHERE NOT internal AND NOT temporary AND database_name = current_database()
    UNION ALL
    SELECT view_oid AS oid, sql FROM duckdb_views()
        WHERE NOT internal AND NOT temporary AND database_name = current_database()
    UNION ALL
    SELECT index_oid AS oid, sql FROM duckdb_indexes()
        WHERE sql IS NOT NULL AND database_name = current_database()
) ORDER BY oid";

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DbLocation {
    Memory,
    File(PathBuf),
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbLocation::Memory => f.write_str(":memory:"),
            DbLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Work accepted by `create_database`/`update_ddl`, run on wait.
#[derive(Debug)]
struct PendingOperation {
    kind: OperationKind,
    statements: Vec<String>,
}

/// DuckDB database backend
pub struct DuckDbBackend {
    location: DbLocation,
    conn: Mutex<Option<Connection>>,
    operations: Mutex<HashMap<u64, PendingOperation>>,
    next_operation: AtomicU64,
    closed: AtomicBool,
}

impl DuckDbBackend {
    fn with_location(location: DbLocation, conn: Option<Connection>) -> Self {
        Self {
            location,
            conn: Mutex::new(conn),
            operations: Mutex::new(HashMap::new()),
            next_operation: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a new in-memory DuckDB database
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::with_location(DbLocation::Memory, Some(conn)))
    }

    /// Attach to a DuckDB database file.
    ///
    /// A missing file is not an error: the client starts detached and the
    /// database can be created with [`Database::create_database`].
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = if path.exists() {
            Some(Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?)
        } else {
            None
        };
        Ok(Self::with_location(
            DbLocation::File(path.to_path_buf()),
            conn,
        ))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock_conn(&self) -> DbResult<MutexGuard<'_, Option<Connection>>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DbError::ConnectionClosed);
        }
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Run `body` against the open connection.
    fn with_conn<T>(&self, body: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let guard = self.lock_conn()?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| DbError::DatabaseNotFound(self.location.to_string()))?;
        body(conn)
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    fn transaction<T>(
        conn: &Connection,
        body: impl FnOnce(&Connection) -> DbResult<T>,
    ) -> DbResult<T> {
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        let result = body(conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = conn.execute_batch("COMMIT") {
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(DbError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => {
                let _ = conn.execute_batch("ROLLBACK");
            }
        }
        result
    }

    fn execute_statements(conn: &Connection, statements: &[String]) -> DbResult<i64> {
        let mut affected = 0i64;
        for sql in statements {
            let rows = conn
                .execute(sql, [])
                .map_err(|e| annotate(DbError::from(e), sql))?;
            affected += rows as i64;
        }
        Ok(affected)
    }

    fn queue_operation(&self, kind: OperationKind, statements: &[String]) -> DbResult<Operation> {
        let id = self.next_operation.fetch_add(1, Ordering::SeqCst);
        let mut operations = self
            .operations
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        operations.insert(
            id,
            PendingOperation {
                kind,
                statements: statements.to_vec(),
            },
        );
        log::debug!("Accepted {kind:?} operation {id} ({} statements)", statements.len());
        Ok(Operation { id, kind })
    }

    fn take_operation(&self, operation: &Operation) -> DbResult<PendingOperation> {
        let mut operations = self
            .operations
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        match operations.remove(&operation.id) {
            Some(pending) if pending.kind == operation.kind => Ok(pending),
            Some(pending) => {
                operations.insert(operation.id, pending);
                Err(DbError::OperationNotFound(operation.id))
            }
            None => Err(DbError::OperationNotFound(operation.id)),
        }
    }

    fn open_connection(&self) -> DbResult<Connection> {
        match &self.location {
            DbLocation::Memory => Connection::open_in_memory(),
            DbLocation::File(path) => Connection::open(path),
        }
        .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    fn remove_files(&self) -> DbResult<()> {
        if let DbLocation::File(path) = &self.location {
            if path.exists() {
                std::fs::remove_file(path).map_err(|e| DbError::Internal(e.to_string()))?;
            }
            let wal_path = wal_path(path);
            if wal_path.exists() {
                let _ = std::fs::remove_file(&wal_path);
            }
        }
        Ok(())
    }

    fn database_exists(&self, conn: &Option<Connection>) -> bool {
        match &self.location {
            DbLocation::Memory => conn.is_some(),
            DbLocation::File(path) => conn.is_some() || path.exists(),
        }
    }

    fn run_create_database(&self, statements: &[String]) -> DbResult<()> {
        let mut guard = self.lock_conn()?;
        if self.database_exists(&guard) {
            return Err(DbError::DatabaseExists(self.location.to_string()));
        }

        let conn = self.open_connection()?;
        if let Err(e) = Self::transaction(&conn, |c| Self::execute_statements(c, statements)) {
            drop(conn);
            self.remove_files()?;
            return Err(e);
        }
        *guard = Some(conn);
        Ok(())
    }

    fn run_update_ddl(&self, statements: &[String]) -> DbResult<()> {
        self.with_conn(|conn| {
            Self::transaction(conn, |c| Self::execute_statements(c, statements)).map(|_| ())
        })
    }
}

fn wal_path(path: &Path) -> PathBuf {
    let mut wal = path.as_os_str().to_owned();
    wal.push(".wal");
    PathBuf::from(wal)
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Attach the failing statement to execution errors.
fn annotate(err: DbError, sql: &str) -> DbError {
    match err {
        DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{msg}: {sql}")),
        other => other,
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let value = match self {
            Value::Null => DuckValue::Null,
            Value::Bool(v) => DuckValue::Boolean(*v),
            Value::Int64(v) => DuckValue::BigInt(*v),
            Value::Float64(v) => DuckValue::Double(*v),
            Value::String(v) => DuckValue::Text(v.clone()),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

impl From<DuckValue> for Value {
    fn from(value: DuckValue) -> Self {
        match value {
            DuckValue::Null => Value::Null,
            DuckValue::Boolean(v) => Value::Bool(v),
            DuckValue::TinyInt(v) => Value::Int64(v.into()),
            DuckValue::SmallInt(v) => Value::Int64(v.into()),
            DuckValue::Int(v) => Value::Int64(v.into()),
            DuckValue::BigInt(v) => Value::Int64(v),
            DuckValue::UTinyInt(v) => Value::Int64(v.into()),
            DuckValue::USmallInt(v) => Value::Int64(v.into()),
            DuckValue::UInt(v) => Value::Int64(v.into()),
            DuckValue::Float(v) => Value::Float64(v.into()),
            DuckValue::Double(v) => Value::Float64(v),
            DuckValue::Text(v) => Value::String(v),
            other => Value::String(format!("{other:?}")),
        }
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    async fn create_database(&self, statements: &[String]) -> DbResult<Operation> {
        {
            let guard = self.lock_conn()?;
            if self.database_exists(&guard) {
                return Err(DbError::DatabaseExists(self.location.to_string()));
            }
        }
        self.queue_operation(OperationKind::CreateDatabase, statements)
    }

    async fn drop_database(&self) -> DbResult<()> {
        let mut guard = self.lock_conn()?;
        if !self.database_exists(&guard) {
            return Err(DbError::DatabaseNotFound(self.location.to_string()));
        }
        if let Some(conn) = guard.take() {
            conn.close()
                .map_err(|(_, e)| DbError::ConnectionError(e.to_string()))?;
        }
        self.remove_files()
    }

    async fn database_ddl(&self) -> DbResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(DATABASE_DDL_SQL)?;
            let mut rows = stmt.query([])?;
            let mut statements = Vec::new();
            while let Some(row) = rows.next()? {
                let sql: String = row.get(0)?;
                let sql = sql.trim().trim_end_matches(';').trim_end();
                if !sql.is_empty() {
                    statements.push(sql.to_string());
                }
            }
            Ok(statements)
        })
    }

    async fn update_ddl(&self, statements: &[String]) -> DbResult<Operation> {
        self.with_conn(|_| Ok(()))?;
        self.queue_operation(OperationKind::UpdateDdl, statements)
    }

    async fn wait_operation(&self, operation: Operation) -> DbResult<()> {
        let pending = self.take_operation(&operation)?;
        match pending.kind {
            OperationKind::CreateDatabase => self.run_create_database(&pending.statements),
            OperationKind::UpdateDdl => self.run_update_ddl(&pending.statements),
        }
    }

    async fn execute_transaction(&self, statements: &[String]) -> DbResult<i64> {
        self.with_conn(|conn| Self::transaction(conn, |c| Self::execute_statements(c, statements)))
    }

    async fn write_mutations(&self, mutations: &[Mutation]) -> DbResult<()> {
        self.with_conn(|conn| {
            Self::transaction(conn, |c| {
                for mutation in mutations {
                    match mutation {
                        Mutation::DeleteAll { table } => {
                            c.execute(&format!("DELETE FROM {}", quote_ident(table)), [])?;
                        }
                        Mutation::Insert {
                            table,
                            columns,
                            values,
                        } => {
                            if columns.len() != values.len() {
                                return Err(DbError::Internal(format!(
                                    "insert into {table}: {} columns but {} values",
                                    columns.len(),
                                    values.len()
                                )));
                            }
                            let column_list = columns
                                .iter()
                                .map(|col| quote_ident(col))
                                .collect::<Vec<_>>()
                                .join(", ");
                            let placeholders = vec!["?"; values.len()].join(", ");
                            let sql = format!(
                                "INSERT INTO {} ({column_list}) VALUES ({placeholders})",
                                quote_ident(table)
                            );
                            c.execute(&sql, duckdb::params_from_iter(values.iter()))?;
                        }
                    }
                }
                Ok(())
            })
        })
    }

    async fn partitioned_update(&self, statement: &str) -> DbResult<i64> {
        self.with_conn(|conn| {
            let rows = conn
                .execute(statement, [])
                .map_err(|e| annotate(DbError::from(e), statement))?;
            Ok(rows as i64)
        })
    }

    async fn read_rows(
        &self,
        table: &str,
        columns: &[&str],
        limit: Option<usize>,
    ) -> DbResult<Vec<Row>> {
        let column_list = columns
            .iter()
            .map(|col| quote_ident(col))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {column_list} FROM {}", quote_ident(table));
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;
            let mut result = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(columns.len());
                for idx in 0..columns.len() {
                    let value: DuckValue = row.get(idx)?;
                    values.push(Value::from(value));
                }
                result.push(values);
            }
            Ok(result)
        })
    }

    async fn close(&self) -> DbResult<()> {
        let mut guard = self.lock_conn()?;
        self.closed.store(true, Ordering::SeqCst);
        if let Some(conn) = guard.take() {
            conn.close()
                .map_err(|(_, e)| DbError::ConnectionError(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
