//! Database trait definition

use crate::error::DbResult;
use crate::value::{Mutation, Row};
use async_trait::async_trait;

/// What a long-running operation will do once awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateDatabase,
    UpdateDdl,
}

/// Handle to an accepted long-running administrative operation.
///
/// Requests that change schema are accepted first and complete later;
/// the handle must be passed to [`Database::wait_operation`] to learn the
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    pub id: u64,
    pub kind: OperationKind,
}

/// Client primitives of a relational database service.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Request creation of the target database with initial structural
    /// statements
    async fn create_database(&self, statements: &[String]) -> DbResult<Operation>;

    /// Drop the target database
    async fn drop_database(&self) -> DbResult<()>;

    /// Structural statements currently defining the database, in creation
    /// order, without terminators
    async fn database_ddl(&self) -> DbResult<Vec<String>>;

    /// Request a batch of structural changes
    async fn update_ddl(&self, statements: &[String]) -> DbResult<Operation>;

    /// Wait for an accepted operation to complete
    async fn wait_operation(&self, operation: Operation) -> DbResult<()>;

    /// Execute statements in one read-write transaction, returning the total
    /// number of affected rows. Nothing is committed if any statement fails.
    async fn execute_transaction(&self, statements: &[String]) -> DbResult<i64>;

    /// Commit buffered mutations atomically
    async fn write_mutations(&self, mutations: &[Mutation]) -> DbResult<()>;

    /// Execute one large-scale update outside any transaction, returning the
    /// number of affected rows
    async fn partitioned_update(&self, statement: &str) -> DbResult<i64>;

    /// Read up to `limit` rows of `columns` from `table` (all rows when
    /// `limit` is `None`). An empty result means the table has no rows.
    async fn read_rows(&self, table: &str, columns: &[&str], limit: Option<usize>)
        -> DbResult<Vec<Row>>;

    /// Release the client. Further calls fail.
    async fn close(&self) -> DbResult<()>;
}
