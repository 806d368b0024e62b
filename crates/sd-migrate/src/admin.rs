//! Database administration: lifecycle, schema dump and ad-hoc statements

use crate::engine::Migrator;
use crate::error::{MigrateError, MigrateResult};
use sd_sql::{join_statements, split_statements};

impl Migrator {
    /// Create the target database with initial structural statements and
    /// wait for the creation to finish.
    pub async fn create_database(&self, statements: &[String]) -> MigrateResult<()> {
        log::info!(
            "Creating database with {} statements",
            statements.len()
        );
        let operation = self
            .database()
            .create_database(statements)
            .await
            .map_err(MigrateError::CreateDatabase)?;
        self.database()
            .wait_operation(operation)
            .await
            .map_err(MigrateError::WaitOperation)
    }

    /// Create the target database from a schema file's contents.
    pub async fn create_database_from_schema(&self, ddl: &str) -> MigrateResult<()> {
        let statements = self.split(ddl)?;
        self.create_database(&statements).await
    }

    pub async fn drop_database(&self) -> MigrateResult<()> {
        log::info!("Dropping database");
        self.database()
            .drop_database()
            .await
            .map_err(MigrateError::DropDatabase)
    }

    /// Drop the database and recreate it from a schema file's contents.
    ///
    /// The schema is split before anything is dropped.
    pub async fn reset_database(&self, ddl: &str) -> MigrateResult<()> {
        let statements = self.split(ddl)?;
        self.drop_database().await?;
        self.create_database(&statements).await
    }

    /// Current structural definition as one text: every statement followed
    /// by `;` and a newline, statements separated by a blank line.
    pub async fn load_schema(&self) -> MigrateResult<String> {
        let statements = self
            .database()
            .database_ddl()
            .await
            .map_err(MigrateError::LoadSchema)?;
        Ok(join_statements(&statements))
    }

    /// Apply structural statements as one batch and wait for it.
    pub async fn apply_ddl(&self, statements: &[String]) -> MigrateResult<()> {
        let operation = self
            .database()
            .update_ddl(statements)
            .await
            .map_err(MigrateError::UpdateDdl)?;
        self.database()
            .wait_operation(operation)
            .await
            .map_err(MigrateError::WaitOperation)
    }

    pub async fn apply_ddl_file(&self, ddl: &str) -> MigrateResult<()> {
        let statements = self.split(ddl)?;
        self.apply_ddl(&statements).await
    }

    /// Apply data statements in one transaction. Returns affected rows.
    pub async fn apply_dml(&self, statements: &[String]) -> MigrateResult<i64> {
        let rows = self
            .database()
            .execute_transaction(statements)
            .await
            .map_err(MigrateError::UpdateDml)?;
        log::debug!("{rows} rows affected");
        Ok(rows)
    }

    /// Apply data statements one by one as large-scale updates.
    ///
    /// Statements that completed before a failure stay applied; the error
    /// carries the rows they affected.
    pub async fn apply_partitioned_dml(&self, statements: &[String]) -> MigrateResult<i64> {
        let mut rows_affected = 0;
        for statement in statements {
            match self.database().partitioned_update(statement).await {
                Ok(rows) => rows_affected += rows,
                Err(source) => {
                    return Err(MigrateError::UpdatePartitionedDml {
                        rows_affected,
                        source,
                    })
                }
            }
        }
        log::debug!("{rows_affected} rows affected");
        Ok(rows_affected)
    }

    pub async fn apply_dml_file(&self, dml: &str, partitioned: bool) -> MigrateResult<i64> {
        let statements = self.split(dml)?;
        if partitioned {
            self.apply_partitioned_dml(&statements).await
        } else {
            self.apply_dml(&statements).await
        }
    }

    fn split(&self, sql: &str) -> MigrateResult<Vec<String>> {
        split_statements(self.dialect(), sql).map_err(MigrateError::InvalidStatements)
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
