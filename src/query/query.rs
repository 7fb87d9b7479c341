//! The query command: execute and materialize, or extract a scalar.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::connection::ConnectionInner;
use crate::error::CommandError;
use crate::query::results::ResultSet;
use crate::query::statement::{run_with_timeout, Command, CommandMode, Parameter};
use crate::types::FromValue;

/// A parameterized command that returns rows.
///
/// Extends [`Command`] with [`QueryCommand::materialize`] and
/// [`QueryCommand::scalar`]; the side-effect surface (`execute`, `close`,
/// mode and timeout knobs) is delegated to the wrapped command.
pub struct QueryCommand {
    inner: Command,
}

impl QueryCommand {
    /// Bind `sql` and `params` to `conn`.
    ///
    /// # Errors
    ///
    /// `CommandError::InvalidParameter` for an empty or duplicated
    /// parameter name.
    pub(crate) fn new(
        conn: Arc<ConnectionInner>,
        sql: impl Into<String>,
        params: Vec<Parameter>,
    ) -> Result<Self, CommandError> {
        Ok(Self {
            inner: Command::new(conn, sql, params)?,
        })
    }

    /// Set the command mode.
    pub fn with_mode(mut self, mode: CommandMode) -> Self {
        self.inner = self.inner.with_mode(mode);
        self
    }

    /// Set an execution timeout, overriding the connection default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }

    /// The SQL text.
    pub fn sql(&self) -> &str {
        self.inner.sql()
    }

    /// The bound parameters.
    pub fn params(&self) -> &[Parameter] {
        self.inner.params()
    }

    /// Execute for side effect; see [`Command::execute`].
    ///
    /// # Errors
    ///
    /// As [`Command::execute`].
    pub async fn execute(&mut self) -> Result<u64, CommandError> {
        self.inner.execute().await
    }

    /// Execute the query and buffer every row into a [`ResultSet`].
    ///
    /// Opens a forward-only cursor, reads the column schema once, then
    /// drains the cursor to exhaustion before returning. The whole read,
    /// cursor open included, runs under the command timeout.
    ///
    /// # Errors
    ///
    /// As [`Command::execute`], plus a `DriverError` when the driver
    /// returns rows that do not match its reported schema.
    pub async fn materialize(&mut self) -> Result<ResultSet, CommandError> {
        self.inner.guard()?;
        let result = run_with_timeout(self.inner.timeout(), async {
            let mut driver = self.inner.conn().driver.lock().await;
            let mut cursor = driver
                .execute_query(self.inner.sql(), self.inner.mode(), self.inner.params())
                .await?;
            let mut result = ResultSet::new(cursor.columns());
            while let Some(fields) = cursor.next_row().await? {
                result.push_row(fields)?;
            }
            Ok(result)
        })
        .await?;

        debug!(
            sql = %self.inner.sql(),
            columns = result.columns().len(),
            rows = result.row_count(),
            "result materialized"
        );
        Ok(result)
    }

    /// Execute the query and extract the first column of the first row.
    ///
    /// Returns `None` when the result has no rows or the value is SQL
    /// NULL; callers handle the empty scalar explicitly.
    ///
    /// # Errors
    ///
    /// `AccessError::Cast` (via `CommandError::Access`) when the value is
    /// present but not convertible to `T`, plus the failures of
    /// [`QueryCommand::materialize`].
    pub async fn scalar<T>(&mut self) -> Result<Option<T>, CommandError>
    where
        T: FromValue,
    {
        let result = self.materialize().await?;
        let Some(row) = result.rows().first() else {
            return Ok(None);
        };
        if row.is_empty() {
            return Ok(None);
        }
        match &row[0] {
            value if value.is_null() => Ok(None),
            value => Ok(Some(T::from_value(value)?)),
        }
    }

    /// Release the command; see [`Command::close`].
    pub fn close(&mut self) {
        self.inner.close();
    }

    /// Whether the command has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
