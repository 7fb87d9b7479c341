//! SQL statement containers and the parameterized command.
//!
//! A [`Command`] binds SQL text, a [`CommandMode`], an optional timeout,
//! and a validated list of named [`Parameter`]s to one open connection.
//! Commands are short-lived: created per statement, executed, then
//! closed. Closing is idempotent, and a materialized result outlives the
//! command that produced it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::connection::ConnectionInner;
use crate::error::{CommandError, ConnectionError, DriverError};
use crate::types::Value;

/// How the driver interprets the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandMode {
    /// Interpret the string as literal SQL text.
    #[default]
    Text,
    /// Interpret the string as a call to a named stored procedure.
    StoredProcedure,
}

/// A named parameter bound to a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: Value,
}

impl Parameter {
    /// Bind `value` under `name`. Names are validated (non-empty, unique
    /// within one command) when the command is constructed.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bound value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Validate a parameter list in one pass: every name non-empty, no name
/// repeated.
///
/// # Errors
///
/// `CommandError::InvalidParameter` naming the offending parameter.
pub(crate) fn validate_parameters(params: &[Parameter]) -> Result<(), CommandError> {
    for (i, param) in params.iter().enumerate() {
        if param.name.is_empty() {
            return Err(CommandError::InvalidParameter(format!(
                "parameter at position {i} has an empty name"
            )));
        }
        if params[..i].iter().any(|p| p.name == param.name) {
            return Err(CommandError::InvalidParameter(format!(
                "duplicate parameter name: {}",
                param.name
            )));
        }
    }
    Ok(())
}

/// Run a driver call under the command's timeout, mapping expiry to
/// `CommandError::Timeout`.
pub(crate) async fn run_with_timeout<T, F>(
    limit: Option<Duration>,
    fut: F,
) -> Result<T, CommandError>
where
    F: Future<Output = Result<T, DriverError>>,
{
    match limit {
        Some(limit) => Ok(timeout(limit, fut)
            .await
            .map_err(|_| CommandError::Timeout { timeout: limit })??),
        None => Ok(fut.await?),
    }
}

/// A parameterized command bound to an open connection.
///
/// Executes for side effect via [`Command::execute`]. For queries, see
/// [`QueryCommand`](crate::query::QueryCommand).
pub struct Command {
    conn: Arc<ConnectionInner>,
    sql: String,
    mode: CommandMode,
    timeout: Option<Duration>,
    params: Vec<Parameter>,
    closed: bool,
}

impl Command {
    /// Bind `sql` and `params` to `conn`. The timeout defaults to the
    /// connection's configured default.
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
        validate_parameters(&params)?;
        let timeout = conn.default_timeout;
        Ok(Self {
            conn,
            sql: sql.into(),
            mode: CommandMode::Text,
            timeout,
            params,
            closed: false,
        })
    }

    /// Set the command mode.
    pub fn with_mode(mut self, mode: CommandMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set an execution timeout, overriding the connection default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The command mode.
    pub fn mode(&self) -> CommandMode {
        self.mode
    }

    /// The effective execution timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The bound parameters.
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Execute for side effect and return the affected-row count, as
    /// reported by the driver. The count is a pass-through; interpreting
    /// or retrying it is the caller's business.
    ///
    /// # Errors
    ///
    /// `CommandError::Closed` after [`Command::close`],
    /// `ConnectionError::Closed` when the owning connection was closed,
    /// `CommandError::Timeout` on expiry, and the driver's own failures
    /// otherwise.
    pub async fn execute(&mut self) -> Result<u64, CommandError> {
        self.guard()?;
        let outcome = run_with_timeout(self.timeout, async {
            let mut driver = self.conn.driver.lock().await;
            driver.execute(&self.sql, self.mode, &self.params).await
        })
        .await?;
        debug!(sql = %self.sql, rows = outcome.rows_affected, "command executed");
        Ok(outcome.rows_affected)
    }

    /// Release the command. Idempotent: a second close is a no-op. Any
    /// execution after close fails with `CommandError::Closed`.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            debug!(sql = %self.sql, "command closed");
        }
    }

    /// Whether [`Command::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Refuse execution on a closed command or a closed connection.
    pub(crate) fn guard(&self) -> Result<(), CommandError> {
        if self.closed {
            return Err(CommandError::Closed);
        }
        if self.conn.is_closed() {
            return Err(ConnectionError::Closed.into());
        }
        Ok(())
    }

    /// Shared handle onto the owning connection, for the query variant.
    pub(crate) fn conn(&self) -> &Arc<ConnectionInner> {
        &self.conn
    }
}
