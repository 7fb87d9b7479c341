//! The connection facade.
//!
//! [`Connection`] owns one driver connection for its whole lifetime: it
//! opens the driver at construction (unless the driver already reports
//! open) and closes it exactly once. On top of that it exposes the
//! one-call helpers [`Connection::select`], [`Connection::execute_scalar`],
//! and [`Connection::execute_non_query`], each of which constructs the
//! relevant command, runs it, and closes it on every exit path. Callers
//! wanting a custom timeout or stored-procedure mode construct commands
//! directly via [`Connection::command`] and [`Connection::query`].
//!
//! One logical operation at a time: the driver sits behind an async
//! mutex, so overlapped calls from clones of the facade serialize rather
//! than interleave on the wire. Materialized results are immutable and
//! freely shareable once returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use crate::driver::DriverConnection;
use crate::error::{CommandError, ConnectionError};
use crate::query::results::ResultSet;
use crate::query::statement::{Command, Parameter};
use crate::query::QueryCommand;
use crate::types::FromValue;

/// Facade-level configuration.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    /// Timeout applied to every command that does not set its own.
    pub default_timeout: Option<Duration>,
}

impl ConnectionOptions {
    /// Options with no default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default command timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }
}

/// Shared state behind the facade and every command bound to it.
pub(crate) struct ConnectionInner {
    /// The owned driver connection. The mutex is the single-flight
    /// guarantee: one statement on the wire at a time.
    pub(crate) driver: Mutex<Box<dyn DriverConnection>>,
    /// Set once by `close()`; commands check it before touching the
    /// driver.
    closed: AtomicBool,
    /// Default command timeout.
    pub(crate) default_timeout: Option<Duration>,
}

impl ConnectionInner {
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Owns a driver connection and hands out commands bound to it.
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.inner.is_closed())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Take ownership of `driver` and open it, unless it already reports
    /// open.
    ///
    /// # Errors
    ///
    /// `ConnectionError::OpenFailed` when the driver refuses to open.
    pub async fn open(driver: Box<dyn DriverConnection>) -> Result<Self, ConnectionError> {
        Self::open_with(driver, ConnectionOptions::default()).await
    }

    /// [`Connection::open`] with explicit options.
    ///
    /// # Errors
    ///
    /// `ConnectionError::OpenFailed` when the driver refuses to open.
    pub async fn open_with(
        mut driver: Box<dyn DriverConnection>,
        options: ConnectionOptions,
    ) -> Result<Self, ConnectionError> {
        if !driver.is_open() {
            driver
                .open()
                .await
                .map_err(|e| ConnectionError::OpenFailed {
                    message: e.to_string(),
                })?;
            debug!("driver connection opened");
        }
        Ok(Self {
            inner: Arc::new(ConnectionInner {
                driver: Mutex::new(driver),
                closed: AtomicBool::new(false),
                default_timeout: options.default_timeout,
            }),
        })
    }

    /// Construct a parameterized command bound to this connection.
    ///
    /// # Errors
    ///
    /// `CommandError::InvalidParameter` for an empty or duplicated
    /// parameter name.
    pub fn command(&self, sql: &str, params: &[Parameter]) -> Result<Command, CommandError> {
        Command::new(Arc::clone(&self.inner), sql, params.to_vec())
    }

    /// Construct a query command bound to this connection.
    ///
    /// # Errors
    ///
    /// `CommandError::InvalidParameter` for an empty or duplicated
    /// parameter name.
    pub fn query(&self, sql: &str, params: &[Parameter]) -> Result<QueryCommand, CommandError> {
        QueryCommand::new(Arc::clone(&self.inner), sql, params.to_vec())
    }

    /// Run a query and return the fully materialized result.
    ///
    /// # Errors
    ///
    /// As [`QueryCommand::materialize`].
    pub async fn select(&self, sql: &str, params: &[Parameter]) -> Result<ResultSet, CommandError> {
        let mut cmd = self.query(sql, params)?;
        let result = cmd.materialize().await;
        cmd.close();
        result
    }

    /// Run a query and return the first column of the first row, or
    /// `None` for an empty result or SQL NULL.
    ///
    /// # Errors
    ///
    /// As [`QueryCommand::scalar`].
    pub async fn execute_scalar<T>(
        &self,
        sql: &str,
        params: &[Parameter],
    ) -> Result<Option<T>, CommandError>
    where
        T: FromValue,
    {
        let mut cmd = self.query(sql, params)?;
        let result = cmd.scalar().await;
        cmd.close();
        result
    }

    /// Run a statement for its side effect and return the affected-row
    /// count.
    ///
    /// # Errors
    ///
    /// As [`Command::execute`].
    pub async fn execute_non_query(
        &self,
        sql: &str,
        params: &[Parameter],
    ) -> Result<u64, CommandError> {
        let mut cmd = self.command(sql, params)?;
        let result = cmd.execute().await;
        cmd.close();
        result
    }

    /// Whether [`Connection::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Close the owned driver connection.
    ///
    /// The driver is closed exactly once; later calls are no-ops. Every
    /// command bound to this connection fails with
    /// `ConnectionError::Closed` from this point on.
    ///
    /// # Errors
    ///
    /// `ConnectionError::CloseFailed` when the driver reports a failure
    /// while closing.
    pub async fn close(&self) -> Result<(), ConnectionError> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut driver = self.inner.driver.lock().await;
        driver
            .close()
            .await
            .map_err(|e| ConnectionError::CloseFailed {
                message: e.to_string(),
            })?;
        debug!("driver connection closed");
        Ok(())
    }
}
