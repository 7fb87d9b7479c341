//! A scripted in-memory driver.
//!
//! `MockConnection` answers executions from a FIFO queue of canned
//! replies and records every statement it receives, so tests can assert
//! both the results a caller sees and the SQL and parameters that
//! actually reached the driver. It backs this crate's own test suite and
//! doubles as a reference implementation of the driver contract.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::driver::{ColumnSchema, DriverConnection, ExecuteOutcome, RowCursor};
use crate::error::DriverError;
use crate::query::statement::{CommandMode, Parameter};
use crate::types::Value;

/// One statement as it arrived at the driver.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The SQL text.
    pub sql: String,
    /// Text vs. stored-procedure mode.
    pub mode: CommandMode,
    /// Snapshot of the bound parameters.
    pub params: Vec<Parameter>,
}

/// Shared handle onto the call log.
///
/// Stays readable after the `MockConnection` itself has been consumed by
/// a [`Connection`](crate::connection::Connection).
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallJournal {
    /// Snapshot of all recorded calls, in execution order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("call journal poisoned").clone()
    }

    /// Number of statements executed so far.
    pub fn len(&self) -> usize {
        self.calls.lock().expect("call journal poisoned").len()
    }

    /// Whether no statement has been executed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().expect("call journal poisoned").push(call);
    }
}

enum Reply {
    Rows {
        columns: Vec<ColumnSchema>,
        rows: Vec<Vec<Option<Value>>>,
    },
    RowsAffected(u64),
    Error(String),
}

/// Scripted driver connection.
///
/// Replies are consumed in FIFO order, one per executed statement.
/// Executing with an empty script, or while closed, is a `DriverError`.
pub struct MockConnection {
    open: bool,
    fail_open: Option<String>,
    latency: Option<std::time::Duration>,
    replies: VecDeque<Reply>,
    journal: CallJournal,
}

impl MockConnection {
    /// A closed mock with an empty script.
    pub fn new() -> Self {
        Self {
            open: false,
            fail_open: None,
            latency: None,
            replies: VecDeque::new(),
            journal: CallJournal::default(),
        }
    }

    /// Start in the already-open state, so the wrapper skips `open()`.
    pub fn already_open(mut self) -> Self {
        self.open = true;
        self
    }

    /// Make `open()` fail with the given message.
    pub fn fail_open(mut self, message: impl Into<String>) -> Self {
        self.fail_open = Some(message.into());
        self
    }

    /// Sleep this long before answering each execution, for exercising
    /// command timeouts.
    pub fn latency(mut self, latency: std::time::Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Enqueue a result-set reply.
    pub fn push_rows(
        mut self,
        columns: Vec<ColumnSchema>,
        rows: Vec<Vec<Option<Value>>>,
    ) -> Self {
        self.replies.push_back(Reply::Rows { columns, rows });
        self
    }

    /// Enqueue an affected-row-count reply.
    pub fn push_rows_affected(mut self, count: u64) -> Self {
        self.replies.push_back(Reply::RowsAffected(count));
        self
    }

    /// Enqueue a failure reply.
    pub fn push_error(mut self, message: impl Into<String>) -> Self {
        self.replies.push_back(Reply::Error(message.into()));
        self
    }

    /// Handle onto the call log; clone it out before handing the
    /// connection to a wrapper.
    pub fn journal(&self) -> CallJournal {
        self.journal.clone()
    }

    async fn next_reply(
        &mut self,
        sql: &str,
        mode: CommandMode,
        params: &[Parameter],
    ) -> Result<Reply, DriverError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.open {
            return Err(DriverError::new("connection is not open"));
        }
        self.journal.record(RecordedCall {
            sql: sql.to_string(),
            mode,
            params: params.to_vec(),
        });
        self.replies
            .pop_front()
            .ok_or_else(|| DriverError::new(format!("no scripted reply for: {sql}")))
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DriverConnection for MockConnection {
    fn is_open(&self) -> bool {
        self.open
    }

    async fn open(&mut self) -> Result<(), DriverError> {
        if let Some(message) = &self.fail_open {
            return Err(DriverError::new(message.clone()));
        }
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.open = false;
        Ok(())
    }

    async fn execute(
        &mut self,
        sql: &str,
        mode: CommandMode,
        params: &[Parameter],
    ) -> Result<ExecuteOutcome, DriverError> {
        match self.next_reply(sql, mode, params).await? {
            Reply::RowsAffected(count) => Ok(ExecuteOutcome {
                rows_affected: count,
            }),
            // Executing a SELECT for effect: no rows are affected.
            Reply::Rows { .. } => Ok(ExecuteOutcome { rows_affected: 0 }),
            Reply::Error(message) => Err(DriverError::new(message)),
        }
    }

    async fn execute_query(
        &mut self,
        sql: &str,
        mode: CommandMode,
        params: &[Parameter],
    ) -> Result<Box<dyn RowCursor>, DriverError> {
        match self.next_reply(sql, mode, params).await? {
            Reply::Rows { columns, rows } => Ok(Box::new(MockCursor {
                columns,
                rows: rows.into(),
            })),
            Reply::RowsAffected(_) => Err(DriverError::new(
                "scripted reply was a row count, query expected rows",
            )),
            Reply::Error(message) => Err(DriverError::new(message)),
        }
    }
}

struct MockCursor {
    columns: Vec<ColumnSchema>,
    rows: VecDeque<Vec<Option<Value>>>,
}

#[async_trait]
impl RowCursor for MockCursor {
    fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Vec<Option<Value>>>, DriverError> {
        Ok(self.rows.pop_front())
    }
}
