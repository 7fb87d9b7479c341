//! The driver contract this crate wraps.
//!
//! sqlbuf implements no database protocol of its own. Callers hand it an
//! object implementing [`DriverConnection`], the generic relational
//! client surface (open/close, execute-for-effect, execute-for-cursor),
//! and the crate layers parameterized commands and eager result
//! materialization on top.
//!
//! A [`RowCursor`] is forward-only: the column schema is readable up
//! front, rows are consumed by sequential [`RowCursor::next_row`] calls,
//! and SQL NULLs cross the seam as `None` so no driver-specific null
//! sentinel ever reaches a materialized row.

use async_trait::async_trait;

use crate::error::DriverError;
use crate::query::statement::{CommandMode, Parameter};
use crate::types::Value;

pub mod mock;

pub use mock::{CallJournal, MockConnection, RecordedCall};

/// Declared data type of a result column, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    /// BOOLEAN.
    Boolean,
    /// Any integer type, widened to 64 bits.
    BigInt,
    /// Any floating-point type, widened to 64 bits.
    Double,
    /// Character data of any declared length.
    Text,
    /// Binary data of any declared length.
    Binary,
    /// A driver-specific type this layer does not interpret.
    Other(String),
}

/// Driver-reported schema entry for one result column.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    /// Column name in driver-reported casing.
    pub name: String,
    /// Declared data type.
    pub data_type: SqlType,
}

impl ColumnSchema {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, data_type: SqlType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Outcome of an execute-for-effect call.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteOutcome {
    /// Number of rows the statement affected, as reported by the driver.
    pub rows_affected: u64,
}

/// An open (or openable) connection to a relational database.
///
/// Implementations are expected to be used from one logical task at a
/// time; the [`Connection`](crate::connection::Connection) wrapper
/// serializes access behind a mutex and never overlaps two calls.
#[async_trait]
pub trait DriverConnection: Send {
    /// Whether the underlying connection is currently open.
    fn is_open(&self) -> bool;

    /// Open the connection. Called by the wrapper at construction unless
    /// the driver already reports open.
    async fn open(&mut self) -> Result<(), DriverError>;

    /// Close the connection and release driver-side resources.
    async fn close(&mut self) -> Result<(), DriverError>;

    /// Execute a statement for its side effect.
    async fn execute(
        &mut self,
        sql: &str,
        mode: CommandMode,
        params: &[Parameter],
    ) -> Result<ExecuteOutcome, DriverError>;

    /// Execute a statement and return a forward-only cursor over its rows.
    async fn execute_query(
        &mut self,
        sql: &str,
        mode: CommandMode,
        params: &[Parameter],
    ) -> Result<Box<dyn RowCursor>, DriverError>;
}

/// Forward-only iterator over the rows of one executed query.
#[async_trait]
pub trait RowCursor: Send {
    /// Driver-reported column schema, available before the first row.
    fn columns(&self) -> &[ColumnSchema];

    /// Read the next row.
    ///
    /// Returns `None` once the cursor is exhausted. Within a row, a `None`
    /// field is a SQL NULL.
    async fn next_row(&mut self) -> Result<Option<Vec<Option<Value>>>, DriverError>;
}
