//! Error types for sqlbuf.
//!
//! Each concern carries its own error enum: `ConnectionError` for the
//! connection wrapper, `CommandError` for command construction and
//! execution, `AccessError` for reading values out of a materialized
//! result set, and `DriverError` as the pass-through for anything the
//! underlying driver reports. `Error` aggregates all of them for callers
//! that prefer a single error type.
//!
//! No error is retried or recovered at this layer; every failure surfaces
//! to the immediate caller.

use std::time::Duration;

use thiserror::Error;

/// Pass-through error for failures reported by the underlying driver.
///
/// The message is whatever the driver produced; this layer adds no
/// interpretation and performs no retries.
#[derive(Error, Debug, Clone)]
#[error("driver error: {message}")]
pub struct DriverError {
    /// Driver-reported description of the failure.
    pub message: String,
}

impl DriverError {
    /// Create a driver error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised while opening, closing, or using a connection wrapper.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Opening the underlying driver connection failed.
    #[error("failed to open connection: {message}")]
    OpenFailed {
        /// Driver-reported reason.
        message: String,
    },

    /// Closing the underlying driver connection failed.
    #[error("failed to close connection: {message}")]
    CloseFailed {
        /// Driver-reported reason.
        message: String,
    },

    /// The connection wrapper has already been closed.
    #[error("connection is closed")]
    Closed,

    /// Pass-through for other driver-reported connection failures.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Errors raised while building or executing a command.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A parameter name was empty or duplicated another parameter of the
    /// same command. Reported once, during command construction.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Execution exceeded the configured timeout.
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// The timeout that expired.
        timeout: Duration,
    },

    /// The command was used after `close()`.
    #[error("command is closed")]
    Closed,

    /// The owning connection failed or was closed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Extracting a value from the materialized result failed.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Pass-through for driver-reported execution failures.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Errors raised while reading values out of a materialized result set.
#[derive(Error, Debug, Clone)]
pub enum AccessError {
    /// No column matches the requested name (case-insensitive).
    #[error("column not found: {name}")]
    ColumnNotFound {
        /// The name that failed to resolve.
        name: String,
    },

    /// A column ordinal past the end of the column list.
    #[error("column index {index} out of range (result has {count} columns)")]
    ColumnOutOfRange {
        /// The requested ordinal.
        index: usize,
        /// Number of columns in the result.
        count: usize,
    },

    /// The stored value is not convertible to the requested type.
    /// Conversions never truncate or substitute a default.
    #[error("cannot cast {from} value to {to}")]
    Cast {
        /// Type of the stored value.
        from: &'static str,
        /// Requested target type.
        to: &'static str,
    },

    /// A malformed display-format specifier.
    #[error("invalid format spec {spec:?}: {message}")]
    Format {
        /// The offending specifier.
        spec: String,
        /// What was wrong with it.
        message: String,
    },
}

/// Aggregate error for callers that want a single error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection lifecycle failure.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Command construction or execution failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Result-set access failure.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Driver pass-through.
    #[error(transparent)]
    Driver(#[from] DriverError),
}
