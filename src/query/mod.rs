//! Command construction, execution, and result handling.
//!
//! The query module is organized into:
//! - `statement` - parameterized command: SQL text, mode, timeout, named
//!   parameters, execute-for-effect
//! - `query` - the query variant: materialize all rows, or extract a
//!   single scalar
//! - `results` - the eagerly materialized result set

pub mod query;
pub mod results;
pub mod statement;

// Re-export commonly used types
pub use query::QueryCommand;
pub use results::{Column, ColumnAddr, ResultSet, Row};
pub use statement::{Command, CommandMode, Parameter};
