//! # sqlbuf
//!
//! A buffered convenience layer over relational database drivers.
//!
//! sqlbuf takes a driver implementing its small [`driver`] contract and
//! layers three things on top: a connection facade, parameterized
//! commands, and eagerly materialized result sets with typed,
//! name-addressable field access. Everything non-trivial (connecting,
//! executing SQL, reading rows) is delegated to the driver; this crate
//! owns the shape of the API, not a wire protocol.
//!
//! ## Features
//!
//! - **Connection facade**: one-call `select`, `execute_scalar`, and
//!   `execute_non_query` helpers with scoped command cleanup
//! - **Parameterized commands**: named parameters validated up front,
//!   text or stored-procedure mode, per-command timeouts
//! - **Materialized results**: the whole cursor is drained before the
//!   call returns, so results are restartable, shareable, and outlive
//!   the command and connection that produced them
//! - **Typed access**: range-checked extraction into Rust types, with
//!   cast failures reported instead of truncated, plus display-format
//!   specifiers for rendering
//!
//! Full buffering is a deliberate trade-off: simplicity and safety over
//! streaming, at the cost of memory proportional to the result. Queries
//! with unbounded results belong on a streaming layer, not this one.
//!
//! ## Query Example
//!
//! ```no_run
//! use sqlbuf::{Connection, Parameter};
//! # use sqlbuf::MockConnection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let driver = Box::new(MockConnection::new());
//! // Open a connection over any driver implementing the contract
//! let conn = Connection::open(driver).await?;
//!
//! // Run a parameterized query and materialize all rows
//! let result = conn
//!     .select(
//!         "select * from item where itemid > @minitemid",
//!         &[Parameter::new("minitemid", 1)],
//!     )
//!     .await?;
//!
//! for row in &result {
//!     let id: i64 = row.value("itemid")?;
//!     let name: String = row.value("name")?;
//!     println!("{id}: {name}");
//! }
//!
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Scalar Example
//!
//! ```no_run
//! # use sqlbuf::{Connection, MockConnection};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let conn = Connection::open(Box::new(MockConnection::new())).await?;
//! let count = conn
//!     .execute_scalar::<i64>("select count(*) from item", &[])
//!     .await?;
//! assert_eq!(count, Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Finer Control
//!
//! ```no_run
//! use std::time::Duration;
//! use sqlbuf::{CommandMode, Connection, Parameter};
//! # use sqlbuf::MockConnection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let conn = Connection::open(Box::new(MockConnection::new())).await?;
//! // Construct the command directly for a custom timeout or mode
//! let mut cmd = conn
//!     .query("refresh_totals", &[Parameter::new("year", 2024)])?
//!     .with_mode(CommandMode::StoredProcedure)
//!     .with_timeout(Duration::from_secs(120));
//!
//! let result = cmd.materialize().await?;
//! cmd.close();
//! println!("{} rows", result.row_count());
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod connection;
pub mod driver;
pub mod error;
pub mod query;
pub mod types;

// =============================================================================
// Connection Facade
// =============================================================================

/// Re-export the connection facade.
pub use connection::{Connection, ConnectionOptions};

// =============================================================================
// Driver Contract
// =============================================================================

/// Re-export the driver contract and the scripted test driver.
pub use driver::{
    ColumnSchema, DriverConnection, ExecuteOutcome, MockConnection, RowCursor, SqlType,
};

// =============================================================================
// Commands and Results
// =============================================================================

/// Re-export command and result types.
pub use query::{Column, ColumnAddr, Command, CommandMode, Parameter, QueryCommand, ResultSet, Row};

// =============================================================================
// Values
// =============================================================================

/// Re-export the dynamic value representation and typed extraction.
pub use types::{FromValue, Value};

// =============================================================================
// Error Types
// =============================================================================

/// Re-export error types for convenient error handling.
pub use error::{AccessError, CommandError, ConnectionError, DriverError, Error};
