//! Shared fixtures for integration tests.
//!
//! The canonical fixture is a two-row `item` table:
//!
//! ```text
//! itemid | name
//! -------+--------
//!      1 | markus
//!      2 | tobias
//! ```

#![allow(dead_code)]

use sqlbuf::driver::CallJournal;
use sqlbuf::{ColumnSchema, Connection, MockConnection, SqlType, Value};

/// Schema of the `item` fixture table.
pub fn item_columns() -> Vec<ColumnSchema> {
    vec![
        ColumnSchema::new("itemid", SqlType::BigInt),
        ColumnSchema::new("name", SqlType::Text),
    ]
}

/// Both fixture rows.
pub fn item_rows() -> Vec<Vec<Option<Value>>> {
    vec![
        vec![Some(Value::Int(1)), Some(Value::Text("markus".into()))],
        vec![Some(Value::Int(2)), Some(Value::Text("tobias".into()))],
    ]
}

/// A mock scripted to answer one query with the full `item` table.
pub fn item_select_mock() -> MockConnection {
    MockConnection::new().push_rows(item_columns(), item_rows())
}

/// Open a facade connection over a scripted mock.
pub async fn open(mock: MockConnection) -> Connection {
    Connection::open(Box::new(mock))
        .await
        .expect("mock connection should open")
}

/// Open a facade connection, keeping the mock's call journal.
pub async fn open_with_journal(mock: MockConnection) -> (Connection, CallJournal) {
    let journal = mock.journal();
    (open(mock).await, journal)
}
