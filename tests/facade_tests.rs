//! Integration tests for the connection facade and command layer.
//!
//! # Overview
//!
//! Every test runs against the scripted `MockConnection` driver, so the
//! whole suite is hermetic: no database, no network. The mock's call
//! journal lets tests assert what actually reached the driver (SQL
//! text, command mode, and bound parameters) alongside the results the
//! caller observed.

mod common;

use std::time::Duration;

use common::{item_columns, item_rows, item_select_mock, open, open_with_journal};
use sqlbuf::{
    AccessError, ColumnSchema, CommandError, CommandMode, Connection, ConnectionError,
    ConnectionOptions, MockConnection, Parameter, SqlType, Value,
};

// ============================================================================
// Section 1: Select and Materialization
// ============================================================================

#[tokio::test]
async fn test_select_materializes_item_table() {
    let conn = open(item_select_mock()).await;

    let result = conn
        .select("select * from item order by itemid", &[])
        .await
        .unwrap();

    assert_eq!(result.column_names(), vec!["itemid", "name"]);
    assert_eq!(result.row_count(), 2);
    assert_eq!(result.rows()[0].value::<i64, _>("itemid").unwrap(), 1);
    assert_eq!(
        result.rows()[0].value::<String, _>("name").unwrap(),
        "markus"
    );
    assert_eq!(result.rows()[1].value::<i64, _>("itemid").unwrap(), 2);
    assert_eq!(
        result.rows()[1].value::<String, _>("name").unwrap(),
        "tobias"
    );
}

#[tokio::test]
async fn test_every_row_matches_column_count() {
    let conn = open(item_select_mock()).await;
    let result = conn.select("select * from item", &[]).await.unwrap();

    for row in &result {
        assert_eq!(row.len(), result.columns().len());
    }
}

#[tokio::test]
async fn test_reiterating_result_yields_identical_rows() {
    let conn = open(item_select_mock()).await;
    let result = conn.select("select * from item", &[]).await.unwrap();

    let pass = |result: &sqlbuf::ResultSet| -> Vec<(i64, String)> {
        result
            .iter()
            .map(|row| {
                (
                    row.value("itemid").unwrap(),
                    row.value("name").unwrap(),
                )
            })
            .collect()
    };

    let first = pass(&result);
    let second = pass(&result);
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_null_fields_surface_as_value_null() {
    let mock = MockConnection::new().push_rows(
        item_columns(),
        vec![vec![Some(Value::Int(3)), None]],
    );
    let conn = open(mock).await;

    let result = conn.select("select * from item", &[]).await.unwrap();
    let row = &result.rows()[0];
    assert_eq!(row[1], Value::Null);
    assert_eq!(row.value::<Option<String>, _>("name").unwrap(), None);
}

#[tokio::test]
async fn test_column_lookup_is_case_insensitive() {
    let conn = open(item_select_mock()).await;
    let result = conn.select("select * from item", &[]).await.unwrap();

    assert_eq!(
        result.column("Name").unwrap().ordinal(),
        result.column("name").unwrap().ordinal()
    );
    assert!(matches!(
        result.column("missing").unwrap_err(),
        AccessError::ColumnNotFound { .. }
    ));
}

#[tokio::test]
async fn test_cast_mismatch_is_reported_not_defaulted() {
    let conn = open(item_select_mock()).await;
    let result = conn.select("select * from item", &[]).await.unwrap();

    let err = result.rows()[0].value::<i64, _>("name").unwrap_err();
    assert!(matches!(
        err,
        AccessError::Cast {
            from: "TEXT",
            to: "i64",
        }
    ));
}

// ============================================================================
// Section 2: Parameters
// ============================================================================

#[tokio::test]
async fn test_parameters_reach_the_driver() {
    let mock = MockConnection::new().push_rows(
        item_columns(),
        vec![vec![Some(Value::Int(2)), Some(Value::Text("tobias".into()))]],
    );
    let (conn, journal) = open_with_journal(mock).await;

    let result = conn
        .select(
            "select * from item where itemid > @minitemid",
            &[Parameter::new("minitemid", 1)],
        )
        .await
        .unwrap();

    assert_eq!(result.row_count(), 1);
    assert_eq!(result.rows()[0].value::<i64, _>("itemid").unwrap(), 2);

    let calls = journal.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].sql, "select * from item where itemid > @minitemid");
    assert_eq!(calls[0].params, vec![Parameter::new("minitemid", 1)]);
}

#[tokio::test]
async fn test_empty_parameter_name_is_rejected() {
    let conn = open(MockConnection::new()).await;

    let err = conn
        .select("select 1", &[Parameter::new("", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::InvalidParameter(_)));
}

#[tokio::test]
async fn test_duplicate_parameter_name_is_rejected() {
    let (conn, journal) = open_with_journal(MockConnection::new()).await;

    let err = conn
        .execute_non_query(
            "update item set name = @name",
            &[Parameter::new("name", "a"), Parameter::new("name", "b")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::InvalidParameter(_)));
    // Rejected before anything reached the driver
    assert!(journal.is_empty());
}

// ============================================================================
// Section 3: Scalars and Non-Queries
// ============================================================================

#[tokio::test]
async fn test_execute_scalar_counts_items() {
    let mock = MockConnection::new().push_rows(
        vec![ColumnSchema::new("count", SqlType::BigInt)],
        vec![vec![Some(Value::Int(2))]],
    );
    let conn = open(mock).await;

    let count = conn
        .execute_scalar::<i64>("select count(*) from item", &[])
        .await
        .unwrap();
    assert_eq!(count, Some(2));
}

#[tokio::test]
async fn test_scalar_on_empty_result_is_none() {
    let mock = MockConnection::new().push_rows(item_columns(), vec![]);
    let conn = open(mock).await;

    let value = conn
        .execute_scalar::<i64>("select itemid from item where 1 = 0", &[])
        .await
        .unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
async fn test_scalar_null_is_none() {
    let mock = MockConnection::new().push_rows(
        vec![ColumnSchema::new("maxid", SqlType::BigInt)],
        vec![vec![None]],
    );
    let conn = open(mock).await;

    let value = conn
        .execute_scalar::<i64>("select max(itemid) from item", &[])
        .await
        .unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
async fn test_scalar_cast_mismatch_fails() {
    let mock = MockConnection::new().push_rows(
        vec![ColumnSchema::new("name", SqlType::Text)],
        vec![vec![Some(Value::Text("markus".into()))]],
    );
    let conn = open(mock).await;

    let err = conn
        .execute_scalar::<i64>("select name from item", &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Access(AccessError::Cast { .. })
    ));
}

#[tokio::test]
async fn test_execute_non_query_returns_affected_count() {
    let (conn, journal) = open_with_journal(MockConnection::new().push_rows_affected(3)).await;

    let affected = conn
        .execute_non_query("delete from item where itemid < @limit", &[
            Parameter::new("limit", 10),
        ])
        .await
        .unwrap();
    assert_eq!(affected, 3);
    assert_eq!(journal.len(), 1);
}

// ============================================================================
// Section 4: Command Lifecycle
// ============================================================================

#[tokio::test]
async fn test_result_outlives_closed_command_and_connection() {
    let conn = open(item_select_mock()).await;

    let mut cmd = conn.query("select * from item", &[]).unwrap();
    let result = cmd.materialize().await.unwrap();
    cmd.close();
    cmd.close(); // double close is a no-op
    conn.close().await.unwrap();
    drop(cmd);
    drop(conn);

    // The materialized result is untouched by any of the above
    assert_eq!(result.row_count(), 2);
    assert_eq!(result.rows()[0].value::<String, _>("name").unwrap(), "markus");
}

#[tokio::test]
async fn test_closed_command_refuses_execution() {
    let conn = open(item_select_mock()).await;

    let mut cmd = conn.query("select * from item", &[]).unwrap();
    cmd.close();
    let err = cmd.materialize().await.unwrap_err();
    assert!(matches!(err, CommandError::Closed));
}

#[tokio::test]
async fn test_stored_procedure_mode_reaches_driver() {
    let mock = MockConnection::new().push_rows(item_columns(), item_rows());
    let (conn, journal) = open_with_journal(mock).await;

    let mut cmd = conn
        .query("list_items", &[])
        .unwrap()
        .with_mode(CommandMode::StoredProcedure);
    cmd.materialize().await.unwrap();
    cmd.close();

    assert_eq!(journal.calls()[0].mode, CommandMode::StoredProcedure);
}

#[tokio::test]
async fn test_command_timeout_expires_as_timeout_error() {
    let mock = MockConnection::new()
        .latency(Duration::from_secs(10))
        .push_rows(item_columns(), item_rows());
    let conn = open(mock).await;

    let mut cmd = conn
        .query("select * from item", &[])
        .unwrap()
        .with_timeout(Duration::from_millis(20));
    let err = cmd.materialize().await.unwrap_err();
    cmd.close();

    assert!(matches!(err, CommandError::Timeout { .. }));
}

#[tokio::test]
async fn test_connection_default_timeout_applies_to_commands() {
    let mock = MockConnection::new()
        .latency(Duration::from_secs(10))
        .push_rows(item_columns(), item_rows());
    let conn = Connection::open_with(
        Box::new(mock),
        ConnectionOptions::new().with_default_timeout(Duration::from_millis(20)),
    )
    .await
    .unwrap();

    let err = conn.select("select * from item", &[]).await.unwrap_err();
    assert!(matches!(err, CommandError::Timeout { .. }));
}

#[tokio::test]
async fn test_driver_failure_passes_through() {
    let conn = open(MockConnection::new().push_error("table ITEM not found")).await;

    let err = conn.select("select * from item", &[]).await.unwrap_err();
    let CommandError::Driver(driver_err) = err else {
        panic!("expected a driver pass-through, got {err:?}");
    };
    assert!(driver_err.message.contains("ITEM"));
}

// ============================================================================
// Section 5: Connection Lifecycle
// ============================================================================

#[tokio::test]
async fn test_open_failure_is_connection_failure() {
    let err = Connection::open(Box::new(MockConnection::new().fail_open("refused")))
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectionError::OpenFailed { .. }));
}

#[tokio::test]
async fn test_open_skips_already_open_driver() {
    // An already-open driver with open() scripted to fail: open must not
    // be called again.
    let mock = MockConnection::new().already_open().fail_open("must not reopen");
    let conn = Connection::open(Box::new(mock)).await.unwrap();
    assert!(!conn.is_closed());
}

#[tokio::test]
async fn test_execute_after_close_is_connection_failure() {
    let conn = open(item_select_mock()).await;
    conn.close().await.unwrap();

    let err = conn.select("select * from item", &[]).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Connection(ConnectionError::Closed)
    ));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let conn = open(MockConnection::new()).await;
    conn.close().await.unwrap();
    conn.close().await.unwrap();
    assert!(conn.is_closed());
}

// ============================================================================
// Section 6: Formatting
// ============================================================================

#[tokio::test]
async fn test_formatted_field_rendering() {
    let conn = open(item_select_mock()).await;
    let result = conn.select("select * from item", &[]).await.unwrap();
    let row = &result.rows()[0];

    assert_eq!(row.formatted::<i64, _>("itemid", "0>4").unwrap(), "0001");
    assert_eq!(row.formatted::<String, _>("name", "^10").unwrap(), "  markus  ");
}

#[tokio::test]
async fn test_malformed_format_spec_is_format_error() {
    let conn = open(item_select_mock()).await;
    let result = conn.select("select * from item", &[]).await.unwrap();

    let err = result.rows()[0]
        .formatted::<i64, _>("itemid", "not-a-spec")
        .unwrap_err();
    assert!(matches!(err, AccessError::Format { .. }));
}
