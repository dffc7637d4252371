// SPDX-License-Identifier: Apache-2.0

//! Live round trip against a SQL Server instance.
//!
//! Skipped unless `MSSQL_TEST_HOST` is set, e.g.
//! `docker run -e ACCEPT_EULA=Y -e MSSQL_SA_PASSWORD=Connector#2024 -p 1433:1433 mcr.microsoft.com/mssql/server:2022-latest`

use serde_json::json;
use tokio::time::{timeout, Duration};

use mssql_connector::{ConnectorRequest, EngineError, MssqlFunction, QueryResponse};

const TEST_TIMEOUT: Duration = Duration::from_secs(60);

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u16_or_default(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(default)
}

fn connection() -> Option<serde_json::Value> {
    let host = std::env::var("MSSQL_TEST_HOST").ok()?;
    Some(json!({
        "host": host,
        "port": env_u16_or_default("MSSQL_TEST_PORT", 1433),
        "username": env_or_default("MSSQL_TEST_USER", "sa"),
        "password": env_or_default("MSSQL_TEST_PASSWORD", "Connector#2024"),
        "trustServerCertificate": true
    }))
}

async fn call(
    connection: &serde_json::Value,
    operation: &str,
    data: serde_json::Value,
) -> Result<QueryResponse, EngineError> {
    let request: ConnectorRequest = serde_json::from_value(json!({
        "databaseConnection": connection,
        "operation": operation,
        "data": data
    }))
    .expect("request should decode");
    timeout(TEST_TIMEOUT, MssqlFunction::new().execute(request))
        .await
        .expect("operation timed out")
}

#[tokio::test]
async fn sqlserver_person_round_trip() {
    let Some(conn) = connection() else {
        eprintln!("MSSQL_TEST_HOST not set, skipping SQL Server integration test");
        return;
    };

    let suffix = std::process::id();
    let database = format!("connector_it_{suffix}");

    let response = call(
        &conn,
        "mssql.create-database",
        json!({"databaseName": database}),
    )
    .await
    .unwrap();
    assert_eq!(
        response.as_status(),
        Some(format!("Database '{database}' created successfully").as_str())
    );

    call(
        &conn,
        "mssql.create-table",
        json!({
            "databaseName": database,
            "tableName": "Person",
            "columnsList": [
                {"colName": "PersonID", "dataType": "INT", "constraints": {"primaryKey": true}},
                {"colName": "Name", "dataType": "NVARCHAR(100)", "constraints": {"notNull": true}},
                {"colName": "City", "dataType": "NVARCHAR(50)"}
            ]
        }),
    )
    .await
    .unwrap();

    let response = call(
        &conn,
        "mssql.insert-data",
        json!({
            "databaseName": database,
            "tableName": "Person",
            "dataToInsert": [
                {"PersonID": 1, "Name": "Asha", "City": "Pune"},
                {"PersonID": 2, "Name": "Ravi", "City": "Delhi"}
            ]
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.as_status(), Some("2 row(s) inserted successfully"));

    let duplicate = call(
        &conn,
        "mssql.insert-data",
        json!({
            "databaseName": database,
            "tableName": "Person",
            "dataToInsert": [{"PersonID": 1, "Name": "Again", "City": "Pune"}]
        }),
    )
    .await;
    assert!(matches!(duplicate, Err(EngineError::ExecutionError { .. })));

    let response = call(
        &conn,
        "mssql.read-data",
        json!({
            "databaseName": database,
            "tableName": "Person",
            "filters": {"City": "Pune"},
            "top": 10
        }),
    )
    .await
    .unwrap();
    let rows = response.as_rows().expect("read returns rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["PersonID", "Name", "City"]
    );

    let missing = call(
        &conn,
        "mssql.read-data",
        json!({"databaseName": database, "tableName": "Ghost"}),
    )
    .await;
    assert!(matches!(missing, Err(EngineError::TableNotFound { .. })));

    let response = call(
        &conn,
        "mssql.delete-data",
        json!({"databaseName": database, "tableName": "Person", "filters": {"City": "Delhi"}}),
    )
    .await
    .unwrap();
    assert_eq!(response.as_status(), Some("1 row(s) deleted successfully"));
}
