// SPDX-License-Identifier: Apache-2.0

//! Operation Dispatcher
//!
//! Decodes the connector input (`databaseConnection`, `operation`, `data`),
//! validates it, generates the statement and hands it to the executor
//! together with a freshly opened connection.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use mssql_core::{
    ConnectionConfig, EngineResult, OperationKind, OperationRequest, QueryResponse, Validate,
};
use mssql_drivers::{executor, Connector, SqlServerConnector};
use mssql_query::generate;

/// Connector input as delivered by the workflow engine, secrets resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRequest {
    pub database_connection: ConnectionConfig,
    pub operation: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ConnectorRequest {
    pub fn from_json(input: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Splits the input into validated connection settings and the typed
    /// operation.
    pub fn into_parts(self) -> EngineResult<(ConnectionConfig, OperationRequest)> {
        self.database_connection.validate()?;
        let operation = OperationRequest::from_parts(&self.operation, self.data)?;
        Ok((self.database_connection, operation))
    }
}

/// Entry point of the connector.
///
/// `make_connector` turns the request's connection settings into a
/// [`Connector`]; [`MssqlFunction::new`] wires in the tiberius one.
pub struct MssqlFunction<F> {
    make_connector: F,
}

impl MssqlFunction<fn(ConnectionConfig) -> SqlServerConnector> {
    pub fn new() -> Self {
        Self {
            make_connector: SqlServerConnector::new,
        }
    }
}

impl Default for MssqlFunction<fn(ConnectionConfig) -> SqlServerConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, C> MssqlFunction<F>
where
    F: Fn(ConnectionConfig) -> C + Send + Sync,
    C: Connector,
{
    pub fn with_connector(make_connector: F) -> Self {
        Self { make_connector }
    }

    /// Runs the operation described by a raw JSON input.
    pub async fn execute_json(&self, input: &str) -> EngineResult<QueryResponse> {
        self.execute(ConnectorRequest::from_json(input)?).await
    }

    #[instrument(skip(self, request), fields(operation = %request.operation))]
    pub async fn execute(&self, request: ConnectorRequest) -> EngineResult<QueryResponse> {
        let (config, operation) = request.into_parts()?;
        tracing::debug!("Request verified successfully");
        let connector = (self.make_connector)(config);
        invoke(&connector, &operation).await
    }
}

/// Generates the statement for `request`, opens a connection and executes.
///
/// Validation and generation happen before any connection is opened.
#[instrument(
    skip(connector, request),
    fields(
        operation = %request.kind(),
        database = %request.database_name(),
        table = request.table_name().unwrap_or_default()
    )
)]
pub async fn invoke<C: Connector>(
    connector: &C,
    request: &OperationRequest,
) -> EngineResult<QueryResponse> {
    let statement = generate(request)?;

    // CREATE DATABASE runs against the login's default database.
    let database = match request.kind() {
        OperationKind::CreateDatabase => None,
        _ => Some(request.database_name()),
    };
    let connection = connector.connect(database).await?;

    executor::execute(connection, &statement).await
}
