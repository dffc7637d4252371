// SPDX-License-Identifier: Apache-2.0

//! Connection contract
//!
//! The executor only ever talks to a live connection through
//! [`SqlConnection`]; how that connection was opened is the business of a
//! [`Connector`].

use async_trait::async_trait;

use mssql_core::{EngineResult, ResultSet, Value};

/// A live, authenticated database connection owned by one operation.
#[async_trait]
pub trait SqlConnection: Send {
    /// Runs a statement that returns rows.
    async fn query(&mut self, sql: &str) -> EngineResult<ResultSet>;

    /// Runs a parameterized statement (`@P1..@Pn`) and returns the number
    /// of affected rows.
    async fn execute(&mut self, sql: &str, params: &[Value]) -> EngineResult<u64>;

    /// Runs a plain, non-parameterized batch (DDL).
    async fn execute_batch(&mut self, sql: &str) -> EngineResult<()>;

    /// Releases the connection. Calling it again afterwards is a no-op.
    async fn close(&mut self) -> EngineResult<()>;
}

/// Opens connections for a given database.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: SqlConnection;

    /// `None` connects to the login's default database (used for
    /// CREATE DATABASE).
    async fn connect(&self, database: Option<&str>) -> EngineResult<Self::Connection>;
}
