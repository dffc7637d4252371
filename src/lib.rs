// SPDX-License-Identifier: Apache-2.0

//! MSSQL connector
//!
//! Runs one data operation per invocation against Microsoft SQL Server:
//! create a database or table, alter a table, insert, read, update or
//! delete rows. The heavy lifting lives in the workspace crates:
//!
//! - `mssql-core`: request model, values, response envelope, errors
//! - `mssql-query`: T-SQL clause and statement generation
//! - `mssql-drivers`: tiberius connection, executor and result mapper

pub mod function;
pub mod observability;

pub use function::{invoke, ConnectorRequest, MssqlFunction};

pub use mssql_core::{
    ConnectionConfig, EngineError, EngineResult, OperationKind, OperationRequest, QueryResponse,
    ResponsePayload, Value,
};
