// SPDX-License-Identifier: Apache-2.0

//! Statement Executor
//!
//! Runs one generated statement on a connection it owns, maps the outcome
//! into a [`QueryResponse`] and closes the connection on every exit path:
//! success, engine failure, mapping failure and panic.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::instrument;

use mssql_core::{EngineError, EngineResult, OperationKind, QueryResponse};
use mssql_query::{ExecutionMode, Statement};

use crate::connection::SqlConnection;
use crate::mapper::map_result_set;

/// Engine texts meaning the referenced table does not exist
/// (SQL Server errors 208 and 4902).
const TABLE_NOT_FOUND_MARKERS: [&str; 2] = ["Invalid object name", "Cannot find the object"];

/// Executes `statement` on `connection`, then releases the connection.
///
/// A failure to close is logged and never replaces the operation's result.
#[instrument(
    skip(connection, statement),
    fields(operation = %statement.kind, target = %statement.target)
)]
pub async fn execute<C: SqlConnection>(
    mut connection: C,
    statement: &Statement,
) -> EngineResult<QueryResponse> {
    let outcome = AssertUnwindSafe(run(&mut connection, statement))
        .catch_unwind()
        .await;

    release(&mut connection).await;

    match outcome {
        Ok(result) => result.map_err(|err| translate_error(err, &statement.target)),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

async fn run<C: SqlConnection>(
    connection: &mut C,
    statement: &Statement,
) -> EngineResult<QueryResponse> {
    tracing::info!(sql = %statement.sql, params = statement.params.len(), "Executing statement");

    match statement.mode() {
        ExecutionMode::Query => {
            let result_set = connection.query(&statement.sql).await?;
            let rows = map_result_set(result_set)?;
            tracing::debug!(rows = rows.len(), "Read query completed");
            Ok(QueryResponse::rows(rows))
        }
        ExecutionMode::Update => {
            let affected = connection
                .execute(&statement.sql, &statement.params)
                .await?;
            let status = update_status(statement.kind, affected);
            tracing::debug!(affected, "{}", status);
            Ok(QueryResponse::status(status))
        }
        ExecutionMode::Batch => {
            connection.execute_batch(&statement.sql).await?;
            let status = ddl_status(statement);
            tracing::debug!("{}", status);
            Ok(QueryResponse::status(status))
        }
    }
}

async fn release<C: SqlConnection>(connection: &mut C) {
    match connection.close().await {
        Ok(()) => tracing::debug!("Connection closed"),
        Err(err) => tracing::warn!(error = %err, "Error while closing the database connection"),
    }
}

fn update_status(kind: OperationKind, affected: u64) -> String {
    let verb = match kind {
        OperationKind::InsertData => "inserted",
        OperationKind::UpdateData => "updated",
        OperationKind::DeleteData => "deleted",
        _ => "affected",
    };
    format!("{} row(s) {} successfully", affected, verb)
}

fn ddl_status(statement: &Statement) -> String {
    match statement.kind {
        OperationKind::CreateDatabase => {
            format!("Database '{}' created successfully", statement.target)
        }
        OperationKind::CreateTable => format!("Table '{}' created successfully", statement.target),
        _ => "Alter table query executed successfully".to_string(),
    }
}

/// Logs an engine failure and refines "object not found" texts into
/// [`EngineError::TableNotFound`].
fn translate_error(err: EngineError, table: &str) -> EngineError {
    match err {
        EngineError::ExecutionError { message } => {
            tracing::error!(error = %message, "Statement execution failed");
            if TABLE_NOT_FOUND_MARKERS
                .iter()
                .any(|marker| message.contains(marker))
            {
                EngineError::table_not_found(table, message)
            } else {
                EngineError::ExecutionError { message }
            }
        }
        other => {
            tracing::error!(error = %other, "Operation failed");
            other
        }
    }
}
