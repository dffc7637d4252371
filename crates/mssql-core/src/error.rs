// SPDX-License-Identifier: Apache-2.0

//! Normalized error types for the MSSQL connector
//!
//! Engine, driver and request-decoding failures are all mapped to these
//! variants so the caller sees a single failure type per operation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all connector operations
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EngineError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Query execution error: {message}")]
    ExecutionError { message: String },

    /// Refinement of `ExecutionError` for "Invalid object name" style failures.
    /// `message` keeps the original engine text.
    #[error("Table '{table}' doesn't exist")]
    TableNotFound { table: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: msg.into() }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest { message: msg.into() }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError { message: msg.into() }
    }

    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::ExecutionError { message: msg.into() }
    }

    pub fn table_not_found(table: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal { message: msg.into() }
    }

    /// Shorthand for the "must not be blank" failure on a required field.
    pub fn blank_field(field: &str) -> Self {
        Self::validation(format!("{field}: must not be blank"))
    }

    /// True for failures raised before any statement reached the server.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError { .. } | Self::InvalidRequest { .. })
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_request(err.to_string())
    }
}

/// Result type alias for connector operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_not_found_names_the_table() {
        let err = EngineError::table_not_found("Ghost", "Invalid object name 'Ghost'.");
        assert_eq!(err.to_string(), "Table 'Ghost' doesn't exist");
    }

    #[test]
    fn blank_field_message() {
        let err = EngineError::blank_field("tableName");
        assert_eq!(err.to_string(), "Validation error: tableName: must not be blank");
        assert!(err.is_validation());
    }

    #[test]
    fn json_errors_become_invalid_request() {
        let err: EngineError = serde_json::from_str::<u8>("\"x\"").unwrap_err().into();
        assert!(matches!(err, EngineError::InvalidRequest { .. }));
    }
}
