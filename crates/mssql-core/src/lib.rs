// SPDX-License-Identifier: Apache-2.0

//! Core types for the MSSQL connector: values, the Operation Request model,
//! the Response Envelope and the unified error type.

pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod sensitive;
pub mod types;
pub mod validation;

pub use config::ConnectionConfig;
pub use error::{EngineError, EngineResult};
pub use request::{
    AlterAction, AlterTable, ColumnConstraints, ColumnDefinition, CreateDatabase, CreateTable,
    DeleteData, InsertData, OperationKind, OperationRequest, OrderSpec, ReadData, SortDirection,
    UpdateData,
};
pub use response::{QueryResponse, ResponsePayload};
pub use sensitive::Sensitive;
pub use types::{FilterMap, ResultRow, ResultSet, Value};
pub use validation::Validate;
