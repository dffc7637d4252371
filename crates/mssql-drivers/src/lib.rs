// SPDX-License-Identifier: Apache-2.0

//! SQL Server connectivity for the MSSQL connector: the connection
//! contract, its tiberius implementation, the statement executor and the
//! result mapper.

pub mod connection;
pub mod executor;
pub mod mapper;
pub mod sqlserver;

pub use connection::{Connector, SqlConnection};
pub use executor::execute;
pub use mapper::map_result_set;
pub use sqlserver::{SqlServerConnection, SqlServerConnector};
