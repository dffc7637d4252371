// SPDX-License-Identifier: Apache-2.0

//! T-SQL generation for the MSSQL connector.
//!
//! [`clause`] renders the individual fragments; [`statement`] composes them
//! into one statement per operation kind.

pub mod clause;
pub mod statement;

pub use clause::{
    build_column_list, build_order_by_clause, build_top_clause, build_where_clause,
    format_literal,
};
pub use statement::{generate, ExecutionMode, Statement};
