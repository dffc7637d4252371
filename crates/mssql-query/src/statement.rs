// SPDX-License-Identifier: Apache-2.0

//! Statement Generators
//!
//! One generator per operation kind. Each composes Clause Builder output
//! into a complete T-SQL statement. INSERT and UPDATE bind user data as
//! `@Pn` parameters; WHERE predicates and DDL are rendered inline.

use mssql_core::{
    AlterAction, AlterTable, ColumnDefinition, CreateDatabase, CreateTable, DeleteData,
    EngineResult, InsertData, OperationKind, OperationRequest, ReadData, UpdateData, Validate,
    Value,
};

use crate::clause::{
    build_column_list, build_order_by_clause, build_top_clause, build_where_clause,
    format_literal, join_fragments, quote_string,
};

/// How a statement is handed to the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Returns a result set.
    Query,
    /// Parameterized DML returning an update count.
    Update,
    /// Plain, non-parameterized batch (DDL).
    Batch,
}

/// A generated statement ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: OperationKind,
    pub sql: String,
    /// Values for `@P1..@Pn`, in marker order.
    pub params: Vec<Value>,
    /// Object the statement targets (table, or database for CREATE DATABASE).
    pub target: String,
}

impl Statement {
    fn new(kind: OperationKind, sql: String, target: &str) -> Self {
        Self {
            kind,
            sql,
            params: Vec::new(),
            target: target.to_string(),
        }
    }

    fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        match self.kind {
            OperationKind::ReadData => ExecutionMode::Query,
            OperationKind::InsertData | OperationKind::UpdateData | OperationKind::DeleteData => {
                ExecutionMode::Update
            }
            OperationKind::CreateDatabase
            | OperationKind::CreateTable
            | OperationKind::AlterTable => ExecutionMode::Batch,
        }
    }
}

/// Validates the request, then builds its statement.
pub fn generate(request: &OperationRequest) -> EngineResult<Statement> {
    request.validate()?;
    let statement = match request {
        OperationRequest::CreateDatabase(r) => create_database(r),
        OperationRequest::CreateTable(r) => create_table(r),
        OperationRequest::AlterTable(r) => alter_table(r),
        OperationRequest::InsertData(r) => insert(r),
        OperationRequest::ReadData(r) => read(r),
        OperationRequest::UpdateData(r) => update(r),
        OperationRequest::DeleteData(r) => delete(r),
    };
    Ok(statement)
}

// ==================== DML ====================

/// `SELECT [TOP n] <columns> FROM <table> [WHERE ...] [ORDER BY ...]`
pub fn read(request: &ReadData) -> Statement {
    let where_clause = build_where_clause(request.filters.as_ref());
    if where_clause.is_empty() {
        tracing::debug!(
            table = %request.table_name,
            "WHERE clause is empty, this will return all rows in the table"
        );
    }
    let top = build_top_clause(request.top);
    let columns = build_column_list(request.column_names.as_deref());
    let order_by = build_order_by_clause(request.order_by.as_deref());

    let sql = join_fragments(&[
        "SELECT",
        top.as_str(),
        columns.as_str(),
        "FROM",
        request.table_name.as_str(),
        where_clause.as_str(),
        order_by.as_str(),
    ]);
    Statement::new(OperationKind::ReadData, sql, &request.table_name)
}

/// `INSERT INTO <table> (<cols>) VALUES (@P1, ...), (...)`
///
/// Column order follows the first row; later rows are bound in that order.
pub fn insert(request: &InsertData) -> Statement {
    let columns: Vec<&String> = request
        .data_to_insert
        .first()
        .map(|row| row.keys().collect())
        .unwrap_or_default();

    let mut params = Vec::with_capacity(columns.len() * request.data_to_insert.len());
    let mut tuples = Vec::with_capacity(request.data_to_insert.len());
    for row in &request.data_to_insert {
        let markers: Vec<String> = columns
            .iter()
            .map(|col| {
                params.push(row.get(*col).cloned().unwrap_or(Value::Null));
                format!("@P{}", params.len())
            })
            .collect();
        tuples.push(format!("({})", markers.join(", ")));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        request.table_name,
        columns
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        tuples.join(", ")
    );
    Statement::new(OperationKind::InsertData, sql, &request.table_name).with_params(params)
}

/// `UPDATE <table> SET col = @P1, ... [WHERE ...]`
pub fn update(request: &UpdateData) -> Statement {
    let mut params = Vec::with_capacity(request.updates.len());
    let set_parts: Vec<String> = request
        .updates
        .iter()
        .map(|(col, val)| {
            params.push(val.clone());
            format!("{} = @P{}", col, params.len())
        })
        .collect();
    let set_clause = format!("SET {}", set_parts.join(", "));

    let where_clause = build_where_clause(request.filters.as_ref());
    if where_clause.is_empty() {
        tracing::warn!(table = %request.table_name, "UPDATE without filters affects every row");
    }

    let sql = join_fragments(&[
        "UPDATE",
        request.table_name.as_str(),
        set_clause.as_str(),
        where_clause.as_str(),
    ]);
    Statement::new(OperationKind::UpdateData, sql, &request.table_name).with_params(params)
}

/// `DELETE FROM <table> [WHERE ...]`
pub fn delete(request: &DeleteData) -> Statement {
    let where_clause = build_where_clause(request.filters.as_ref());
    if where_clause.is_empty() {
        tracing::warn!(table = %request.table_name, "DELETE without filters removes every row");
    }

    let sql = join_fragments(&[
        "DELETE FROM",
        request.table_name.as_str(),
        where_clause.as_str(),
    ]);
    Statement::new(OperationKind::DeleteData, sql, &request.table_name)
}

// ==================== DDL ====================

/// `CREATE DATABASE <name>`
pub fn create_database(request: &CreateDatabase) -> Statement {
    let sql = format!("CREATE DATABASE {}", request.database_name);
    Statement::new(OperationKind::CreateDatabase, sql, &request.database_name)
}

/// `CREATE TABLE <table> (<column defs>[, PRIMARY KEY (a, b)])`
///
/// A single primary-key column is declared inline; several become one
/// composite table constraint.
pub fn create_table(request: &CreateTable) -> Statement {
    let pk_columns: Vec<&str> = request
        .columns_list
        .iter()
        .filter(|c| c.constraints.primary_key)
        .map(|c| c.col_name.as_str())
        .collect();
    let inline_pk = pk_columns.len() == 1;

    let mut definitions: Vec<String> = request
        .columns_list
        .iter()
        .map(|c| column_definition(c, inline_pk))
        .collect();
    if pk_columns.len() > 1 {
        definitions.push(format!("PRIMARY KEY ({})", pk_columns.join(", ")));
    }

    let sql = format!(
        "CREATE TABLE {} ({})",
        request.table_name,
        definitions.join(", ")
    );
    Statement::new(OperationKind::CreateTable, sql, &request.table_name)
}

/// `ALTER TABLE` for add/drop/modify; `sp_rename` for column renames.
pub fn alter_table(request: &AlterTable) -> Statement {
    let table = &request.table_name;
    let sql = match &request.action {
        AlterAction::Add { columns_list } => {
            let defs: Vec<String> = columns_list
                .iter()
                .map(|c| column_definition(c, true))
                .collect();
            format!("ALTER TABLE {} ADD {}", table, defs.join(", "))
        }
        AlterAction::Drop { column_names } => {
            format!("ALTER TABLE {} DROP COLUMN {}", table, column_names.join(", "))
        }
        // ALTER COLUMN takes one column and only the type and nullability.
        AlterAction::Modify { columns_list } => columns_list
            .iter()
            .map(|c| {
                let nullability = if c.constraints.not_null || c.constraints.primary_key {
                    "NOT NULL"
                } else {
                    "NULL"
                };
                format!(
                    "ALTER TABLE {} ALTER COLUMN {} {} {}",
                    table, c.col_name, c.data_type, nullability
                )
            })
            .collect::<Vec<_>>()
            .join("; "),
        AlterAction::Rename {
            column_name,
            new_name,
        } => format!(
            "EXEC sp_rename {}, {}, 'COLUMN'",
            quote_string(&format!("{}.{}", table, column_name)),
            quote_string(new_name)
        ),
    };
    Statement::new(OperationKind::AlterTable, sql, table)
}

fn column_definition(column: &ColumnDefinition, inline_pk: bool) -> String {
    let constraints = &column.constraints;
    let primary_key = constraints.primary_key && inline_pk;

    let mut parts: Vec<String> = vec![column.col_name.clone(), column.data_type.clone()];
    if constraints.identity {
        parts.push("IDENTITY(1,1)".to_string());
    }
    if constraints.not_null || constraints.primary_key {
        parts.push("NOT NULL".to_string());
    }
    if let Some(default) = &constraints.default {
        parts.push(format!("DEFAULT {}", format_literal(default)));
    }
    if primary_key {
        parts.push("PRIMARY KEY".to_string());
    } else if constraints.unique {
        parts.push("UNIQUE".to_string());
    }
    parts.join(" ")
}
