// SPDX-License-Identifier: Apache-2.0

//! Operation Request model
//!
//! One struct per operation kind, each carrying only the fields that
//! operation needs, and the [`OperationRequest`] sum type tying them
//! together. Required string fields default to empty when absent so that a
//! missing field surfaces as a "must not be blank" validation failure rather
//! than a decoding error.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{FilterMap, Value};
use crate::validation::{require_identifier, require_identifiers, require_non_blank, Validate};

/// SQL Server caps a table value constructor at 1000 rows.
pub const MAX_INSERT_ROWS: usize = 1000;
/// SQL Server caps an RPC request at 2100 parameters.
pub const MAX_PARAMETERS: usize = 2100;

// ==================== Operation Kind ====================

/// Discriminator carried in the connector input's `operation` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "mssql.create-database")]
    CreateDatabase,
    #[serde(rename = "mssql.create-table")]
    CreateTable,
    #[serde(rename = "mssql.alter-table")]
    AlterTable,
    #[serde(rename = "mssql.insert-data")]
    InsertData,
    #[serde(rename = "mssql.read-data")]
    ReadData,
    #[serde(rename = "mssql.update-data")]
    UpdateData,
    #[serde(rename = "mssql.delete-data")]
    DeleteData,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        OperationKind::CreateDatabase,
        OperationKind::CreateTable,
        OperationKind::AlterTable,
        OperationKind::InsertData,
        OperationKind::ReadData,
        OperationKind::UpdateData,
        OperationKind::DeleteData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::CreateDatabase => "mssql.create-database",
            OperationKind::CreateTable => "mssql.create-table",
            OperationKind::AlterTable => "mssql.alter-table",
            OperationKind::InsertData => "mssql.insert-data",
            OperationKind::ReadData => "mssql.read-data",
            OperationKind::UpdateData => "mssql.update-data",
            OperationKind::DeleteData => "mssql.delete-data",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EngineError::validation(format!("operation: unsupported operation '{s}'")))
    }
}

// ==================== Shared Pieces ====================

/// Sort direction for ORDER BY entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `d`, `desc` and `descending` (any case) mean descending; anything
    /// else, including an absent value, is ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.to_ascii_lowercase()) {
            Some(s) if matches!(s.as_str(), "d" | "desc" | "descending") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One ORDER BY entry: `{ "sortOn": "Age", "order": "desc" }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSpec {
    #[serde(default)]
    pub sort_on: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

impl OrderSpec {
    pub fn new(sort_on: impl Into<String>, order: Option<&str>) -> Self {
        Self {
            sort_on: Some(sort_on.into()),
            order: order.map(str::to_string),
        }
    }

    pub fn direction(&self) -> SortDirection {
        SortDirection::parse(self.order.as_deref())
    }

    /// The sort field, or `None` when absent or blank.
    pub fn field(&self) -> Option<&str> {
        self.sort_on.as_deref().filter(|f| !f.trim().is_empty())
    }
}

/// Per-column constraints for CREATE TABLE / ALTER TABLE
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnConstraints {
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
    pub identity: bool,
    pub default: Option<Value>,
}

/// Column definition: `{ "colName": "Age", "dataType": "INT", "constraints": {...} }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    #[serde(default)]
    pub col_name: String,
    #[serde(default, alias = "datatype")]
    pub data_type: String,
    #[serde(default)]
    pub constraints: ColumnConstraints,
}

impl ColumnDefinition {
    pub fn new(col_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            col_name: col_name.into(),
            data_type: data_type.into(),
            constraints: ColumnConstraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: ColumnConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    fn validate_at(&self, field: &str) -> EngineResult<()> {
        require_identifier(&format!("{field}.colName"), &self.col_name)?;
        require_identifier(&format!("{field}.dataType"), &self.data_type)
    }
}

fn validate_columns(field: &str, columns: &[ColumnDefinition]) -> EngineResult<()> {
    if columns.is_empty() {
        return Err(EngineError::validation(format!("{field}: must not be empty")));
    }
    for (idx, column) in columns.iter().enumerate() {
        column.validate_at(&format!("{field}[{idx}]"))?;
    }
    Ok(())
}

fn validate_filters(filters: Option<&FilterMap>) -> EngineResult<()> {
    if let Some(filters) = filters {
        require_identifiers("filters", filters.keys())?;
    }
    Ok(())
}

// ==================== Operation Payloads ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabase {
    #[serde(default)]
    pub database_name: String,
}

impl Validate for CreateDatabase {
    fn validate(&self) -> EngineResult<()> {
        require_identifier("databaseName", &self.database_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTable {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub columns_list: Vec<ColumnDefinition>,
}

impl Validate for CreateTable {
    fn validate(&self) -> EngineResult<()> {
        require_non_blank("databaseName", &self.database_name)?;
        require_identifier("tableName", &self.table_name)?;
        validate_columns("columnsList", &self.columns_list)
    }
}

/// ALTER TABLE action, selected by the `method` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AlterAction {
    Add { columns_list: Vec<ColumnDefinition> },
    Drop { column_names: Vec<String> },
    Modify { columns_list: Vec<ColumnDefinition> },
    Rename { column_name: String, new_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlterTable {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(flatten)]
    pub action: AlterAction,
}

impl Validate for AlterTable {
    fn validate(&self) -> EngineResult<()> {
        require_non_blank("databaseName", &self.database_name)?;
        require_identifier("tableName", &self.table_name)?;
        match &self.action {
            AlterAction::Add { columns_list } | AlterAction::Modify { columns_list } => {
                validate_columns("columnsList", columns_list)
            }
            AlterAction::Drop { column_names } => {
                if column_names.is_empty() {
                    return Err(EngineError::validation("columnNames: must not be empty"));
                }
                require_identifiers("columnNames", column_names)
            }
            AlterAction::Rename {
                column_name,
                new_name,
            } => {
                require_identifier("columnName", column_name)?;
                require_identifier("newName", new_name)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertData {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub data_to_insert: Vec<IndexMap<String, Value>>,
}

impl Validate for InsertData {
    fn validate(&self) -> EngineResult<()> {
        require_non_blank("databaseName", &self.database_name)?;
        require_identifier("tableName", &self.table_name)?;

        let Some(first) = self.data_to_insert.first() else {
            return Err(EngineError::validation("dataToInsert: must not be empty"));
        };
        if first.is_empty() {
            return Err(EngineError::validation("dataToInsert[0]: must not be empty"));
        }
        require_identifiers("dataToInsert[0]", first.keys())?;

        for (idx, row) in self.data_to_insert.iter().enumerate().skip(1) {
            let same_columns =
                row.len() == first.len() && first.keys().all(|col| row.contains_key(col));
            if !same_columns {
                return Err(EngineError::validation(format!(
                    "dataToInsert[{idx}]: every row must carry the same columns as dataToInsert[0]"
                )));
            }
        }

        if self.data_to_insert.len() > MAX_INSERT_ROWS {
            return Err(EngineError::validation(format!(
                "dataToInsert: at most {MAX_INSERT_ROWS} rows per request"
            )));
        }
        let params = self.data_to_insert.len() * first.len();
        if params > MAX_PARAMETERS {
            return Err(EngineError::validation(format!(
                "dataToInsert: {params} values exceed the limit of {MAX_PARAMETERS} per request"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadData {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub column_names: Option<Vec<String>>,
    #[serde(default)]
    pub filters: Option<FilterMap>,
    #[serde(default)]
    pub order_by: Option<Vec<OrderSpec>>,
    #[serde(default)]
    pub top: Option<i64>,
}

impl Validate for ReadData {
    fn validate(&self) -> EngineResult<()> {
        require_non_blank("databaseName", &self.database_name)?;
        require_identifier("tableName", &self.table_name)?;
        if let Some(columns) = &self.column_names {
            require_identifiers("columnNames", columns)?;
        }
        validate_filters(self.filters.as_ref())?;
        if let Some(order_by) = &self.order_by {
            for (idx, spec) in order_by.iter().enumerate() {
                if let Some(field) = spec.field() {
                    require_identifier(&format!("orderBy[{idx}].sortOn"), field)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateData {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub updates: IndexMap<String, Value>,
    #[serde(default)]
    pub filters: Option<FilterMap>,
}

impl Validate for UpdateData {
    fn validate(&self) -> EngineResult<()> {
        require_non_blank("databaseName", &self.database_name)?;
        require_identifier("tableName", &self.table_name)?;
        if self.updates.is_empty() {
            return Err(EngineError::validation("updates: must not be empty"));
        }
        require_identifiers("updates", self.updates.keys())?;
        validate_filters(self.filters.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteData {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub filters: Option<FilterMap>,
}

impl Validate for DeleteData {
    fn validate(&self) -> EngineResult<()> {
        require_non_blank("databaseName", &self.database_name)?;
        require_identifier("tableName", &self.table_name)?;
        validate_filters(self.filters.as_ref())
    }
}

// ==================== Operation Request ====================

/// Exactly one operation per request.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    CreateDatabase(CreateDatabase),
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    InsertData(InsertData),
    ReadData(ReadData),
    UpdateData(UpdateData),
    DeleteData(DeleteData),
}

impl OperationRequest {
    /// Decodes the `data` payload according to the `operation` discriminator.
    pub fn from_parts(operation: &str, data: serde_json::Value) -> EngineResult<Self> {
        let kind: OperationKind = operation.parse()?;
        let request = match kind {
            OperationKind::CreateDatabase => Self::CreateDatabase(serde_json::from_value(data)?),
            OperationKind::CreateTable => Self::CreateTable(serde_json::from_value(data)?),
            OperationKind::AlterTable => Self::AlterTable(serde_json::from_value(data)?),
            OperationKind::InsertData => Self::InsertData(serde_json::from_value(data)?),
            OperationKind::ReadData => Self::ReadData(serde_json::from_value(data)?),
            OperationKind::UpdateData => Self::UpdateData(serde_json::from_value(data)?),
            OperationKind::DeleteData => Self::DeleteData(serde_json::from_value(data)?),
        };
        Ok(request)
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CreateDatabase(_) => OperationKind::CreateDatabase,
            Self::CreateTable(_) => OperationKind::CreateTable,
            Self::AlterTable(_) => OperationKind::AlterTable,
            Self::InsertData(_) => OperationKind::InsertData,
            Self::ReadData(_) => OperationKind::ReadData,
            Self::UpdateData(_) => OperationKind::UpdateData,
            Self::DeleteData(_) => OperationKind::DeleteData,
        }
    }

    pub fn database_name(&self) -> &str {
        match self {
            Self::CreateDatabase(r) => &r.database_name,
            Self::CreateTable(r) => &r.database_name,
            Self::AlterTable(r) => &r.database_name,
            Self::InsertData(r) => &r.database_name,
            Self::ReadData(r) => &r.database_name,
            Self::UpdateData(r) => &r.database_name,
            Self::DeleteData(r) => &r.database_name,
        }
    }

    /// Target table, `None` for CREATE DATABASE.
    pub fn table_name(&self) -> Option<&str> {
        match self {
            Self::CreateDatabase(_) => None,
            Self::CreateTable(r) => Some(&r.table_name),
            Self::AlterTable(r) => Some(&r.table_name),
            Self::InsertData(r) => Some(&r.table_name),
            Self::ReadData(r) => Some(&r.table_name),
            Self::UpdateData(r) => Some(&r.table_name),
            Self::DeleteData(r) => Some(&r.table_name),
        }
    }
}

impl Validate for OperationRequest {
    fn validate(&self) -> EngineResult<()> {
        match self {
            Self::CreateDatabase(r) => r.validate(),
            Self::CreateTable(r) => r.validate(),
            Self::AlterTable(r) => r.validate(),
            Self::InsertData(r) => r.validate(),
            Self::ReadData(r) => r.validate(),
            Self::UpdateData(r) => r.validate(),
            Self::DeleteData(r) => r.validate(),
        }
    }
}
