// SPDX-License-Identifier: Apache-2.0

//! Result Mapper: tabular result → ordered row maps.

use mssql_core::{EngineError, EngineResult, ResultRow, ResultSet};

/// Builds one [`ResultRow`] per result row, keyed by the column names the
/// metadata reported (case preserved) and in column order.
///
/// Zero rows yield an empty vector. If a statement returns the same column
/// name twice, the later value wins.
pub fn map_result_set(result_set: ResultSet) -> EngineResult<Vec<ResultRow>> {
    let ResultSet { columns, rows } = result_set;
    let column_count = columns.len();

    rows.into_iter()
        .enumerate()
        .map(|(idx, values)| {
            if values.len() != column_count {
                return Err(EngineError::internal(format!(
                    "Row {} has {} values but the result reports {} columns",
                    idx,
                    values.len(),
                    column_count
                )));
            }
            let mut row = ResultRow::with_capacity(column_count);
            for (name, value) in columns.iter().zip(values) {
                row.insert(name.clone(), value);
            }
            Ok(row)
        })
        .collect()
}
