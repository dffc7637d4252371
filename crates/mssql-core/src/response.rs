// SPDX-License-Identifier: Apache-2.0

//! Response Envelope returned for every operation.

use serde::{Deserialize, Serialize};

use crate::types::ResultRow;

/// Payload of a [`QueryResponse`]: a status message for write/DDL operations
/// or the mapped rows for reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Status(String),
    Rows(Vec<ResultRow>),
}

/// Serializes as `{"response": "..."}` or `{"response": [{...}, ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    response: ResponsePayload,
}

impl QueryResponse {
    pub fn status(message: impl Into<String>) -> Self {
        Self {
            response: ResponsePayload::Status(message.into()),
        }
    }

    pub fn rows(rows: Vec<ResultRow>) -> Self {
        Self {
            response: ResponsePayload::Rows(rows),
        }
    }

    pub fn as_status(&self) -> Option<&str> {
        match &self.response {
            ResponsePayload::Status(message) => Some(message),
            ResponsePayload::Rows(_) => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[ResultRow]> {
        match &self.response {
            ResponsePayload::Rows(rows) => Some(rows),
            ResponsePayload::Status(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use serde_json::json;

    #[test]
    fn status_serializes_under_response() {
        let resp = QueryResponse::status("1 row(s) inserted successfully");
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"response": "1 row(s) inserted successfully"})
        );
        assert!(resp.as_rows().is_none());
    }

    #[test]
    fn rows_keep_column_order() {
        let mut row = ResultRow::new();
        row.insert("Name".to_string(), Value::from("Asha"));
        row.insert("Age".to_string(), Value::Int(31));
        let resp = QueryResponse::rows(vec![row]);

        let text = serde_json::to_string(&resp).unwrap();
        assert_eq!(text, r#"{"response":[{"Name":"Asha","Age":31}]}"#);
        assert_eq!(resp.as_rows().map(<[_]>::len), Some(1));
    }

    #[test]
    fn empty_rows_stay_an_array() {
        let resp = QueryResponse::rows(Vec::new());
        assert_eq!(serde_json::to_value(&resp).unwrap(), json!({"response": []}));
    }
}
