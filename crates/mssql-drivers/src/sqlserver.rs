// SPDX-License-Identifier: Apache-2.0

//! SQL Server Driver
//!
//! Implements the connection contract for Microsoft SQL Server using Tiberius.
//!
//! ## SQL Server Specifics
//!
//! - Client-server database using TDS (Tabular Data Stream) protocol
//! - Default port: 1433
//! - Parameter markers are `@P1..@Pn`
//!
//! ## Connection Model
//!
//! One raw `tiberius::Client` per operation, no pooling. The client is
//! consumed by `close()`; the wrapper keeps it in an `Option` so a second
//! close is harmless.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, Query};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use mssql_core::{ConnectionConfig, EngineError, EngineResult, ResultSet, Value};

use crate::connection::{Connector, SqlConnection};

// ==================== Types ====================

type MssqlClient = Client<Compat<TcpStream>>;

// ==================== Connector ====================

/// Opens tiberius connections from a [`ConnectionConfig`].
#[derive(Debug, Clone)]
pub struct SqlServerConnector {
    config: ConnectionConfig,
}

impl SqlServerConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Build a tiberius Config from a ConnectionConfig.
    fn build_config(config: &ConnectionConfig, database: Option<&str>) -> Config {
        let mut tib_config = Config::new();
        tib_config.host(&config.host);
        tib_config.port(config.port);
        tib_config.authentication(AuthMethod::sql_server(
            &config.username,
            config.password.expose(),
        ));
        if let Some(db) = database.filter(|db| !db.is_empty()) {
            tib_config.database(db);
        }
        tib_config.encryption(if config.encrypt {
            EncryptionLevel::Required
        } else {
            EncryptionLevel::NotSupported
        });
        if config.trust_server_certificate {
            tib_config.trust_cert();
        }
        tib_config
    }

    /// Create a raw tiberius Client.
    async fn connect_raw(
        config: &ConnectionConfig,
        database: Option<&str>,
    ) -> EngineResult<MssqlClient> {
        let tib_config = Self::build_config(config, database);
        let tcp = TcpStream::connect(tib_config.get_addr())
            .await
            .map_err(|e| {
                EngineError::connection_failed(format!(
                    "Failed to connect to {}:{} - {}",
                    config.host, config.port, e
                ))
            })?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(tib_config, tcp.compat_write())
            .await
            .map_err(|e| EngineError::connection_failed(e.to_string()))?;

        Ok(client)
    }
}

#[async_trait]
impl Connector for SqlServerConnector {
    type Connection = SqlServerConnection;

    async fn connect(&self, database: Option<&str>) -> EngineResult<SqlServerConnection> {
        let client = Self::connect_raw(&self.config, database).await?;
        tracing::debug!(
            host = %self.config.host,
            port = self.config.port,
            database = ?database,
            "Connection established"
        );
        Ok(SqlServerConnection {
            client: Some(client),
        })
    }
}

// ==================== Connection ====================

pub struct SqlServerConnection {
    client: Option<MssqlClient>,
}

impl SqlServerConnection {
    fn client(&mut self) -> EngineResult<&mut MssqlClient> {
        self.client
            .as_mut()
            .ok_or_else(|| EngineError::internal("Connection already closed"))
    }
}

#[async_trait]
impl SqlConnection for SqlServerConnection {
    async fn query(&mut self, sql: &str) -> EngineResult<ResultSet> {
        let client = self.client()?;
        let mut stream = client.simple_query(sql).await.map_err(driver_error)?;

        let columns: Vec<String> = stream
            .columns()
            .await
            .map_err(driver_error)?
            .map(|cols| cols.iter().map(|col| col.name().to_string()).collect())
            .unwrap_or_default();

        let rows = stream.into_first_result().await.map_err(driver_error)?;

        Ok(ResultSet {
            columns,
            rows: rows.iter().map(convert_row).collect(),
        })
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> EngineResult<u64> {
        let client = self.client()?;
        let mut query = Query::new(sql.to_string());
        for value in params {
            bind_value(&mut query, value);
        }

        let result = query.execute(client).await.map_err(driver_error)?;
        Ok(result.total())
    }

    async fn execute_batch(&mut self, sql: &str) -> EngineResult<()> {
        let client = self.client()?;
        client
            .simple_query(sql)
            .await
            .map_err(driver_error)?
            .into_results()
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn close(&mut self) -> EngineResult<()> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| EngineError::internal(format!("Failed to close connection: {e}")))?;
        }
        Ok(())
    }
}

/// Engine failures keep the server's text so the executor can classify them.
fn driver_error(err: tiberius::error::Error) -> EngineError {
    EngineError::execution_error(err.to_string())
}

// ==================== Type Conversion ====================

/// Bind a Value as the next `@Pn` parameter.
fn bind_value(query: &mut Query<'_>, value: &Value) {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.clone()),
        Value::Decimal(d) => query.bind(tiberius::numeric::Numeric::new_with_scale(
            d.mantissa(),
            d.scale() as u8,
        )),
        Value::Date(d) => query.bind(*d),
        Value::Time(t) => query.bind(*t),
        Value::Timestamp(ts) => query.bind(*ts),
        Value::TimestampTz(ts) => query.bind(*ts),
        Value::Bytes(b) => query.bind(b.clone()),
    }
}

/// Convert a tiberius ColumnData to a connector Value.
fn convert_column_data(data: &ColumnData<'_>) -> Value {
    match data {
        ColumnData::Bit(Some(b)) => Value::Bool(*b),
        ColumnData::U8(Some(v)) => Value::Int(*v as i64),
        ColumnData::I16(Some(v)) => Value::Int(*v as i64),
        ColumnData::I32(Some(v)) => Value::Int(*v as i64),
        ColumnData::I64(Some(v)) => Value::Int(*v),
        ColumnData::F32(Some(v)) => Value::Float(*v as f64),
        ColumnData::F64(Some(v)) => Value::Float(*v),
        ColumnData::String(Some(s)) => Value::Text(s.to_string()),
        ColumnData::Guid(Some(g)) => Value::Text(g.to_string()),
        ColumnData::Binary(Some(b)) => Value::Bytes(b.to_vec()),
        ColumnData::Xml(Some(xml)) => Value::Text(xml.to_string()),
        // All None variants; numeric and temporal values are read in convert_row
        _ => Value::Null,
    }
}

/// Convert a tiberius Row to one value per column, in column order.
/// Numeric and date/time cells go through the typed getters.
fn convert_row(row: &tiberius::Row) -> Vec<Value> {
    row.cells()
        .enumerate()
        .map(|(i, (_col, data))| match data {
            ColumnData::Numeric(Some(_)) => row
                .try_get::<Decimal, _>(i)
                .ok()
                .flatten()
                .map(Value::Decimal)
                .unwrap_or(Value::Null),
            ColumnData::DateTime(Some(_))
            | ColumnData::SmallDateTime(Some(_))
            | ColumnData::DateTime2(Some(_)) => row
                .try_get::<chrono::NaiveDateTime, _>(i)
                .ok()
                .flatten()
                .map(Value::Timestamp)
                .unwrap_or(Value::Null),
            ColumnData::DateTimeOffset(Some(_)) => row
                .try_get::<chrono::DateTime<chrono::Utc>, _>(i)
                .ok()
                .flatten()
                .map(Value::TimestampTz)
                .unwrap_or(Value::Null),
            ColumnData::Date(Some(_)) => row
                .try_get::<chrono::NaiveDate, _>(i)
                .ok()
                .flatten()
                .map(Value::Date)
                .unwrap_or(Value::Null),
            ColumnData::Time(Some(_)) => row
                .try_get::<chrono::NaiveTime, _>(i)
                .ok()
                .flatten()
                .map(Value::Time)
                .unwrap_or(Value::Null),
            _ => convert_column_data(data),
        })
        .collect()
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_convert_column_data() {
        assert_eq!(convert_column_data(&ColumnData::Bit(Some(true))), Value::Bool(true));
        assert_eq!(convert_column_data(&ColumnData::I32(Some(576))), Value::Int(576));
        assert_eq!(convert_column_data(&ColumnData::F64(Some(2.5))), Value::Float(2.5));
        assert_eq!(
            convert_column_data(&ColumnData::String(Some(Cow::Borrowed("Asha")))),
            Value::Text("Asha".to_string())
        );
        assert_eq!(
            convert_column_data(&ColumnData::Binary(Some(Cow::Owned(vec![1, 2])))),
            Value::Bytes(vec![1, 2])
        );
        assert_eq!(convert_column_data(&ColumnData::I32(None)), Value::Null);
        assert_eq!(convert_column_data(&ColumnData::String(None)), Value::Null);
    }

    #[test]
    fn test_build_config() {
        let config = ConnectionConfig::new("localhost", "sa", "MyPassword123!");
        let tib_config = SqlServerConnector::build_config(&config, Some("testdb"));
        assert_eq!(tib_config.get_addr(), "localhost:1433");
    }

    #[test]
    fn test_build_config_without_database() {
        let mut config = ConnectionConfig::new("db.internal", "sa", "pw");
        config.port = 14330;
        config.encrypt = true;
        let tib_config = SqlServerConnector::build_config(&config, None);
        assert_eq!(tib_config.get_addr(), "db.internal:14330");
    }

    #[tokio::test]
    async fn closed_connection_rejects_statements() {
        let mut conn = SqlServerConnection { client: None };
        assert!(conn.close().await.is_ok());
        let err = conn.query("SELECT 1").await.unwrap_err();
        assert!(matches!(err, EngineError::Internal { .. }));
    }
}
