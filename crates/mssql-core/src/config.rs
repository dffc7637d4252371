// SPDX-License-Identifier: Apache-2.0

//! Connection parameters as they arrive in the connector input, with
//! secrets already resolved by the caller.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::sensitive::Sensitive;
use crate::validation::{require_non_blank, Validate};

pub const DEFAULT_PORT: u16 = 1433;

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_trust_server_certificate() -> bool {
    true
}

/// SQL Server connection configuration (`databaseConnection`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Sensitive<String>,
    /// Require TLS for the whole session.
    #[serde(default)]
    pub encrypt: bool,
    #[serde(default = "default_trust_server_certificate")]
    pub trust_server_certificate: bool,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: Sensitive::new(password.into()),
            encrypt: false,
            trust_server_certificate: true,
        }
    }
}

impl Validate for ConnectionConfig {
    fn validate(&self) -> EngineResult<()> {
        require_non_blank("databaseConnection.host", &self.host)?;
        require_non_blank("databaseConnection.username", &self.username)?;
        require_non_blank("databaseConnection.password", self.password.expose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_fields_are_absent() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{"host": "db.local", "username": "sa", "password": "MyPassword123!"}"#,
        )
        .expect("should parse");
        assert_eq!(config.port, 1433);
        assert!(!config.encrypt);
        assert!(config.trust_server_certificate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn password_never_reaches_debug_output() {
        let config = ConnectionConfig::new("db.local", "sa", "MyPassword123!");
        assert!(!format!("{config:?}").contains("MyPassword123!"));
    }

    #[test]
    fn blank_host_is_rejected() {
        let config = ConnectionConfig::new(" ", "sa", "pw");
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("databaseConnection.host"));
    }
}
