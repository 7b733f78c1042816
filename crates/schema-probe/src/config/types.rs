//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The connection to probe.
    pub connection: ConnectionConfig,
}

/// Connection settings for one engine.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Engine identifier or alias (e.g. "postgres", "pg", "mssql").
    pub engine: String,

    /// Database host.
    pub host: String,

    /// Database port. Defaults per engine (5432 / 1433).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// PostgreSQL SSL mode (default: "disable").
    #[serde(default = "default_disable")]
    pub ssl_mode: String,

    /// SQL Server: encrypt the connection (default: false).
    #[serde(default)]
    pub encrypt: bool,

    /// SQL Server: accept any server certificate (default: false).
    #[serde(default)]
    pub trust_server_cert: bool,

    /// Connection pool size (default: 4).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl ConnectionConfig {
    /// Minimal configuration for an engine; everything else defaulted.
    pub fn new(
        engine: impl Into<String>,
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            engine: engine.into(),
            host: host.into(),
            port: None,
            database: database.into(),
            user: user.into(),
            password: String::new(),
            ssl_mode: default_disable(),
            encrypt: false,
            trust_server_cert: false,
            max_connections: default_max_connections(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .field("encrypt", &self.encrypt)
            .field("trust_server_cert", &self.trust_server_cert)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

// Default value functions for serde
fn default_disable() -> String {
    "disable".to_string()
}

fn default_max_connections() -> usize {
    4
}
