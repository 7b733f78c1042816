//! Configuration validation.

use super::Config;
use crate::core::catalog::DriverCatalog;
use crate::drivers::common::SslMode;
use crate::error::{ProbeError, Result};

/// Validate the configuration against the engines registered in `catalog`.
pub fn validate(config: &Config, catalog: &DriverCatalog) -> Result<()> {
    let conn = &config.connection;

    catalog.normalize_engine(&conn.engine)?;

    if conn.host.is_empty() {
        return Err(ProbeError::Config("connection.host is required".into()));
    }
    if conn.database.is_empty() {
        return Err(ProbeError::Config("connection.database is required".into()));
    }
    if conn.user.is_empty() {
        return Err(ProbeError::Config("connection.user is required".into()));
    }
    if conn.max_connections == 0 {
        return Err(ProbeError::Config(
            "connection.max_connections must be at least 1".into(),
        ));
    }
    if let Some(0) = conn.port {
        return Err(ProbeError::Config("connection.port must not be 0".into()));
    }

    conn.ssl_mode.parse::<SslMode>()?;

    Ok(())
}
