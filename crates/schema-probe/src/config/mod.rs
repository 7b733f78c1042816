//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::core::catalog::DriverCatalog;
use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file, checking the engine against the
    /// built-in drivers.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, &DriverCatalog::with_builtins())
    }

    /// Load configuration from a YAML file, checking the engine against `catalog`.
    pub fn load_with<P: AsRef<Path>>(path: P, catalog: &DriverCatalog) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_with(&content, catalog)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_yaml_with(yaml, &DriverCatalog::with_builtins())
    }

    /// Parse configuration from a YAML string, checking the engine against `catalog`.
    pub fn from_yaml_with(yaml: &str, catalog: &DriverCatalog) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate_with(catalog)?;
        Ok(config)
    }

    /// Validate the configuration against the built-in drivers.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&DriverCatalog::with_builtins())
    }

    /// Validate the configuration against the engines registered in `catalog`.
    pub fn validate_with(&self, catalog: &DriverCatalog) -> Result<()> {
        validation::validate(self, catalog)
    }
}

impl ConnectionConfig {
    /// Port to connect to, falling back to the engine default.
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }

    /// `host:port/database` for log lines. Never includes credentials.
    pub fn endpoint(&self, default_port: u16) -> String {
        format!(
            "{}:{}/{}",
            self.host,
            self.port_or(default_port),
            self.database
        )
    }
}
