//! PostgreSQL statement executor.
//!
//! Uses deadpool-postgres for pooling and the simple-query (text) protocol,
//! which accepts multi-statement text and reports a `CommandComplete` after
//! each statement; row sets are split on those boundaries. Every value
//! arrives as text and is coerced later by the normalizer.

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{Config as PgConfig, SimpleQueryMessage};
use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::core::traits::StatementExecutor;
use crate::core::value::{Row, RowSet, Value};
use crate::drivers::common::{SslMode, TlsBuilder};
use crate::error::{ProbeError, Result};

use super::PostgresCatalog;

/// Pooled PostgreSQL connection handle.
pub struct PostgresExecutor {
    pool: Pool,
}

impl PostgresExecutor {
    /// Build the pool and verify one connection.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let port = config.port_or(PostgresCatalog::DEFAULT_PORT);

        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.application_name("schema-probe");

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let ssl_mode: SslMode = config.ssl_mode.parse()?;
        let mgr = match TlsBuilder::new(ssl_mode).build()? {
            Some(tls) => Manager::from_config(pg_config, tls, mgr_config),
            None => {
                warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
                Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config)
            }
        };

        let pool = Pool::builder(mgr)
            .max_size(config.max_connections)
            .build()
            .map_err(|e| ProbeError::connectivity(PostgresCatalog::ID, e))?;

        // Test connection
        let client = pool
            .get()
            .await
            .map_err(|e| ProbeError::connectivity(PostgresCatalog::ID, e))?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| ProbeError::connectivity(PostgresCatalog::ID, e))?;

        info!(
            "Connected to PostgreSQL: {}",
            config.endpoint(PostgresCatalog::DEFAULT_PORT)
        );

        Ok(Self { pool })
    }
}

#[async_trait]
impl StatementExecutor for PostgresExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<RowSet>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| ProbeError::connectivity(PostgresCatalog::ID, e))?;

        let messages = client.simple_query(sql).await.map_err(map_query_error)?;
        Ok(split_row_sets(messages))
    }

    async fn close(&self) {
        self.pool.close();
    }
}

/// Server-side rejections are statement errors; everything else means the
/// connection itself failed.
fn map_query_error(e: tokio_postgres::Error) -> ProbeError {
    match e.as_db_error() {
        Some(db) => ProbeError::Statement(format!("{} ({})", db.message(), db.code().code())),
        None => ProbeError::connectivity(PostgresCatalog::ID, e),
    }
}

fn split_row_sets(messages: Vec<SimpleQueryMessage>) -> Vec<RowSet> {
    let mut sets = Vec::new();
    let mut current: RowSet = Vec::new();

    for message in messages {
        match message {
            SimpleQueryMessage::Row(row) => {
                let converted: Row = row
                    .columns()
                    .iter()
                    .enumerate()
                    .map(|(idx, column)| {
                        let value = row.get(idx).map(Value::from).unwrap_or(Value::Null);
                        (column.name().to_string(), value)
                    })
                    .collect();
                current.push(converted);
            }
            SimpleQueryMessage::CommandComplete(_) => {
                sets.push(std::mem::take(&mut current));
            }
            _ => {}
        }
    }

    if !current.is_empty() {
        sets.push(current);
    }
    sets
}
