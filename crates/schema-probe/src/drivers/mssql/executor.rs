//! SQL Server statement executor.
//!
//! Connections are pooled with bb8. Statements go through the TDS batch
//! path (`simple_query`), which returns one result set per SELECT in the
//! batch, in order.

use std::time::Duration;

use async_trait::async_trait;
use bb8::Pool;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, FromSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::core::traits::StatementExecutor;
use crate::core::value::{Row, RowSet, Value};
use crate::error::{ProbeError, Result};

use super::MssqlCatalog;

/// Maximum wait for a pooled connection.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// bb8 manager producing tiberius clients.
pub struct TiberiusConnectionManager {
    host: String,
    port: u16,
    database: String,
    user: String,
    password: String,
    encrypt: bool,
    trust_server_cert: bool,
}

impl TiberiusConnectionManager {
    pub fn new(config: &ConnectionConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port_or(MssqlCatalog::DEFAULT_PORT),
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            encrypt: config.encrypt,
            trust_server_cert: config.trust_server_cert,
        }
    }

    fn build_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.database(&self.database);
        config.application_name("schema-probe");
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));

        if self.encrypt {
            if self.trust_server_cert {
                config.trust_cert();
            }
            config.encryption(EncryptionLevel::Required);
        } else {
            config.encryption(EncryptionLevel::NotSupported);
        }
        config
    }
}

#[async_trait]
impl bb8::ManageConnection for TiberiusConnectionManager {
    type Connection = Client<Compat<TcpStream>>;
    type Error = tiberius::error::Error;

    async fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        let config = self.build_config();
        let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
            tiberius::error::Error::Io {
                kind: e.kind(),
                message: e.to_string(),
            }
        })?;
        tcp.set_nodelay(true).ok();

        Client::connect(config, tcp.compat_write()).await
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// Pooled SQL Server connection handle.
pub struct MssqlExecutor {
    pool: Pool<TiberiusConnectionManager>,
}

impl MssqlExecutor {
    /// Build the pool and verify one connection.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let manager = TiberiusConnectionManager::new(config);
        let pool = Pool::builder()
            .max_size(pool_size(config)?)
            .connection_timeout(POOL_CONNECTION_TIMEOUT)
            .build(manager)
            .await
            .map_err(|e| ProbeError::connectivity(MssqlCatalog::ID, e))?;

        // Test connection
        {
            let mut conn = pool
                .get()
                .await
                .map_err(|e| ProbeError::connectivity(MssqlCatalog::ID, e))?;
            conn.simple_query("SELECT 1")
                .await
                .map_err(|e| ProbeError::connectivity(MssqlCatalog::ID, e))?
                .into_row()
                .await
                .map_err(|e| ProbeError::connectivity(MssqlCatalog::ID, e))?;
        }

        info!(
            "Connected to SQL Server: {} (pool_size={})",
            config.endpoint(MssqlCatalog::DEFAULT_PORT),
            config.max_connections
        );

        Ok(Self { pool })
    }
}

#[async_trait]
impl StatementExecutor for MssqlExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<RowSet>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ProbeError::connectivity(MssqlCatalog::ID, e))?;

        let results = conn
            .simple_query(sql)
            .await
            .map_err(map_query_error)?
            .into_results()
            .await
            .map_err(map_query_error)?;

        debug!("SQL Server returned {} result set(s)", results.len());
        Ok(results
            .into_iter()
            .map(|rows| rows.into_iter().map(convert_row).collect())
            .collect())
    }
}

/// bb8 sizes its pool in `u32`.
fn pool_size(config: &ConnectionConfig) -> Result<u32> {
    u32::try_from(config.max_connections).map_err(|_| {
        ProbeError::Config(format!(
            "connection.max_connections {} exceeds the SQL Server pool limit of {}",
            config.max_connections,
            u32::MAX
        ))
    })
}

/// Server error tokens are statement errors; everything else means the
/// connection itself failed.
fn map_query_error(e: tiberius::error::Error) -> ProbeError {
    match e {
        tiberius::error::Error::Server(token) => {
            ProbeError::Statement(format!("{} (error {})", token.message(), token.code()))
        }
        other => ProbeError::connectivity(MssqlCatalog::ID, other),
    }
}

fn convert_row(row: tiberius::Row) -> Row {
    let names: Vec<String> = row
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    names
        .into_iter()
        .zip(row.into_iter().map(|data| convert_value(&data)))
        .collect()
}

fn convert_value(data: &ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => v.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::Int).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(|v| Value::Float(v as f64)).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::Float).unwrap_or(Value::Null),
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .as_ref()
            .map(|s| Value::Text(s.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Guid(v) => v
            .as_ref()
            .map(|g| Value::Text(g.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v
            .as_ref()
            .map(|n| Value::Float(n.value() as f64 / 10f64.powi(n.scale() as i32)))
            .unwrap_or(Value::Null),
        ColumnData::Binary(v) => v
            .as_ref()
            .map(|b| Value::Text(b.iter().map(|byte| format!("{byte:02x}")).collect()))
            .unwrap_or(Value::Null),
        other => convert_temporal(other),
    }
}

fn convert_temporal(data: &ColumnData<'static>) -> Value {
    if let Ok(Some(dt)) = NaiveDateTime::from_sql(data) {
        return Value::DateTime(dt);
    }
    if let Ok(Some(dt)) = DateTime::<Utc>::from_sql(data) {
        return Value::DateTime(dt.naive_utc());
    }
    if let Ok(Some(date)) = NaiveDate::from_sql(data) {
        return Value::Text(date.to_string());
    }
    if let Ok(Some(time)) = NaiveTime::from_sql(data) {
        return Value::Text(time.to_string());
    }
    Value::Null
}
