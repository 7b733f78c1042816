//! Engine drivers and the driver facade.
//!
//! - [`postgres`]: PostgreSQL catalog definitions and executor (fan-out)
//! - [`mssql`]: SQL Server catalog definitions and executor (batch)
//! - [`common`]: shared utilities (TLS)
//!
//! Every engine is exposed through the same [`Driver`] facade. The facade
//! owns the acquisition path (compose, execute, normalize); engines only
//! contribute data and a connector through [`CatalogProvider`].
//!
//! # Adding New Databases
//!
//! 1. Create a module under `drivers/` with the engine's catalog SQL,
//!    field-alias table and exclusions
//! 2. Implement [`CatalogProvider`] and a [`StatementExecutor`]
//! 3. Register it in `DriverCatalog::with_builtins()`

pub mod common;
pub mod mssql;
pub mod postgres;

pub use common::{SslMode, TlsBuilder};
pub use mssql::MssqlCatalog;
pub use postgres::PostgresCatalog;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::compose::{CompositionStrategy, QueryPlan};
use crate::config::ConnectionConfig;
use crate::core::schema::{Database, SchemaSnapshot};
use crate::core::traits::{CatalogProvider, StatementExecutor};
use crate::core::value::RowSet;
use crate::definitions::FieldDefinition;
use crate::error::{ProbeError, Result};
use crate::normalize::Normalizer;

/// Statement used to verify a connection.
const PING_SQL: &str = "SELECT 1";

/// Public surface of one registered engine.
#[derive(Clone)]
pub struct Driver {
    provider: Arc<dyn CatalogProvider>,
}

impl Driver {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self { provider }
    }

    /// Stable engine identifier.
    pub fn id(&self) -> &str {
        self.provider.id()
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.provider.display_name()
    }

    /// Connection fields, passed through unchanged.
    pub fn fields(&self) -> &[FieldDefinition] {
        self.provider.fields()
    }

    /// Composition strategy fixed at registration.
    pub fn strategy(&self) -> CompositionStrategy {
        self.provider.strategy()
    }

    /// Open a connection handle for the other operations.
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn StatementExecutor>> {
        self.provider.connect(config).await
    }

    /// Check that the engine is reachable with these settings.
    ///
    /// Any failure, including a rejected probe statement, is reported as
    /// [`ProbeError::Connectivity`].
    pub async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        let executor = self.connect(config).await?;
        let outcome = executor.execute(PING_SQL).await;
        executor.close().await;

        match outcome {
            Ok(_) => {
                info!(engine = self.id(), "Connection test succeeded");
                Ok(())
            }
            Err(ProbeError::Statement(message)) => {
                Err(ProbeError::connectivity(self.id(), message))
            }
            Err(e) => Err(e),
        }
    }

    /// Run arbitrary SQL and return the raw row sets, unnormalized.
    pub async fn run_query(
        &self,
        sql: &str,
        executor: &dyn StatementExecutor,
    ) -> Result<Vec<RowSet>> {
        debug!(engine = self.id(), "Running query");
        executor.execute(sql).await
    }

    /// Acquire a complete schema snapshot.
    ///
    /// Either every section is acquired and normalized, or the call fails
    /// and no snapshot is returned.
    pub async fn get_schema_information(
        &self,
        executor: &dyn StatementExecutor,
    ) -> Result<SchemaSnapshot> {
        let start = Instant::now();
        let provider = self.provider.as_ref();

        let plan = QueryPlan::schema(provider.id(), provider.strategy(), provider.queries());
        let composed = plan.execute(executor).await?;

        let snapshot = self.normalizer().normalize_schema(composed);

        info!(
            engine = self.id(),
            tables = snapshot.tables.len(),
            columns = snapshot.column_count(),
            constraints = snapshot.constraints.len(),
            indexes = snapshot.indexes.len(),
            warnings = snapshot.warnings,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Schema snapshot acquired"
        );

        Ok(snapshot)
    }

    /// List user databases with their sizes.
    pub async fn get_databases(&self, executor: &dyn StatementExecutor) -> Result<Vec<Database>> {
        let provider = self.provider.as_ref();
        let plan = QueryPlan::databases(provider.id(), provider.queries());
        let composed = plan.execute(executor).await?;

        let databases = self.normalizer().normalize_databases(composed);
        info!(engine = self.id(), databases = databases.len(), "Database listing acquired");
        Ok(databases)
    }

    fn normalizer(&self) -> Normalizer<'_> {
        let provider = self.provider.as_ref();
        Normalizer::new(provider.id(), provider.aliases(), provider.exclusions())
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("strategy", &self.strategy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{Row, Value};
    use crate::definitions::{CatalogQueries, Exclusions, FieldAliases, Section};
    use crate::testing::MockExecutor;
    use async_trait::async_trait;

    const EXCLUSIONS: Exclusions = Exclusions {
        schemas: &["information_schema"],
        schema_prefixes: &["pg_"],
        databases: &["template0", "template1", "postgres"],
    };

    struct TestProvider {
        strategy: CompositionStrategy,
        queries: CatalogQueries,
        aliases: FieldAliases,
    }

    impl TestProvider {
        fn driver(strategy: CompositionStrategy) -> Driver {
            Driver::new(Arc::new(Self {
                strategy,
                queries: CatalogQueries {
                    table_columns: "SELECT /*cols*/ 1".to_string(),
                    constraints: Some("SELECT /*cons*/ 2".to_string()),
                    indexes: Some("SELECT /*idx*/ 3".to_string()),
                    databases: "SELECT /*dbs*/ 4".to_string(),
                },
                aliases: FieldAliases::baseline(),
            }))
        }
    }

    #[async_trait]
    impl CatalogProvider for TestProvider {
        fn id(&self) -> &str {
            "test"
        }

        fn display_name(&self) -> &str {
            "Test"
        }

        fn fields(&self) -> &[FieldDefinition] {
            &[]
        }

        fn strategy(&self) -> CompositionStrategy {
            self.strategy
        }

        fn queries(&self) -> &CatalogQueries {
            &self.queries
        }

        fn aliases(&self) -> &FieldAliases {
            &self.aliases
        }

        fn exclusions(&self) -> &Exclusions {
            &EXCLUSIONS
        }

        async fn connect(&self, _config: &ConnectionConfig) -> Result<Arc<dyn StatementExecutor>> {
            Ok(Arc::new(MockExecutor::new()))
        }
    }

    fn column_rows() -> Vec<Row> {
        vec![
            Row::new()
                .with("table_schema", "public")
                .with("table_name", "customers")
                .with("column_name", "id")
                .with("ordinal_position", "1")
                .with("data_type", "int4")
                .with("is_nullable", "NO"),
            Row::new()
                .with("table_schema", "public")
                .with("table_name", "orders")
                .with("column_name", "id")
                .with("ordinal_position", "1")
                .with("data_type", "int4")
                .with("is_nullable", "NO"),
            Row::new()
                .with("table_schema", "public")
                .with("table_name", "orders")
                .with("column_name", "customer_id")
                .with("ordinal_position", "2")
                .with("data_type", "int4")
                .with("is_nullable", "YES"),
        ]
    }

    fn constraint_rows() -> Vec<Row> {
        vec![
            Row::new()
                .with("table_schema", "public")
                .with("table_name", "orders")
                .with("constraint_name", "orders_pkey")
                .with("constraint_type", "PRIMARY KEY")
                .with("column_name", "id"),
            Row::new()
                .with("table_schema", "public")
                .with("table_name", "orders")
                .with("constraint_name", "orders_customer_fk")
                .with("constraint_type", "FOREIGN KEY")
                .with("column_name", "customer_id")
                .with("foreign_table_schema", "public")
                .with("foreign_table_name", "customers")
                .with("foreign_column_name", "id"),
        ]
    }

    fn index_rows() -> Vec<Row> {
        vec![Row::new()
            .with("table_schema", "public")
            .with("table_name", "orders")
            .with("index_name", "orders_pkey")
            .with("column_name", "id")
            .with("is_primary_key", "t")
            .with("is_unique", "t")]
    }

    fn tagged(rows: Vec<Row>, section: Section) -> Vec<Row> {
        rows.into_iter()
            .map(|row| row.with("__result__type", section.tag()))
            .collect()
    }

    #[tokio::test]
    async fn test_batch_and_fan_out_yield_identical_snapshots() {
        // Batch: one interleaved row set, every row tagged.
        let mut interleaved = Vec::new();
        interleaved.extend(tagged(index_rows(), Section::Indexes));
        interleaved.extend(tagged(column_rows(), Section::TableColumns));
        interleaved.extend(tagged(constraint_rows(), Section::Constraints));
        let batch_executor = MockExecutor::new().respond("/*cols*/", vec![interleaved]);

        // Fan-out: three untagged row sets, sections implied by position.
        let fan_out_executor = MockExecutor::new()
            .respond("/*cols*/", vec![column_rows()])
            .respond("/*cons*/", vec![constraint_rows()])
            .respond("/*idx*/", vec![index_rows()]);

        let batch = TestProvider::driver(CompositionStrategy::Batch)
            .get_schema_information(&batch_executor)
            .await
            .unwrap();
        let fan_out = TestProvider::driver(CompositionStrategy::FanOut)
            .get_schema_information(&fan_out_executor)
            .await
            .unwrap();

        assert_eq!(batch_executor.issued().len(), 1);
        assert_eq!(fan_out_executor.issued().len(), 3);
        assert_eq!(batch, fan_out);
        assert_eq!(batch.tables.len(), 2);
        assert_eq!(batch.constraints.len(), 2);
        assert_eq!(batch.indexes.len(), 1);
    }

    #[tokio::test]
    async fn test_ordinals_are_contiguous_from_one() {
        let executor = MockExecutor::new().respond("/*cols*/", vec![column_rows()]);
        let snapshot = TestProvider::driver(CompositionStrategy::FanOut)
            .get_schema_information(&executor)
            .await
            .unwrap();

        for table in &snapshot.tables {
            let ordinals: Vec<i32> = table.columns.iter().map(|c| c.ordinal_position).collect();
            let expected: Vec<i32> = (1..=table.columns.len() as i32).collect();
            assert_eq!(ordinals, expected, "table {}", table.full_name());
        }
    }

    #[tokio::test]
    async fn test_foreign_key_fields_present_only_on_foreign_keys() {
        let mut rows = constraint_rows();
        // A primary key row that carries stray reference values.
        rows[0].insert("foreign_table_name", "ghost");
        let executor = MockExecutor::new().respond("/*cons*/", vec![rows]);

        let snapshot = TestProvider::driver(CompositionStrategy::FanOut)
            .get_schema_information(&executor)
            .await
            .unwrap();

        for constraint in &snapshot.constraints {
            if constraint.is_foreign_key() {
                assert!(constraint.reference().is_some());
            } else {
                assert!(constraint.foreign_schema.is_none());
                assert!(constraint.foreign_table.is_none());
                assert!(constraint.foreign_column.is_none());
            }
        }
        assert_eq!(snapshot.foreign_keys().count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_discriminator_rows_are_excluded() {
        let mut rows = tagged(column_rows(), Section::TableColumns);
        rows.push(
            Row::new()
                .with("__result__type", "INFORMATION_REFERENTIAL_CONSTRAINTS")
                .with("constraint_name", "orders_customer_fk")
                .with("unique_constraint_name", "customers_pkey"),
        );
        let executor = MockExecutor::new().respond("/*cols*/", vec![rows]);

        let snapshot = TestProvider::driver(CompositionStrategy::Batch)
            .get_schema_information(&executor)
            .await
            .unwrap();

        assert_eq!(snapshot.tables.len(), 2);
        assert!(snapshot.constraints.is_empty());
        assert_eq!(snapshot.warnings, 1);
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_empty_snapshot() {
        let executor = MockExecutor::new()
            .respond("/*cols*/", vec![vec![]])
            .respond("/*cons*/", vec![vec![]])
            .respond("/*idx*/", vec![vec![]]);

        let snapshot = TestProvider::driver(CompositionStrategy::FanOut)
            .get_schema_information(&executor)
            .await
            .unwrap();

        assert!(snapshot.tables.is_empty());
        assert!(snapshot.constraints.is_empty());
        assert!(snapshot.indexes.is_empty());
    }

    #[tokio::test]
    async fn test_generic_rows_normalize_end_to_end() {
        let rows = vec![
            Row::new()
                .with("__type", "TABLE_COL")
                .with("schema", "public")
                .with("table", "users")
                .with("column", "id")
                .with("ordinal", 1i64)
                .with("type", "int"),
            Row::new()
                .with("__type", "TABLE_COL")
                .with("schema", "public")
                .with("table", "users")
                .with("column", "name")
                .with("ordinal", 2i64)
                .with("type", "text"),
            Row::new()
                .with("__type", "CONSTRAINT")
                .with("schema", "public")
                .with("table", "users")
                .with("name", "users_pkey")
                .with("kind", "PRIMARY_KEY")
                .with("column", "id"),
        ];
        let executor = MockExecutor::new().respond("/*cols*/", vec![rows]);

        let snapshot = TestProvider::driver(CompositionStrategy::Batch)
            .get_schema_information(&executor)
            .await
            .unwrap();

        assert_eq!(snapshot.tables.len(), 1);
        let users = snapshot.table("public", "users").unwrap();
        let columns: Vec<_> = users
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.ordinal_position, c.data_type.as_str()))
            .collect();
        assert_eq!(columns, vec![("id", 1, "int"), ("name", 2, "text")]);

        assert_eq!(snapshot.constraints.len(), 1);
        let pk = &snapshot.constraints[0];
        assert_eq!(pk.kind, "PRIMARY_KEY");
        assert_eq!(pk.column, "id");
        assert_eq!(pk.name, "users_pkey");
        assert!(snapshot.indexes.is_empty());
    }

    #[tokio::test]
    async fn test_database_listing_excludes_system_databases() {
        let rows = vec![
            Row::new().with("name", "template0").with("size", 7i64),
            Row::new().with("name", "postgres").with("size", 8i64),
            Row::new().with("name", "billing").with("size", 12i64),
        ];
        let executor = MockExecutor::new().respond("/*dbs*/", vec![rows]);

        let databases = TestProvider::driver(CompositionStrategy::FanOut)
            .get_databases(&executor)
            .await
            .unwrap();

        let names: Vec<_> = databases.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["billing"]);
        assert_eq!(executor.issued(), vec!["SELECT /*dbs*/ 4".to_string()]);
    }

    #[tokio::test]
    async fn test_constraint_failure_rejects_whole_call() {
        let executor = MockExecutor::new()
            .respond("/*cols*/", vec![column_rows()])
            .fail_on("/*cons*/", "syntax error at or near \"FROM\"")
            .respond("/*idx*/", vec![index_rows()]);

        let result = TestProvider::driver(CompositionStrategy::FanOut)
            .get_schema_information(&executor)
            .await;

        match result {
            Err(ProbeError::CatalogQuery {
                engine, section, ..
            }) => {
                assert_eq!(engine, "test");
                assert_eq!(section, "constraints");
            }
            other => panic!("expected catalog query failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_query_passes_rows_through() {
        let rows = vec![Row::new().with("answer", 42i64)];
        let executor = MockExecutor::new().respond("answer", vec![rows.clone()]);

        let result = TestProvider::driver(CompositionStrategy::Batch)
            .run_query("SELECT 42 AS answer", &executor)
            .await
            .unwrap();

        assert_eq!(result, vec![rows]);
        assert_eq!(result[0][0].get("answer"), Some(&Value::Int(42)));
    }

    #[tokio::test]
    async fn test_run_query_error_is_raw_statement_error() {
        let executor = MockExecutor::new().fail_on("bogus", "syntax error");
        let err = TestProvider::driver(CompositionStrategy::Batch)
            .run_query("bogus", &executor)
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Statement(_)));
    }

    #[tokio::test]
    async fn test_test_connection_succeeds_with_mock() {
        let config = ConnectionConfig::new("test", "localhost", "db", "user");
        TestProvider::driver(CompositionStrategy::Batch)
            .test_connection(&config)
            .await
            .unwrap();
    }

    #[test]
    fn test_driver_exposes_registration_data() {
        let driver = TestProvider::driver(CompositionStrategy::FanOut);
        assert_eq!(driver.id(), "test");
        assert_eq!(driver.name(), "Test");
        assert!(driver.fields().is_empty());
        assert!(format!("{:?}", driver).contains("FanOut"));
    }
}
