//! In-memory executor and provider for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::compose::CompositionStrategy;
use crate::config::ConnectionConfig;
use crate::core::traits::{CatalogProvider, StatementExecutor};
use crate::core::value::RowSet;
use crate::definitions::{CatalogQueries, Exclusions, FieldAliases, FieldDefinition};
use crate::error::{ProbeError, Result};

enum Outcome {
    Rows(Vec<RowSet>),
    Fail(String),
}

/// Answers statements by substring match and records what was issued.
#[derive(Default)]
pub(crate) struct MockExecutor {
    responses: Vec<(String, Outcome)>,
    issued: Mutex<Vec<String>>,
    disconnected: bool,
}

impl MockExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return `sets` for any statement containing `pattern`.
    pub(crate) fn respond(mut self, pattern: &str, sets: Vec<RowSet>) -> Self {
        self.responses.push((pattern.to_string(), Outcome::Rows(sets)));
        self
    }

    /// Reject any statement containing `pattern`.
    pub(crate) fn fail_on(mut self, pattern: &str, message: &str) -> Self {
        self.responses
            .push((pattern.to_string(), Outcome::Fail(message.to_string())));
        self
    }

    /// Fail every statement as unreachable.
    pub(crate) fn disconnected(mut self) -> Self {
        self.disconnected = true;
        self
    }

    /// Statements issued so far.
    pub(crate) fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatementExecutor for MockExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<RowSet>> {
        self.issued.lock().unwrap().push(sql.to_string());

        if self.disconnected {
            return Err(ProbeError::connectivity("", "connection refused"));
        }

        match self
            .responses
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
        {
            Some((_, Outcome::Rows(sets))) => Ok(sets.clone()),
            Some((_, Outcome::Fail(message))) => Err(ProbeError::Statement(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Minimal batch-strategy provider with configurable id and aliases.
pub(crate) struct MockProvider {
    id: &'static str,
    engine_aliases: &'static [&'static str],
    queries: CatalogQueries,
    aliases: FieldAliases,
}

impl MockProvider {
    pub(crate) fn new(id: &'static str, engine_aliases: &'static [&'static str]) -> Self {
        Self {
            id,
            engine_aliases,
            queries: CatalogQueries {
                table_columns: "SELECT 1".to_string(),
                constraints: None,
                indexes: None,
                databases: "SELECT 2".to_string(),
            },
            aliases: FieldAliases::baseline(),
        }
    }
}

const NO_EXCLUSIONS: Exclusions = Exclusions {
    schemas: &[],
    schema_prefixes: &[],
    databases: &[],
};

#[async_trait]
impl CatalogProvider for MockProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn display_name(&self) -> &str {
        "Mock"
    }

    fn engine_aliases(&self) -> &[&str] {
        self.engine_aliases
    }

    fn fields(&self) -> &[FieldDefinition] {
        &[]
    }

    fn strategy(&self) -> CompositionStrategy {
        CompositionStrategy::Batch
    }

    fn queries(&self) -> &CatalogQueries {
        &self.queries
    }

    fn aliases(&self) -> &FieldAliases {
        &self.aliases
    }

    fn exclusions(&self) -> &Exclusions {
        &NO_EXCLUSIONS
    }

    async fn connect(&self, _config: &ConnectionConfig) -> Result<Arc<dyn StatementExecutor>> {
        Ok(Arc::new(MockExecutor::new()))
    }
}
