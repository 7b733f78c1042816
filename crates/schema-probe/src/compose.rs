//! Metadata query composition.
//!
//! Turns an engine's catalog queries into the executions actually issued:
//!
//! - [`CompositionStrategy::Batch`] concatenates the sections into one
//!   statement batch and relies on the engine returning one result set per
//!   statement, in order.
//! - [`CompositionStrategy::FanOut`] issues each section as its own
//!   statement concurrently and waits for all of them before looking at any
//!   result. The first failure (in section order) fails the whole call and
//!   partial results are discarded.
//!
//! Either way the caller gets the same thing back: one row set per section,
//! in section order, ready for the normalizer.

use std::fmt;
use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::traits::StatementExecutor;
use crate::core::value::RowSet;
use crate::definitions::{CatalogQueries, Section};
use crate::error::{ProbeError, Result};

/// How an engine's catalog sub-queries are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionStrategy {
    /// One round trip, several result sets.
    Batch,
    /// One concurrent round trip per section.
    FanOut,
}

impl fmt::Display for CompositionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionStrategy::Batch => write!(f, "batch"),
            CompositionStrategy::FanOut => write!(f, "fan-out"),
        }
    }
}

/// Row sets returned by a composed acquisition.
#[derive(Debug, Clone, Default)]
pub struct ComposedResult {
    /// Section implied by each row set's position.
    pub sections: Vec<Section>,
    /// Row sets in execution order.
    pub row_sets: Vec<RowSet>,
}

impl ComposedResult {
    /// Total number of rows across all row sets.
    pub fn row_count(&self) -> usize {
        self.row_sets.iter().map(Vec::len).sum()
    }
}

/// The executions needed to acquire a set of catalog sections.
#[derive(Debug, Clone)]
pub struct QueryPlan<'a> {
    engine: &'a str,
    strategy: CompositionStrategy,
    sections: Vec<(Section, &'a str)>,
}

impl<'a> QueryPlan<'a> {
    /// Plan the given sections. Sections the engine does not define are
    /// skipped and later normalize to empty.
    pub fn new(
        engine: &'a str,
        strategy: CompositionStrategy,
        queries: &'a CatalogQueries,
        sections: &[Section],
    ) -> Self {
        let sections = sections
            .iter()
            .filter_map(|section| queries.sql(*section).map(|sql| (*section, sql)))
            .collect();

        Self {
            engine,
            strategy,
            sections,
        }
    }

    /// Plan the three schema sections.
    pub fn schema(
        engine: &'a str,
        strategy: CompositionStrategy,
        queries: &'a CatalogQueries,
    ) -> Self {
        Self::new(engine, strategy, queries, &Section::SCHEMA)
    }

    /// Plan the database listing. Always a single statement.
    pub fn databases(engine: &'a str, queries: &'a CatalogQueries) -> Self {
        Self::new(
            engine,
            CompositionStrategy::Batch,
            queries,
            &[Section::Databases],
        )
    }

    /// Sections this plan will acquire, in order.
    pub fn sections(&self) -> Vec<Section> {
        self.sections.iter().map(|(section, _)| *section).collect()
    }

    /// SQL text of each execution, in issue order.
    pub fn statements(&self) -> Vec<String> {
        match self.strategy {
            CompositionStrategy::Batch if !self.sections.is_empty() => {
                vec![join_batch(self.sections.iter().map(|(_, sql)| *sql))]
            }
            CompositionStrategy::Batch => Vec::new(),
            CompositionStrategy::FanOut => self
                .sections
                .iter()
                .map(|(_, sql)| sql.trim().to_string())
                .collect(),
        }
    }

    /// Run the plan against an open connection.
    pub async fn execute(&self, executor: &dyn StatementExecutor) -> Result<ComposedResult> {
        if self.sections.is_empty() {
            return Ok(ComposedResult::default());
        }

        let start = Instant::now();
        let result = match self.strategy {
            CompositionStrategy::Batch => self.execute_batch(executor).await?,
            CompositionStrategy::FanOut => self.execute_fan_out(executor).await?,
        };

        info!(
            engine = self.engine,
            strategy = %self.strategy,
            sections = result.sections.len(),
            rows = result.row_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Catalog acquisition complete"
        );

        Ok(result)
    }

    async fn execute_batch(&self, executor: &dyn StatementExecutor) -> Result<ComposedResult> {
        let sql = join_batch(self.sections.iter().map(|(_, sql)| *sql));
        let label = self
            .sections
            .iter()
            .map(|(section, _)| section.label())
            .collect::<Vec<_>>()
            .join("+");

        debug!(engine = self.engine, sections = %label, "Issuing catalog batch:\n{}", sql);

        let row_sets = executor
            .execute(&sql)
            .await
            .map_err(|e| e.in_section(self.engine, &label))?;

        if row_sets.len() != self.sections.len() {
            debug!(
                engine = self.engine,
                expected = self.sections.len(),
                returned = row_sets.len(),
                "Batch result set count differs from section count"
            );
        }

        Ok(ComposedResult {
            sections: self.sections(),
            row_sets,
        })
    }

    async fn execute_fan_out(&self, executor: &dyn StatementExecutor) -> Result<ComposedResult> {
        let futures = self.sections.iter().map(|(section, sql)| async move {
            debug!(
                engine = self.engine,
                section = section.label(),
                "Issuing catalog query:\n{}",
                sql.trim()
            );
            (*section, executor.execute(sql.trim()).await)
        });

        // Wait for every sub-query so no result is inspected while others
        // are still in flight.
        let outcomes = join_all(futures).await;

        let mut result = ComposedResult::default();
        let mut first_error: Option<ProbeError> = None;

        for (section, outcome) in outcomes {
            match outcome {
                Ok(sets) => {
                    let rows: RowSet = sets.into_iter().flatten().collect();
                    debug!(
                        engine = self.engine,
                        section = section.label(),
                        rows = rows.len(),
                        "Catalog query returned"
                    );
                    result.sections.push(section);
                    result.row_sets.push(rows);
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e.in_section(self.engine, section.label()));
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(result),
        }
    }
}

/// Concatenate statements into one batch separated by `;`.
fn join_batch<'s>(statements: impl Iterator<Item = &'s str>) -> String {
    statements
        .map(|sql| sql.trim().trim_end_matches(';').trim_end())
        .filter(|sql| !sql.is_empty())
        .collect::<Vec<_>>()
        .join(";\n")
}
