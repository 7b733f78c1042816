//! Catalog result normalization.
//!
//! Flattens composed row sets into typed [`CatalogRow`]s, then assembles the
//! canonical model. Section assignment prefers the row's discriminator tag
//! and falls back to the section implied by the row set's position; rows
//! whose section cannot be determined, or that lack a required field, are
//! dropped with a warning instead of failing the whole snapshot.

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::compose::ComposedResult;
use crate::core::schema::{Column, Constraint, Database, Index, SchemaSnapshot, Table};
use crate::core::value::Row;
use crate::definitions::{Exclusions, Field, FieldAliases, Section};

/// Table/column row before grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRow {
    pub schema: String,
    pub table: String,
    pub table_description: Option<String>,
    /// Engine-reported ordinal, if any.
    pub ordinal: Option<i32>,
    pub column: Column,
}

/// One catalog row resolved to its section.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRow {
    Column(ColumnRow),
    Constraint(Constraint),
    Index(Index),
    Database(Database),
}

impl CatalogRow {
    /// The section this row belongs to.
    pub fn section(&self) -> Section {
        match self {
            CatalogRow::Column(_) => Section::TableColumns,
            CatalogRow::Constraint(_) => Section::Constraints,
            CatalogRow::Index(_) => Section::Indexes,
            CatalogRow::Database(_) => Section::Databases,
        }
    }
}

/// Counters for rows the normalizer could not take as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    /// Rows with an unknown or undeterminable section.
    pub unknown_section: usize,
    /// Rows missing a required field, or foreign keys without a reference.
    pub invalid: usize,
    /// Columns whose ordinal position was defaulted.
    pub defaulted_ordinals: usize,
}

impl NormalizationStats {
    /// Total number of warnings raised.
    pub fn total(&self) -> usize {
        self.unknown_section + self.invalid + self.defaulted_ordinals
    }
}

/// Normalizes catalog rows for one engine.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    engine: &'a str,
    aliases: &'a FieldAliases,
    exclusions: &'a Exclusions,
}

impl<'a> Normalizer<'a> {
    pub fn new(engine: &'a str, aliases: &'a FieldAliases, exclusions: &'a Exclusions) -> Self {
        Self {
            engine,
            aliases,
            exclusions,
        }
    }

    /// Resolve every row to a typed [`CatalogRow`], dropping what cannot be
    /// classified or parsed.
    pub fn classify(
        &self,
        composed: ComposedResult,
        stats: &mut NormalizationStats,
    ) -> Vec<CatalogRow> {
        let ComposedResult { sections, row_sets } = composed;
        let mut rows = Vec::with_capacity(row_sets.iter().map(Vec::len).sum());

        for (position, set) in row_sets.into_iter().enumerate() {
            let implied = sections.get(position).copied();

            for mut row in set {
                let section = match self.aliases.take_discriminator(&mut row) {
                    Some(tag) => match self.aliases.section_for_tag(&tag) {
                        Some(section) => section,
                        None => {
                            warn!(
                                engine = self.engine,
                                tag = %tag,
                                "Dropping catalog row with unknown section tag"
                            );
                            stats.unknown_section += 1;
                            continue;
                        }
                    },
                    None => match implied {
                        Some(section) => section,
                        None => {
                            warn!(
                                engine = self.engine,
                                result_set = position,
                                "Dropping catalog row with no section tag outside any planned section"
                            );
                            stats.unknown_section += 1;
                            continue;
                        }
                    },
                };

                match self.parse(section, &row) {
                    Ok(parsed) => rows.push(parsed),
                    Err(field) => {
                        warn!(
                            engine = self.engine,
                            section = section.label(),
                            field = field.name(),
                            "Dropping catalog row missing required field"
                        );
                        stats.invalid += 1;
                    }
                }
            }
        }

        rows
    }

    /// Build a schema snapshot from composed schema sections.
    pub fn normalize_schema(&self, composed: ComposedResult) -> SchemaSnapshot {
        let mut stats = NormalizationStats::default();
        let rows = self.classify(composed, &mut stats);

        let mut tables: IndexMap<(String, String), Table> = IndexMap::new();
        let mut constraints = Vec::new();
        let mut indexes = Vec::new();

        for row in rows {
            match row {
                CatalogRow::Column(row) => {
                    if self.exclusions.is_system_schema(&row.schema) {
                        trace!(engine = self.engine, schema = %row.schema, "Skipping system schema column");
                        continue;
                    }

                    let key = (row.schema.clone(), row.table.clone());
                    let table = tables.entry(key).or_insert_with(|| Table {
                        schema: row.schema.clone(),
                        name: row.table.clone(),
                        description: None,
                        columns: Vec::new(),
                    });
                    if table.description.is_none() {
                        table.description = row.table_description;
                    }

                    let mut column = row.column;
                    column.ordinal_position = match row.ordinal {
                        Some(ordinal) => ordinal,
                        None => {
                            warn!(
                                engine = self.engine,
                                table = %table.full_name(),
                                column = %column.name,
                                "Column has no ordinal position; using row order"
                            );
                            stats.defaulted_ordinals += 1;
                            table.columns.len() as i32 + 1
                        }
                    };
                    table.columns.push(column);
                }
                CatalogRow::Constraint(mut constraint) => {
                    if self.exclusions.is_system_schema(&constraint.schema) {
                        continue;
                    }

                    if constraint.is_foreign_key() {
                        if constraint.reference().is_none() {
                            warn!(
                                engine = self.engine,
                                constraint = %constraint.name,
                                "Dropping foreign key row without a complete reference"
                            );
                            stats.invalid += 1;
                            continue;
                        }
                    } else {
                        constraint.foreign_schema = None;
                        constraint.foreign_table = None;
                        constraint.foreign_column = None;
                    }
                    constraints.push(constraint);
                }
                CatalogRow::Index(index) => {
                    if self.exclusions.is_system_schema(&index.schema) {
                        continue;
                    }
                    indexes.push(index);
                }
                CatalogRow::Database(db) => {
                    debug!(
                        engine = self.engine,
                        database = %db.name,
                        "Ignoring database row in schema acquisition"
                    );
                }
            }
        }

        let tables: Vec<Table> = tables.into_values().collect();

        self.report(&stats);

        SchemaSnapshot {
            tables,
            constraints,
            indexes,
            warnings: stats.total(),
        }
    }

    /// Build the database listing, excluding system databases.
    pub fn normalize_databases(&self, composed: ComposedResult) -> Vec<Database> {
        let mut stats = NormalizationStats::default();
        let databases = self
            .classify(composed, &mut stats)
            .into_iter()
            .filter_map(|row| match row {
                CatalogRow::Database(db) => Some(db),
                other => {
                    debug!(
                        engine = self.engine,
                        section = other.section().label(),
                        "Ignoring non-database row in database listing"
                    );
                    None
                }
            })
            .filter(|db| !self.exclusions.is_system_database(&db.name))
            .collect();

        self.report(&stats);
        databases
    }

    fn report(&self, stats: &NormalizationStats) {
        if stats.total() > 0 {
            warn!(
                engine = self.engine,
                unknown_section = stats.unknown_section,
                invalid = stats.invalid,
                defaulted_ordinals = stats.defaulted_ordinals,
                "Catalog normalization raised warnings"
            );
        }
    }

    fn required(&self, row: &Row, field: Field) -> Result<String, Field> {
        self.aliases.text(row, field).ok_or(field)
    }

    fn parse(&self, section: Section, row: &Row) -> Result<CatalogRow, Field> {
        let a = self.aliases;
        match section {
            Section::TableColumns => Ok(CatalogRow::Column(ColumnRow {
                schema: self.required(row, Field::Schema)?,
                table: self.required(row, Field::Table)?,
                table_description: a.text(row, Field::TableDescription),
                ordinal: a.int(row, Field::OrdinalPosition),
                column: Column {
                    name: self.required(row, Field::Column)?,
                    data_type: self.required(row, Field::DataType)?,
                    ordinal_position: 0,
                    is_nullable: a.flag(row, Field::IsNullable).unwrap_or(true),
                    max_length: a.int(row, Field::MaxLength),
                    precision: a.int(row, Field::NumericPrecision),
                    scale: a.int(row, Field::NumericScale),
                    description: a.text(row, Field::ColumnDescription),
                },
            })),
            Section::Constraints => Ok(CatalogRow::Constraint(Constraint {
                schema: self.required(row, Field::Schema)?,
                table: self.required(row, Field::Table)?,
                name: self.required(row, Field::ConstraintName)?,
                kind: self.required(row, Field::ConstraintKind)?,
                column: self.required(row, Field::Column)?,
                foreign_schema: a.text(row, Field::ForeignSchema),
                foreign_table: a.text(row, Field::ForeignTable),
                foreign_column: a.text(row, Field::ForeignColumn),
            })),
            Section::Indexes => Ok(CatalogRow::Index(Index {
                schema: self.required(row, Field::Schema)?,
                table: self.required(row, Field::Table)?,
                name: self.required(row, Field::IndexName)?,
                column: self.required(row, Field::Column)?,
                is_primary_key: a.flag(row, Field::IsPrimaryKey).unwrap_or(false),
                is_unique: a.flag(row, Field::IsUnique).unwrap_or(false),
                is_unique_constraint: a.flag(row, Field::IsUniqueConstraint),
                index_type: a.text(row, Field::IndexType),
                column_position: a.int(row, Field::IndexColumnPosition),
                key_ordinal: a.int(row, Field::KeyOrdinal),
                is_included_column: a.flag(row, Field::IsIncludedColumn),
            })),
            Section::Databases => Ok(CatalogRow::Database(Database {
                name: self.required(row, Field::DatabaseName)?,
                size_mb: a
                    .get(row, Field::DatabaseSize)
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0),
                id: a.text(row, Field::DatabaseId),
                created_at: a
                    .get(row, Field::DatabaseCreated)
                    .and_then(|v| v.as_datetime()),
            })),
        }
    }
}
