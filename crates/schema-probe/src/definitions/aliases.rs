//! Field-alias tables.
//!
//! Catalog queries project the same logical field under different names
//! across engines and across revisions of one engine (`table_schema` vs
//! `constraint_schema` vs `schema`). Each engine owns one [`FieldAliases`]
//! table built from the shared baseline plus its own spellings, and the
//! normalizer resolves every canonical field through it.

use std::collections::HashMap;

use super::{Section, DISCRIMINATOR_COLUMN};
use crate::core::value::{Row, Value};

/// Canonical fields the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Discriminator,
    Schema,
    Table,
    TableDescription,
    Column,
    ColumnDescription,
    DataType,
    OrdinalPosition,
    MaxLength,
    NumericPrecision,
    NumericScale,
    IsNullable,
    ConstraintName,
    ConstraintKind,
    ForeignSchema,
    ForeignTable,
    ForeignColumn,
    IndexName,
    IsPrimaryKey,
    IsUnique,
    IsUniqueConstraint,
    IndexType,
    IndexColumnPosition,
    KeyOrdinal,
    IsIncludedColumn,
    DatabaseName,
    DatabaseSize,
    DatabaseId,
    DatabaseCreated,
}

impl Field {
    /// Human-readable field name for warnings.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Discriminator => "discriminator",
            Field::Schema => "schema",
            Field::Table => "table",
            Field::TableDescription => "table description",
            Field::Column => "column",
            Field::ColumnDescription => "column description",
            Field::DataType => "data type",
            Field::OrdinalPosition => "ordinal position",
            Field::MaxLength => "max length",
            Field::NumericPrecision => "numeric precision",
            Field::NumericScale => "numeric scale",
            Field::IsNullable => "nullability",
            Field::ConstraintName => "constraint name",
            Field::ConstraintKind => "constraint kind",
            Field::ForeignSchema => "foreign schema",
            Field::ForeignTable => "foreign table",
            Field::ForeignColumn => "foreign column",
            Field::IndexName => "index name",
            Field::IsPrimaryKey => "primary key flag",
            Field::IsUnique => "unique flag",
            Field::IsUniqueConstraint => "unique constraint flag",
            Field::IndexType => "index type",
            Field::IndexColumnPosition => "index column position",
            Field::KeyOrdinal => "key ordinal",
            Field::IsIncludedColumn => "included column flag",
            Field::DatabaseName => "database name",
            Field::DatabaseSize => "database size",
            Field::DatabaseId => "database id",
            Field::DatabaseCreated => "database creation date",
        }
    }
}

/// Baseline spellings shared by every engine: the short generic keys and
/// the `information_schema` column names.
const BASELINE: &[(Field, &[&str])] = &[
    (Field::Discriminator, &[DISCRIMINATOR_COLUMN, "__type"]),
    (Field::Schema, &["schema", "table_schema"]),
    (Field::Table, &["table", "table_name"]),
    (Field::TableDescription, &["table_description", "table_comment"]),
    (Field::Column, &["column", "column_name"]),
    (Field::ColumnDescription, &["column_description", "column_comment"]),
    (Field::DataType, &["type", "data_type"]),
    (Field::OrdinalPosition, &["ordinal", "ordinal_position"]),
    (Field::MaxLength, &["max_length", "character_maximum_length"]),
    (Field::NumericPrecision, &["precision", "numeric_precision"]),
    (Field::NumericScale, &["scale", "numeric_scale"]),
    (Field::IsNullable, &["nullable", "is_nullable"]),
    (Field::ConstraintName, &["name", "constraint_name"]),
    (Field::ConstraintKind, &["kind", "constraint_type"]),
    (Field::ForeignSchema, &["foreign_schema", "foreign_table_schema"]),
    (Field::ForeignTable, &["foreign_table", "foreign_table_name"]),
    (Field::ForeignColumn, &["foreign_column", "foreign_column_name"]),
    (Field::IndexName, &["name", "index_name"]),
    (Field::IsPrimaryKey, &["primary", "is_primary_key"]),
    (Field::IsUnique, &["unique", "is_unique"]),
    (Field::IsUniqueConstraint, &["is_unique_constraint"]),
    (Field::IndexType, &["index_type"]),
    (Field::IndexColumnPosition, &["position", "index_column_id"]),
    (Field::KeyOrdinal, &["key_ordinal"]),
    (Field::IsIncludedColumn, &["is_included_column"]),
    (Field::DatabaseName, &["name", "database_name"]),
    (Field::DatabaseSize, &["size", "size_mb"]),
    (Field::DatabaseId, &["id", "database_id"]),
    (Field::DatabaseCreated, &["created", "create_date", "created_at"]),
];

/// Baseline discriminator vocabulary: the tags this crate's queries emit
/// plus the short generic tags.
const BASELINE_TAGS: &[(&str, Section)] = &[
    ("INFORMATION_SCHEMA", Section::TableColumns),
    ("TABLE_COL", Section::TableColumns),
    ("INFORMATION_CONSTRAINTS", Section::Constraints),
    ("CONSTRAINT", Section::Constraints),
    ("INFORMATION_INDEXES", Section::Indexes),
    ("INDEX", Section::Indexes),
    ("INFORMATION_DATABASES", Section::Databases),
    ("DATABASE", Section::Databases),
];

/// Per-engine mapping from canonical fields to projected column names.
#[derive(Debug, Clone)]
pub struct FieldAliases {
    revision: &'static str,
    names: HashMap<Field, Vec<&'static str>>,
    tags: Vec<(&'static str, Section)>,
}

impl FieldAliases {
    /// The shared baseline table.
    pub fn baseline() -> Self {
        let names = BASELINE
            .iter()
            .map(|(field, names)| (*field, names.to_vec()))
            .collect();

        Self {
            revision: "baseline",
            names,
            tags: BASELINE_TAGS.to_vec(),
        }
    }

    /// Label this table with an engine revision.
    #[must_use]
    pub fn revision(mut self, revision: &'static str) -> Self {
        self.revision = revision;
        self
    }

    /// Add engine-specific spellings for a field, tried after the baseline.
    #[must_use]
    pub fn alias(mut self, field: Field, names: &[&'static str]) -> Self {
        let entry = self.names.entry(field).or_default();
        for name in names {
            if !entry.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                entry.push(name);
            }
        }
        self
    }

    /// Add an engine-specific discriminator tag.
    #[must_use]
    pub fn tag(mut self, tag: &'static str, section: Section) -> Self {
        self.tags.push((tag, section));
        self
    }

    /// The revision label this table was built for.
    pub fn revision_label(&self) -> &'static str {
        self.revision
    }

    /// Spellings accepted for a field.
    pub fn names(&self, field: Field) -> &[&'static str] {
        self.names.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a field in a row. SQL NULL counts as absent.
    pub fn get<'r>(&self, row: &'r Row, field: Field) -> Option<&'r Value> {
        self.names(field)
            .iter()
            .filter_map(|name| row.get_ignore_case(name))
            .find(|value| !value.is_null())
    }

    /// Resolve a field as trimmed, non-empty text.
    pub fn text(&self, row: &Row, field: Field) -> Option<String> {
        self.get(row, field)
            .and_then(Value::as_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Resolve a field as an `i32`.
    pub fn int(&self, row: &Row, field: Field) -> Option<i32> {
        self.get(row, field)
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
    }

    /// Resolve a field as a boolean flag.
    pub fn flag(&self, row: &Row, field: Field) -> Option<bool> {
        self.get(row, field).and_then(Value::as_bool)
    }

    /// Remove the discriminator from a row, returning its tag text.
    ///
    /// The column never survives into canonical records.
    pub fn take_discriminator(&self, row: &mut Row) -> Option<String> {
        let mut tag = None;
        for name in self.names(Field::Discriminator) {
            if let Some(value) = row.remove_ignore_case(name) {
                if tag.is_none() {
                    tag = value.as_text();
                }
            }
        }
        tag
    }

    /// Map a discriminator tag to its section. Unknown tags yield `None`.
    pub fn section_for_tag(&self, tag: &str) -> Option<Section> {
        let tag = tag.trim();
        self.tags
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(tag))
            .map(|(_, section)| *section)
    }
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self::baseline()
    }
}
