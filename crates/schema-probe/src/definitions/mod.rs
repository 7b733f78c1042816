//! Engine catalog definitions.
//!
//! A catalog definition is pure data: the SQL text for each logical section,
//! the system objects to exclude, the field-alias table that maps the engine's
//! projected column names onto canonical fields, and the connection fields a
//! configuration UI should ask for. Engines build one [`CatalogQueries`] at
//! construction and never touch another engine's definitions.

mod aliases;

pub use aliases::{Field, FieldAliases};

use serde::Serialize;

/// Column carrying the section tag in every catalog query this crate ships.
pub const DISCRIMINATOR_COLUMN: &str = "__result__type";

/// Logical result sections of a metadata acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Table/column listing.
    TableColumns,
    /// Constraint listing.
    Constraints,
    /// Index listing.
    Indexes,
    /// Database/size listing.
    Databases,
}

impl Section {
    /// Sections that make up a schema snapshot, in composition order.
    pub const SCHEMA: [Section; 3] = [
        Section::TableColumns,
        Section::Constraints,
        Section::Indexes,
    ];

    /// Short label used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            Section::TableColumns => "tables",
            Section::Constraints => "constraints",
            Section::Indexes => "indexes",
            Section::Databases => "databases",
        }
    }

    /// Discriminator literal emitted by this crate's catalog queries.
    pub fn tag(&self) -> &'static str {
        match self {
            Section::TableColumns => "INFORMATION_SCHEMA",
            Section::Constraints => "INFORMATION_CONSTRAINTS",
            Section::Indexes => "INFORMATION_INDEXES",
            Section::Databases => "INFORMATION_DATABASES",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// SQL text for the four logical catalog queries of one engine.
///
/// The constraint and index sections may be absent for an engine revision
/// that cannot express them; a missing section normalizes to empty.
#[derive(Debug, Clone)]
pub struct CatalogQueries {
    pub table_columns: String,
    pub constraints: Option<String>,
    pub indexes: Option<String>,
    pub databases: String,
}

impl CatalogQueries {
    /// SQL for one section, if the engine defines it.
    pub fn sql(&self, section: Section) -> Option<&str> {
        match section {
            Section::TableColumns => Some(&self.table_columns),
            Section::Constraints => self.constraints.as_deref(),
            Section::Indexes => self.indexes.as_deref(),
            Section::Databases => Some(&self.databases),
        }
    }
}

/// System schemas and databases that are never materialized.
///
/// The same lists generate the SQL predicates baked into catalog queries and
/// drive the normalizer's own filtering.
#[derive(Debug, Clone, Copy)]
pub struct Exclusions {
    /// Exact schema names (compared case-insensitively).
    pub schemas: &'static [&'static str],
    /// Schema name prefixes (compared case-insensitively).
    pub schema_prefixes: &'static [&'static str],
    /// Exact database names (compared case-insensitively).
    pub databases: &'static [&'static str],
}

impl Exclusions {
    /// Whether a schema belongs to the engine itself.
    pub fn is_system_schema(&self, schema: &str) -> bool {
        self.schemas.iter().any(|s| s.eq_ignore_ascii_case(schema))
            || self.schema_prefixes.iter().any(|p| {
                schema.len() >= p.len() && schema[..p.len()].eq_ignore_ascii_case(p)
            })
    }

    /// Whether a database is a system/template database.
    pub fn is_system_database(&self, name: &str) -> bool {
        self.databases.iter().any(|d| d.eq_ignore_ascii_case(name))
    }

    /// SQL predicate excluding system schemas for `column`.
    pub fn schema_predicate(&self, column: &str) -> String {
        let mut clauses = Vec::new();
        if !self.schemas.is_empty() {
            clauses.push(format!("{} NOT IN ({})", column, sql_string_list(self.schemas)));
        }
        for prefix in self.schema_prefixes {
            clauses.push(format!(
                "{} NOT LIKE '{}%' ESCAPE '!'",
                column,
                escape_like(prefix)
            ));
        }
        if clauses.is_empty() {
            "1 = 1".to_string()
        } else {
            clauses.join(" AND ")
        }
    }

    /// SQL predicate excluding system databases for `column`.
    pub fn database_predicate(&self, column: &str) -> String {
        if self.databases.is_empty() {
            "1 = 1".to_string()
        } else {
            format!("{} NOT IN ({})", column, sql_string_list(self.databases))
        }
    }
}

/// Render a list of string literals for an `IN (...)` clause.
pub fn sql_string_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape a literal for use inside a LIKE pattern with `ESCAPE '!'`.
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '!' | '%' | '_' | '[' => {
                out.push('!');
                out.push(c);
            }
            '\'' => out.push_str("''"),
            _ => out.push(c),
        }
    }
    out
}

/// Input type of a connection field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Password,
    Number,
    Checkbox,
}

/// Declarative connection field consumed by a configuration UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDefinition {
    pub const fn new(
        key: &'static str,
        label: &'static str,
        kind: FieldKind,
        required: bool,
    ) -> Self {
        Self {
            key,
            label,
            kind,
            required,
        }
    }
}
