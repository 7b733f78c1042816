//! Schema metadata types for tables, columns, constraints, indexes and databases.
//!
//! These types provide the engine-independent representation returned by
//! every driver, regardless of how the catalog rows were fetched.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Engine-native data type name (e.g., "int4", "nvarchar").
    pub data_type: String,

    /// 1-based position as reported by the engine.
    pub ordinal_position: i32,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Maximum length for character types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,

    /// Numeric precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,

    /// Numeric scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i32>,

    /// Column comment / description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Table metadata with its ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Schema name.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Table comment / description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Column definitions in ordinal order.
    pub columns: Vec<Column>,
}

impl Table {
    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Find a column by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// One column bound by a named constraint.
///
/// Composite constraints appear as several records sharing `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Owning schema name.
    pub schema: String,

    /// Owning table name.
    pub table: String,

    /// Constraint name.
    pub name: String,

    /// Engine-reported kind, e.g. "PRIMARY KEY", "FOREIGN KEY", "UNIQUE", "CHECK".
    pub kind: String,

    /// Local column bound by this record.
    pub column: String,

    /// Referenced schema (foreign keys only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_schema: Option<String>,

    /// Referenced table (foreign keys only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_table: Option<String>,

    /// Referenced column (foreign keys only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_column: Option<String>,
}

impl Constraint {
    /// Whether the engine-reported kind denotes a foreign key.
    ///
    /// Engines and revisions spell it `FOREIGN KEY` or `FOREIGN_KEY`.
    pub fn is_foreign_key(&self) -> bool {
        is_foreign_key_kind(&self.kind)
    }

    /// The referenced `(schema, table, column)` for a foreign key.
    pub fn reference(&self) -> Option<(&str, &str, &str)> {
        match (&self.foreign_schema, &self.foreign_table, &self.foreign_column) {
            (Some(s), Some(t), Some(c)) => Some((s, t, c)),
            _ => None,
        }
    }
}

/// Check whether a constraint kind string names a foreign key.
pub(crate) fn is_foreign_key_kind(kind: &str) -> bool {
    let normalized: String = kind
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c.to_ascii_uppercase() })
        .collect();
    normalized == "FOREIGN_KEY"
}

/// One column of a named index.
///
/// Multi-column indexes appear as several records sharing `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Owning schema name.
    pub schema: String,

    /// Owning table name.
    pub table: String,

    /// Index name.
    pub name: String,

    /// Indexed column.
    pub column: String,

    /// Whether the index backs the primary key.
    pub is_primary_key: bool,

    /// Whether the index is unique.
    pub is_unique: bool,

    /// Whether the index backs a UNIQUE constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unique_constraint: Option<bool>,

    /// Engine index type (e.g., "CLUSTERED", "NONCLUSTERED").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,

    /// Position of the column in the index definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_position: Option<i32>,

    /// Position of the column within the index key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ordinal: Option<i32>,

    /// Whether the column is a non-key (covering) column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_included_column: Option<bool>,
}

/// Database listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Database name.
    pub name: String,

    /// Size in megabytes.
    pub size_mb: f64,

    /// Engine-specific identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Point-in-time, read-only view of a connection's relational structure.
///
/// Always complete: tables, constraints and indexes are all present
/// (possibly empty), or the acquisition that would have produced it failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Tables in first-seen catalog order.
    pub tables: Vec<Table>,

    /// Constraint records, one per bound column.
    pub constraints: Vec<Constraint>,

    /// Index records, one per indexed column.
    pub indexes: Vec<Index>,

    /// Rows dropped or defaulted while normalizing.
    #[serde(skip)]
    pub warnings: usize,
}

impl SchemaSnapshot {
    /// Find a table by schema and name.
    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.name == name)
    }

    /// Constraints owned by a table.
    pub fn constraints_for<'a>(
        &'a self,
        schema: &'a str,
        table: &'a str,
    ) -> impl Iterator<Item = &'a Constraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| c.schema == schema && c.table == table)
    }

    /// Foreign key records across all tables.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_foreign_key())
    }

    /// Total number of columns across all tables.
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    /// Whether all sections are empty.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.constraints.is_empty() && self.indexes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_constraint(kind: &str) -> Constraint {
        Constraint {
            schema: "public".to_string(),
            table: "orders".to_string(),
            name: "orders_customer_fk".to_string(),
            kind: kind.to_string(),
            column: "customer_id".to_string(),
            foreign_schema: Some("public".to_string()),
            foreign_table: Some("customers".to_string()),
            foreign_column: Some("id".to_string()),
        }
    }

    #[test]
    fn test_table_full_name() {
        let table = Table {
            schema: "dbo".to_string(),
            name: "TestTable".to_string(),
            description: None,
            columns: vec![],
        };
        assert_eq!(table.full_name(), "dbo.TestTable");
    }

    #[test]
    fn test_foreign_key_kind_spellings() {
        assert!(is_foreign_key_kind("FOREIGN KEY"));
        assert!(is_foreign_key_kind("FOREIGN_KEY"));
        assert!(is_foreign_key_kind("foreign key"));
        assert!(!is_foreign_key_kind("PRIMARY KEY"));
        assert!(!is_foreign_key_kind("UNIQUE"));
    }

    #[test]
    fn test_constraint_reference() {
        let fk = make_test_constraint("FOREIGN KEY");
        assert!(fk.is_foreign_key());
        assert_eq!(fk.reference(), Some(("public", "customers", "id")));

        let mut partial = make_test_constraint("FOREIGN KEY");
        partial.foreign_column = None;
        assert_eq!(partial.reference(), None);
    }

    #[test]
    fn test_snapshot_lookups() {
        let snapshot = SchemaSnapshot {
            tables: vec![Table {
                schema: "public".to_string(),
                name: "orders".to_string(),
                description: None,
                columns: vec![],
            }],
            constraints: vec![make_test_constraint("FOREIGN KEY"), {
                let mut pk = make_test_constraint("PRIMARY KEY");
                pk.name = "orders_pkey".to_string();
                pk.column = "id".to_string();
                pk.foreign_schema = None;
                pk.foreign_table = None;
                pk.foreign_column = None;
                pk
            }],
            indexes: vec![],
            warnings: 0,
        };

        assert!(snapshot.table("public", "orders").is_some());
        assert!(snapshot.table("public", "missing").is_none());
        assert_eq!(snapshot.constraints_for("public", "orders").count(), 2);
        assert_eq!(snapshot.foreign_keys().count(), 1);
        assert!(!snapshot.is_empty());
        assert!(SchemaSnapshot::default().is_empty());
    }

    #[test]
    fn test_snapshot_serialization_omits_absent_references() {
        let mut pk = make_test_constraint("PRIMARY KEY");
        pk.foreign_schema = None;
        pk.foreign_table = None;
        pk.foreign_column = None;
        let json = serde_json::to_value(&pk).unwrap();
        assert!(json.get("foreign_table").is_none());
        assert_eq!(json["kind"], "PRIMARY KEY");
    }
}
