//! SQL Server catalog definitions.

use crate::definitions::{
    CatalogQueries, Exclusions, Field, FieldAliases, FieldDefinition, FieldKind, Section,
    DISCRIMINATOR_COLUMN,
};

pub(super) const EXCLUSIONS: Exclusions = Exclusions {
    schemas: &["sys", "INFORMATION_SCHEMA"],
    schema_prefixes: &[],
    databases: &["master", "model", "tempdb", "msdb"],
};

pub(super) const FIELDS: &[FieldDefinition] = &[
    FieldDefinition::new("host", "Host/Server/IP Address", FieldKind::Text, true),
    FieldDefinition::new("port", "Port (optional)", FieldKind::Number, false),
    FieldDefinition::new("database", "Database", FieldKind::Text, true),
    FieldDefinition::new("username", "Database Username", FieldKind::Text, true),
    FieldDefinition::new("password", "Database Password", FieldKind::Password, false),
    FieldDefinition::new("encrypt", "Encrypt", FieldKind::Checkbox, false),
    FieldDefinition::new(
        "trustServerCertificate",
        "Trust Server Certificate",
        FieldKind::Checkbox,
        false,
    ),
];

/// The constraint section projects its owner as `constraint_schema` /
/// `constraint_table`.
pub(super) fn aliases() -> FieldAliases {
    FieldAliases::baseline()
        .revision("mssql-2016")
        .alias(Field::Schema, &["constraint_schema"])
        .alias(Field::Table, &["constraint_table"])
        .alias(Field::IndexType, &["type_desc"])
}

pub(super) fn queries() -> CatalogQueries {
    CatalogQueries {
        table_columns: table_columns_sql(),
        constraints: Some(constraints_sql()),
        indexes: Some(indexes_sql()),
        databases: databases_sql(),
    }
}

fn table_columns_sql() -> String {
    format!(
        r#"SELECT
  '{tag}' AS {disc},
  t.TABLE_SCHEMA AS table_schema,
  t.TABLE_NAME AS table_name,
  CAST(tp.value AS NVARCHAR(4000)) AS table_description,
  c.COLUMN_NAME AS column_name,
  CAST(cp.value AS NVARCHAR(4000)) AS column_description,
  c.DATA_TYPE AS data_type,
  c.ORDINAL_POSITION AS ordinal_position,
  c.CHARACTER_MAXIMUM_LENGTH AS character_maximum_length,
  c.NUMERIC_PRECISION AS numeric_precision,
  c.NUMERIC_SCALE AS numeric_scale,
  c.IS_NULLABLE AS is_nullable
FROM INFORMATION_SCHEMA.TABLES AS t
JOIN INFORMATION_SCHEMA.COLUMNS AS c
  ON c.TABLE_SCHEMA = t.TABLE_SCHEMA
  AND c.TABLE_NAME = t.TABLE_NAME
LEFT JOIN sys.extended_properties AS tp
  ON tp.class = 1
  AND tp.major_id = OBJECT_ID(QUOTENAME(t.TABLE_SCHEMA) + '.' + QUOTENAME(t.TABLE_NAME))
  AND tp.minor_id = 0
  AND tp.name = 'MS_Description'
LEFT JOIN sys.extended_properties AS cp
  ON cp.class = 1
  AND cp.major_id = OBJECT_ID(QUOTENAME(t.TABLE_SCHEMA) + '.' + QUOTENAME(t.TABLE_NAME))
  AND cp.minor_id = COLUMNPROPERTY(cp.major_id, c.COLUMN_NAME, 'ColumnId')
  AND cp.name = 'MS_Description'
WHERE {filter}
ORDER BY t.TABLE_SCHEMA, t.TABLE_NAME, c.ORDINAL_POSITION"#,
        tag = Section::TableColumns.tag(),
        disc = DISCRIMINATOR_COLUMN,
        filter = EXCLUSIONS.schema_predicate("t.TABLE_SCHEMA"),
    )
}

fn constraints_sql() -> String {
    format!(
        r#"SELECT
  '{tag}' AS {disc},
  tc.CONSTRAINT_SCHEMA AS constraint_schema,
  tc.TABLE_NAME AS constraint_table,
  tc.CONSTRAINT_NAME AS constraint_name,
  tc.CONSTRAINT_TYPE AS constraint_type,
  ccu.COLUMN_NAME AS column_name,
  OBJECT_SCHEMA_NAME(fkc.referenced_object_id) AS foreign_table_schema,
  OBJECT_NAME(fkc.referenced_object_id) AS foreign_table_name,
  COL_NAME(fkc.referenced_object_id, fkc.referenced_column_id) AS foreign_column_name
FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS AS tc
JOIN INFORMATION_SCHEMA.CONSTRAINT_COLUMN_USAGE AS ccu
  ON ccu.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA
  AND ccu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
  AND ccu.TABLE_NAME = tc.TABLE_NAME
LEFT JOIN sys.foreign_key_columns AS fkc
  ON tc.CONSTRAINT_TYPE = 'FOREIGN KEY'
  AND fkc.constraint_object_id = OBJECT_ID(QUOTENAME(tc.CONSTRAINT_SCHEMA) + '.' + QUOTENAME(tc.CONSTRAINT_NAME))
  AND COL_NAME(fkc.parent_object_id, fkc.parent_column_id) = ccu.COLUMN_NAME
WHERE {filter}
ORDER BY tc.CONSTRAINT_SCHEMA, tc.TABLE_NAME, tc.CONSTRAINT_NAME"#,
        tag = Section::Constraints.tag(),
        disc = DISCRIMINATOR_COLUMN,
        filter = EXCLUSIONS.schema_predicate("tc.CONSTRAINT_SCHEMA"),
    )
}

fn indexes_sql() -> String {
    format!(
        r#"SELECT
  '{tag}' AS {disc},
  OBJECT_SCHEMA_NAME(i.object_id) AS table_schema,
  OBJECT_NAME(i.object_id) AS table_name,
  i.name AS index_name,
  i.type_desc AS index_type,
  COL_NAME(ic.object_id, ic.column_id) AS column_name,
  i.is_primary_key,
  i.is_unique,
  i.is_unique_constraint,
  ic.index_column_id,
  ic.key_ordinal,
  ic.is_included_column
FROM sys.indexes AS i
JOIN sys.index_columns AS ic
  ON ic.object_id = i.object_id
  AND ic.index_id = i.index_id
JOIN sys.tables AS st ON st.object_id = i.object_id
WHERE i.is_hypothetical = 0
  AND i.index_id <> 0
  AND st.is_ms_shipped = 0
  AND {filter}
ORDER BY table_schema, table_name, index_name, ic.index_column_id"#,
        tag = Section::Indexes.tag(),
        disc = DISCRIMINATOR_COLUMN,
        filter = EXCLUSIONS.schema_predicate("OBJECT_SCHEMA_NAME(i.object_id)"),
    )
}

fn databases_sql() -> String {
    format!(
        r#"SELECT
  '{tag}' AS {disc},
  d.name AS name,
  CAST(SUM(CAST(mf.size AS BIGINT)) * 8 / 1024.0 AS FLOAT) AS size,
  d.database_id AS id,
  d.create_date AS created
FROM sys.databases AS d
JOIN sys.master_files AS mf ON mf.database_id = d.database_id
WHERE {filter}
GROUP BY d.name, d.database_id, d.create_date
ORDER BY d.name"#,
        tag = Section::Databases.tag(),
        disc = DISCRIMINATOR_COLUMN,
        filter = EXCLUSIONS.database_predicate("d.name"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{CompositionStrategy, QueryPlan};
    use crate::core::value::Row;

    #[test]
    fn test_every_section_is_tagged() {
        let queries = queries();
        for section in [
            Section::TableColumns,
            Section::Constraints,
            Section::Indexes,
            Section::Databases,
        ] {
            let sql = queries.sql(section).unwrap();
            assert!(sql.contains(&format!("'{}' AS __result__type", section.tag())));
        }
    }

    #[test]
    fn test_batch_statement_contains_all_schema_sections_in_order() {
        let queries = queries();
        let plan = QueryPlan::schema("mssql", CompositionStrategy::Batch, &queries);
        let statements = plan.statements();
        assert_eq!(statements.len(), 1);

        let batch = &statements[0];
        let cols = batch.find("'INFORMATION_SCHEMA'").unwrap();
        let cons = batch.find("'INFORMATION_CONSTRAINTS'").unwrap();
        let idx = batch.find("'INFORMATION_INDEXES'").unwrap();
        assert!(cols < cons && cons < idx);
        assert!(!batch.contains("INFORMATION_DATABASES"));
    }

    #[test]
    fn test_exclusions_in_sql() {
        assert!(table_columns_sql().contains("t.TABLE_SCHEMA NOT IN ('sys', 'INFORMATION_SCHEMA')"));
        assert!(databases_sql().contains("d.name NOT IN ('master', 'model', 'tempdb', 'msdb')"));
    }

    #[test]
    fn test_constraints_are_foreign_key_aware() {
        let sql = constraints_sql();
        assert!(sql.contains("sys.foreign_key_columns"));
        assert!(sql.contains("foreign_column_name"));
        assert!(!sql.contains("REFERENTIAL_CONSTRAINTS"));
    }

    #[test]
    fn test_aliases_resolve_constraint_owner() {
        let aliases = aliases();
        let row = Row::new()
            .with("constraint_schema", "dbo")
            .with("constraint_table", "Orders");
        assert_eq!(aliases.text(&row, Field::Schema).as_deref(), Some("dbo"));
        assert_eq!(aliases.text(&row, Field::Table).as_deref(), Some("Orders"));
    }

    #[test]
    fn test_fields() {
        let keys: Vec<_> = FIELDS.iter().map(|f| f.key).collect();
        assert_eq!(
            keys,
            vec![
                "host",
                "port",
                "database",
                "username",
                "password",
                "encrypt",
                "trustServerCertificate"
            ]
        );
    }
}
