//! PostgreSQL catalog definitions.

use crate::definitions::{
    CatalogQueries, Exclusions, Field, FieldAliases, FieldDefinition, FieldKind, Section,
    DISCRIMINATOR_COLUMN,
};

pub(super) const EXCLUSIONS: Exclusions = Exclusions {
    schemas: &["information_schema"],
    schema_prefixes: &["pg_"],
    databases: &["template0", "template1", "postgres"],
};

pub(super) const FIELDS: &[FieldDefinition] = &[
    FieldDefinition::new("host", "Host/Server/IP Address", FieldKind::Text, true),
    FieldDefinition::new("port", "Port (optional)", FieldKind::Number, false),
    FieldDefinition::new("database", "Database", FieldKind::Text, true),
    FieldDefinition::new("username", "Database Username", FieldKind::Text, true),
    FieldDefinition::new("password", "Database Password", FieldKind::Password, false),
    FieldDefinition::new("ssl", "Use SSL", FieldKind::Checkbox, false),
];

pub(super) fn aliases() -> FieldAliases {
    FieldAliases::baseline()
        .revision("postgres-9.5")
        .alias(Field::DataType, &["udt_name"])
        .alias(Field::IndexName, &["indexname"])
        .alias(Field::DatabaseName, &["datname"])
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
  t.table_schema,
  t.table_name,
  obj_description(format('%I.%I', t.table_schema, t.table_name)::regclass, 'pg_class') AS table_description,
  c.column_name,
  col_description(format('%I.%I', c.table_schema, c.table_name)::regclass, c.ordinal_position::int) AS column_description,
  c.udt_name AS data_type,
  c.ordinal_position,
  c.character_maximum_length,
  c.numeric_precision,
  c.numeric_scale,
  c.is_nullable
FROM information_schema.tables AS t
JOIN information_schema.columns AS c
  ON c.table_schema = t.table_schema
  AND c.table_name = t.table_name
WHERE {filter}
ORDER BY t.table_schema, t.table_name, c.ordinal_position"#,
        tag = Section::TableColumns.tag(),
        disc = DISCRIMINATOR_COLUMN,
        filter = EXCLUSIONS.schema_predicate("t.table_schema"),
    )
}

fn constraints_sql() -> String {
    format!(
        r#"SELECT
  '{tag}' AS {disc},
  tc.table_schema,
  tc.table_name,
  tc.constraint_name,
  tc.constraint_type,
  kcu.column_name,
  fk.table_schema AS foreign_table_schema,
  fk.table_name AS foreign_table_name,
  fk.column_name AS foreign_column_name
FROM information_schema.table_constraints AS tc
JOIN information_schema.key_column_usage AS kcu
  ON kcu.constraint_schema = tc.constraint_schema
  AND kcu.constraint_name = tc.constraint_name
  AND kcu.table_name = tc.table_name
LEFT JOIN information_schema.referential_constraints AS rc
  ON rc.constraint_schema = tc.constraint_schema
  AND rc.constraint_name = tc.constraint_name
LEFT JOIN information_schema.key_column_usage AS fk
  ON fk.constraint_schema = rc.unique_constraint_schema
  AND fk.constraint_name = rc.unique_constraint_name
  AND fk.ordinal_position = kcu.position_in_unique_constraint
WHERE {filter}
ORDER BY tc.table_schema, tc.table_name, tc.constraint_name, kcu.ordinal_position"#,
        tag = Section::Constraints.tag(),
        disc = DISCRIMINATOR_COLUMN,
        filter = EXCLUSIONS.schema_predicate("tc.table_schema"),
    )
}

fn indexes_sql() -> String {
    format!(
        r#"SELECT
  '{tag}' AS {disc},
  ns.nspname AS table_schema,
  t.relname AS table_name,
  i.relname AS index_name,
  a.attname AS column_name,
  ix.indisprimary AS is_primary_key,
  ix.indisunique AS is_unique,
  EXISTS (
    SELECT 1 FROM pg_catalog.pg_constraint AS con
    WHERE con.conindid = ix.indexrelid AND con.contype = 'u'
  ) AS is_unique_constraint,
  am.amname AS index_type,
  array_position(ix.indkey::int2[], a.attnum) AS key_ordinal
FROM pg_catalog.pg_index AS ix
JOIN pg_catalog.pg_class AS t ON t.oid = ix.indrelid
JOIN pg_catalog.pg_class AS i ON i.oid = ix.indexrelid
JOIN pg_catalog.pg_am AS am ON am.oid = i.relam
JOIN pg_catalog.pg_namespace AS ns ON ns.oid = t.relnamespace
JOIN pg_catalog.pg_attribute AS a
  ON a.attrelid = t.oid
  AND a.attnum = ANY(ix.indkey)
WHERE t.relkind IN ('r', 'p') AND {filter}
ORDER BY ns.nspname, t.relname, i.relname, key_ordinal"#,
        tag = Section::Indexes.tag(),
        disc = DISCRIMINATOR_COLUMN,
        filter = EXCLUSIONS.schema_predicate("ns.nspname"),
    )
}

fn databases_sql() -> String {
    format!(
        r#"SELECT
  '{tag}' AS {disc},
  d.datname AS name,
  round(pg_database_size(d.datname) / 1024.0 / 1024.0, 2) AS size,
  d.oid AS id
FROM pg_catalog.pg_database AS d
WHERE {filter}
  AND has_database_privilege(d.datname, 'CONNECT')
ORDER BY d.datname"#,
        tag = Section::Databases.tag(),
        disc = DISCRIMINATOR_COLUMN,
        filter = EXCLUSIONS.database_predicate("d.datname"),
    )
}
