//! Scalar values and row sets as returned by a statement executor.
//!
//! Rows keep column names exactly as the engine reported them (case
//! included). Lookups used by the normalizer are case-insensitive, and the
//! accessors coerce between representations because the same logical value
//! arrives typed from SQL Server but as text from PostgreSQL simple queries.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;

/// A single scalar value in a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,

    /// Boolean value (`bit`, `boolean`).
    Bool(bool),

    /// Any integer width, widened to 64 bits.
    Int(i64),

    /// Floating point or decimal value.
    Float(f64),

    /// Text value.
    Text(String),

    /// Timestamp without timezone.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render as text. NULL yields `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(v) => Some(v.to_string()),
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Text(v) => Some(v.clone()),
            Value::DateTime(v) => Some(v.to_string()),
        }
    }

    /// Interpret as an integer.
    ///
    /// Text is parsed (surrounding whitespace ignored), floats are truncated
    /// only when they carry no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::Text(v) => v.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret as a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Text(v) => v.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret as a boolean.
    ///
    /// Accepts the spellings catalogs use for flags: `YES`/`NO` from
    /// `information_schema`, `t`/`f` from PostgreSQL text output and
    /// `1`/`0` from SQL Server `bit` columns.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(v) => Some(*v != 0),
            Value::Text(v) => match v.trim().to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" | "t" | "1" => Some(true),
                "no" | "n" | "false" | "f" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Interpret as a timestamp.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(v) => Some(*v),
            Value::Text(v) => {
                let v = v.trim();
                NaiveDateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f"))
                    .ok()
            }
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One result row: column name to value, in projection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column value. A repeated name replaces the earlier value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// Builder form of [`Row::insert`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Exact-name lookup.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Case-insensitive lookup.
    pub fn get_ignore_case(&self, column: &str) -> Option<&Value> {
        self.values.get(column).or_else(|| {
            self.values
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(column))
                .map(|(_, value)| value)
        })
    }

    /// Remove a column by case-insensitive name.
    pub fn remove_ignore_case(&mut self, column: &str) -> Option<Value> {
        let key = self
            .values
            .keys()
            .find(|name| name.eq_ignore_ascii_case(column))
            .cloned()?;
        self.values.shift_remove(&key)
    }

    /// Column names in projection order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Column/value pairs in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// One result set: ordered rows from a single statement.
pub type RowSet = Vec<Row>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int(42).is_null());
        assert!(Value::from(None::<String>).is_null());
    }

    #[test]
    fn test_value_bool_coercion() {
        assert_eq!(Value::from("YES").as_bool(), Some(true));
        assert_eq!(Value::from("NO").as_bool(), Some(false));
        assert_eq!(Value::from("t").as_bool(), Some(true));
        assert_eq!(Value::from("f").as_bool(), Some(false));
        assert_eq!(Value::Int(1).as_bool(), Some(true));
        assert_eq!(Value::Int(0).as_bool(), Some(false));
        assert_eq!(Value::from("maybe").as_bool(), None);
        assert_eq!(Value::Null.as_bool(), None);
    }

    #[test]
    fn test_value_int_coercion() {
        assert_eq!(Value::from(" 42 ").as_i64(), Some(42));
        assert_eq!(Value::Float(3.0).as_i64(), Some(3));
        assert_eq!(Value::Float(3.5).as_i64(), None);
        assert_eq!(Value::from("abc").as_i64(), None);
        assert_eq!(Value::Bool(true).as_i64(), Some(1));
    }

    #[test]
    fn test_value_datetime_from_text() {
        let dt = Value::from("2024-03-01 10:15:30.5").as_datetime().unwrap();
        assert_eq!(dt.to_string(), "2024-03-01 10:15:30.500");
        assert!(Value::from("yesterday").as_datetime().is_none());
    }

    #[test]
    fn test_row_case_insensitive_lookup() {
        let row = Row::new()
            .with("TABLE_SCHEMA", "dbo")
            .with("table_name", "Users");

        assert_eq!(row.get("TABLE_SCHEMA"), Some(&Value::from("dbo")));
        assert_eq!(row.get("table_schema"), None);
        assert_eq!(row.get_ignore_case("table_schema"), Some(&Value::from("dbo")));
        assert_eq!(row.get_ignore_case("TABLE_NAME"), Some(&Value::from("Users")));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["TABLE_SCHEMA", "table_name"]);
    }

    #[test]
    fn test_row_remove_ignore_case() {
        let mut row: Row = [("__Result__Type", "INFORMATION_SCHEMA"), ("x", "1")]
            .into_iter()
            .collect();
        assert_eq!(
            row.remove_ignore_case("__result__type"),
            Some(Value::from("INFORMATION_SCHEMA"))
        );
        assert_eq!(row.len(), 1);
        assert!(row.remove_ignore_case("missing").is_none());
    }

    #[test]
    fn test_value_serializes_untagged() {
        let row = Row::new().with("n", 1i64).with("s", "x").with("z", Value::Null);
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"n":1,"s":"x","z":null}"#
        );
    }
}
