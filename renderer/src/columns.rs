//! Column resolution.
//!
//! Column positions inside a result table are not stable across server
//! versions; every extractor resolves the columns it needs by name before
//! touching the row data.

use std::collections::HashMap;

use serde_json::Value;

use common::response::ResultTable;

/// Name -> position map for the columns an extractor cares about, plus typed
/// row accessors.
pub struct ColumnMap {
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    /// Resolves `wanted` column names against the table's schema. Names the
    /// schema lacks are simply absent from the map; accessors on them return
    /// `None`.
    pub fn resolve(table: &ResultTable, wanted: &[&str]) -> Self {
        let mut indices = HashMap::with_capacity(wanted.len());
        for (position, column) in table.schema.iter().enumerate() {
            if wanted.contains(&column.name.as_str()) {
                indices.insert(column.name.clone(), position);
            }
        }
        Self { indices }
    }

    /// Whether every wanted column was present.
    pub fn complete(&self, wanted: &[&str]) -> bool {
        wanted.iter().all(|name| self.indices.contains_key(*name))
    }

    pub fn value<'a>(&self, row: &'a [Value], name: &str) -> Option<&'a Value> {
        row.get(*self.indices.get(name)?)
    }

    pub fn str<'a>(&self, row: &'a [Value], name: &str) -> Option<&'a str> {
        self.value(row, name)?.as_str()
    }

    pub fn string(&self, row: &[Value], name: &str) -> Option<String> {
        self.str(row, name).map(str::to_string)
    }

    /// Numeric accessor tolerant of numbers serialized as strings.
    pub fn f64(&self, row: &[Value], name: &str) -> Option<f64> {
        match self.value(row, name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn i64(&self, row: &[Value], name: &str) -> Option<i64> {
        match self.value(row, name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(schema_names: &[&str], rows: Value) -> ResultTable {
        let schema = schema_names
            .iter()
            .map(|name| json!({"name": name, "type": 9}))
            .collect::<Vec<_>>();
        serde_json::from_value(json!({"schema": schema, "data": rows})).unwrap()
    }

    #[test]
    fn resolves_columns_regardless_of_position() {
        let usual = table(&["HOSTNAME", "PERCENT"], json!([["h1", 12.5]]));
        let shuffled = table(
            &["TIMESTAMP", "PERCENT", "SITE_ID", "HOSTNAME"],
            json!([[0, 12.5, 3, "h1"]]),
        );

        for t in [usual, shuffled] {
            let columns = ColumnMap::resolve(&t, &["HOSTNAME", "PERCENT"]);
            let row = &t.data[0];
            assert_eq!(columns.str(row, "HOSTNAME"), Some("h1"));
            assert_eq!(columns.f64(row, "PERCENT"), Some(12.5));
        }
    }

    #[test]
    fn missing_columns_return_none() {
        let t = table(&["HOSTNAME"], json!([["h1"]]));
        let columns = ColumnMap::resolve(&t, &["HOSTNAME", "PERCENT"]);
        assert!(!columns.complete(&["HOSTNAME", "PERCENT"]));
        assert_eq!(columns.f64(&t.data[0], "PERCENT"), None);
        assert_eq!(columns.str(&t.data[0], "HOSTNAME"), Some("h1"));
    }

    #[test]
    fn numeric_strings_parse() {
        let t = table(&["VALUE"], json!([["42"]]));
        let columns = ColumnMap::resolve(&t, &["VALUE"]);
        assert_eq!(columns.i64(&t.data[0], "VALUE"), Some(42));
        assert_eq!(columns.f64(&t.data[0], "VALUE"), Some(42.0));
    }
}
