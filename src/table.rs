//! Schema-less in-memory table built from API pages.
//!
//! Rows keep whatever keys the API returned. The column set is the union of
//! every row's keys in first-seen order, so a column missing from some rows
//! simply reads as null there.

use serde_json::{Map, Value};

/// One row as returned by the API.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.push(record);
        }
        table
    }

    /// Appends a row, registering any keys not seen before as new columns.
    pub fn push(&mut self, record: Record) {
        for key in record.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(record);
    }

    /// Appends every row of `other`, keeping its order.
    pub fn append(&mut self, other: Table) {
        for record in other.rows {
            self.push(record);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cell at `row`/`column`; `None` when either is absent or the value is null.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .filter(|v| !v.is_null())
    }

    /// Iterates one column top to bottom, yielding `None` for missing cells.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows
            .iter()
            .map(move |r| r.get(name).filter(|v| !v.is_null()))
    }

    /// Column values coerced to numbers. Non-numeric text and missing cells
    /// become `None`.
    pub fn numeric_column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<f64>> + 'a {
        self.column(name).map(|v| v.and_then(as_number))
    }
}

/// Lenient numeric coercion: numbers pass through, numeric strings are parsed.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Flat text form of a cell, used for CSV output and distinct-value keys.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_columns_are_union_in_first_seen_order() {
        let table = Table::from_records(vec![
            record(json!({"b": 1, "a": 2})),
            record(json!({"a": 3, "c": 4})),
        ]);

        assert_eq!(table.columns(), &["b", "a", "c"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_cells_read_as_none() {
        let table = Table::from_records(vec![
            record(json!({"a": 1})),
            record(json!({"a": null, "b": "x"})),
        ]);

        assert_eq!(table.get(0, "b"), None);
        assert_eq!(table.get(1, "a"), None);
        assert_eq!(table.get(1, "b"), Some(&json!("x")));
        assert_eq!(table.get(5, "a"), None);
    }

    #[test]
    fn test_append_keeps_order() {
        let mut first = Table::from_records(vec![record(json!({"n": 1})), record(json!({"n": 2}))]);
        let second = Table::from_records(vec![record(json!({"n": 3}))]);
        first.append(second);

        let values: Vec<_> = first.numeric_column("n").collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_as_number_coercion() {
        assert_eq!(as_number(&json!("50000")), Some(50000.0));
        assert_eq!(as_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(as_number(&json!(7)), Some(7.0));
        assert_eq!(as_number(&json!("n/a")), None);
        assert_eq!(as_number(&json!(null)), None);
        assert_eq!(as_number(&json!(true)), None);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("CA")), "CA");
        assert_eq!(cell_text(&json!(2024)), "2024");
        assert_eq!(cell_text(&json!({"k": 1})), r#"{"k":1}"#);
    }
}
