//! Summary statistics over a collected [`Table`].
//!
//! Everything here is pure. Columns named in a [`SummaryRequest`] that the
//! table does not carry are left out of the result instead of failing.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::table::{Table, cell_text};

/// A column known under one or more names. The first name the table
/// carries wins, so API field names and saved-extract headers both match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    names: Vec<String>,
}

impl Column {
    pub fn any_of(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    fn resolve<'a>(&'a self, table: &Table) -> Option<&'a str> {
        self.names
            .iter()
            .map(String::as_str)
            .find(|name| table.has_column(name))
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Self::any_of(&[name])
    }
}

/// Which columns to summarize and how.
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    /// Columns whose sorted distinct values are listed.
    pub values: Vec<Column>,
    /// Columns whose distinct values are counted.
    pub distinct: Vec<Column>,
    /// Columns whose per-value row counts are reported.
    pub distributions: Vec<Column>,
    /// Column coerced to numbers for sum and mean.
    pub numeric: Option<Column>,
}

impl SummaryRequest {
    /// Summary used for E-Rate recipient commitments.
    pub fn erate() -> Self {
        Self {
            values: vec!["funding_year".into()],
            distinct: vec!["state".into(), "entity_name".into()],
            distributions: vec!["applicant_type".into()],
            numeric: Some("total_commitment".into()),
        }
    }

    /// Summary used for IMLS library survey rows, from the API or from an
    /// uppercase survey extract.
    pub fn libraries() -> Self {
        let state = Column::any_of(&["stabr", "state", "STABR"]);
        Self {
            values: Vec::new(),
            distinct: vec![state.clone()],
            distributions: vec![state],
            numeric: Some(Column::any_of(&["popu_lsa", "population", "POPU_LSA"])),
        }
    }

    /// Summary used for NCES school directory rows.
    pub fn schools() -> Self {
        Self {
            values: Vec::new(),
            distinct: vec![Column::any_of(&["state_location", "state", "state_name", "fips"])],
            distributions: Vec::new(),
            numeric: Some(Column::any_of(&["enrollment", "total_students"])),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    /// Number of cells that coerced to a number.
    pub count: usize,
    pub sum: f64,
    /// `None` when no cell was numeric.
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStatistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub distinct_counts: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub distributions: BTreeMap<String, BTreeMap<String, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

impl SummaryStatistics {
    /// True when nothing was computed, which is the case for an empty table.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub fn summarize(table: &Table, request: &SummaryRequest) -> SummaryStatistics {
    if table.is_empty() {
        return SummaryStatistics::default();
    }

    let mut stats = SummaryStatistics {
        total_records: Some(table.len()),
        ..Default::default()
    };

    for name in request.values.iter().filter_map(|c| c.resolve(table)) {
        let mut values: Vec<String> = distinct_values(table, name).into_iter().collect();
        values.sort_by(|a, b| compare_values(a, b));
        stats.values.insert(name.to_string(), values);
    }

    for name in request.distinct.iter().filter_map(|c| c.resolve(table)) {
        stats
            .distinct_counts
            .insert(name.to_string(), distinct_values(table, name).len());
    }

    for name in request.distributions.iter().filter_map(|c| c.resolve(table)) {
        let mut counts = BTreeMap::new();
        for value in table.column(name).flatten() {
            *counts.entry(cell_text(value)).or_insert(0usize) += 1;
        }
        stats.distributions.insert(name.to_string(), counts);
    }

    if let Some(name) = request.numeric.as_ref().and_then(|c| c.resolve(table)) {
        let numbers: Vec<f64> = table.numeric_column(name).flatten().collect();
        let sum: f64 = numbers.iter().sum();
        let mean = if numbers.is_empty() {
            None
        } else {
            Some(sum / numbers.len() as f64)
        };
        stats.numeric = Some(NumericSummary {
            column: name.to_string(),
            count: numbers.len(),
            sum,
            mean,
        });
    }

    stats
}

/// Distinct non-null cell texts of a column.
fn distinct_values(table: &Table, column: &str) -> BTreeSet<String> {
    table.column(column).flatten().map(cell_text).collect()
}

/// Numeric order when both sides parse as numbers, text order otherwise.
fn compare_values(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}
