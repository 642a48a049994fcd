//! Equality filters rendered into a SoQL `$where` expression.

use std::fmt;

/// Right-hand side of a `field = value` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Rendered bare, e.g. `funding_year = 2024`.
    Number(i64),
    /// Rendered single-quoted, e.g. `state = 'CA'`.
    Text(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Number(n) => write!(f, "{n}"),
            // SoQL escapes a quote inside a literal by doubling it
            FilterValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl FilterValue {
    /// The value as a plain query-string parameter, without SoQL quoting.
    pub fn as_param(&self) -> String {
        match self {
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Number(n.into())
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

/// Conjunction of equality constraints, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    clauses: Vec<(String, FilterValue)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        self.clauses.push((field.into(), value.into()));
    }

    /// Adds the clause only when a value is present.
    pub fn with_opt<V: Into<FilterValue>>(self, field: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(field, v),
            None => self,
        }
    }

    /// `self`'s clauses followed by `other`'s.
    pub fn and(&self, other: &FilterSet) -> FilterSet {
        let mut merged = self.clone();
        merged.clauses.extend(other.clauses.iter().cloned());
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.clauses.iter().map(|(field, value)| (field.as_str(), value))
    }

    /// The `$where` expression, or `None` when there is nothing to filter on.
    pub fn where_clause(&self) -> Option<String> {
        if self.clauses.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|(field, value)| format!("{field} = {value}"))
            .collect();
        Some(parts.join(" AND "))
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.where_clause() {
            Some(clause) => f.write_str(&clause),
            None => f.write_str("<none>"),
        }
    }
}
