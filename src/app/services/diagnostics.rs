//! Recoverable-anomaly tally for reporting.
//!
//! Missing source fields are substituted with null and counted here rather
//! than aborting the run. The tally is an explicit context object passed
//! through the stage evaluator, never global state, and is only ever used
//! for the end-of-run report.

use std::collections::BTreeMap;

use serde::Serialize;

/// Per-run tally of missing-field anomalies, keyed by field name
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    counts: BTreeMap<String, u64>,
    total: u64,
}

impl Diagnostics {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one missing-field anomaly
    pub fn missing_field(&mut self, field: &str) {
        *self.counts.entry(field.to_string()).or_insert(0) += 1;
        self.total += 1;
    }

    /// Number of anomalies recorded for one field
    pub fn count(&self, field: &str) -> u64 {
        self.counts.get(field).copied().unwrap_or(0)
    }

    /// Total anomaly count across all fields
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether no anomalies were recorded
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterate over (field, count) pairs in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_tally() {
        let mut diag = Diagnostics::new();
        assert!(diag.is_empty());

        diag.missing_field("url_name");
        diag.missing_field("url_name");
        diag.missing_field("parent");

        assert_eq!(diag.count("url_name"), 2);
        assert_eq!(diag.count("parent"), 1);
        assert_eq!(diag.count("never_seen"), 0);
        assert_eq!(diag.total(), 3);
        assert!(!diag.is_empty());
    }

    #[test]
    fn test_iteration_is_sorted_by_field() {
        let mut diag = Diagnostics::new();
        diag.missing_field("zebra");
        diag.missing_field("alpha");

        let fields: Vec<&str> = diag.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["alpha", "zebra"]);
    }
}
