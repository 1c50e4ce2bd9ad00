//! Filter enrichment.
//!
//! An all-selected filter says nothing about which values the view actually
//! renders. Enrichment looks the filter up in the view's summary data and,
//! when the matched column holds only a handful of distinct values, replaces
//! the "(All)" sentinel with that explicit list. Large or unresolvable
//! columns keep the sentinel.
//!
//! Column lookup is a heuristic: bracket decoration is stripped from both
//! names and a column matches when it equals the filter name or contains it.
//! The first matching column wins, so a short filter name can land on the
//! wrong column when several contain it.

use crate::error::HostError;
use crate::host::{ColumnDescriptor, DataRow, SummaryData, View, ALL_ROWS};
use crate::model::FilterSnapshot;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Rows inspected per column, regardless of how many the view offers.
pub const SCAN_ROW_LIMIT: usize = 500;

/// A column with this many distinct values (or more) stays "(All)".
pub const DISTINCT_VALUE_CEILING: usize = 10;

// ============================================================================
// Column matching
// ============================================================================

/// Strategy for locating the column that backs a filter.
pub trait ColumnMatcher: Send + Sync {
    /// Index of the column for `filter_name`, if any.
    fn find_column(&self, filter_name: &str, columns: &[ColumnDescriptor]) -> Option<usize>;
}

/// Bracket-stripping exact-or-substring match, first column wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketSubstringMatcher;

impl ColumnMatcher for BracketSubstringMatcher {
    fn find_column(&self, filter_name: &str, columns: &[ColumnDescriptor]) -> Option<usize> {
        let wanted = strip_brackets(filter_name);
        columns.iter().position(|column| {
            let candidate = strip_brackets(&column.field_name);
            candidate == wanted || candidate.contains(wanted.as_str())
        })
    }
}

/// Remove every `[` and `]` from a field name.
pub fn strip_brackets(name: &str) -> String {
    name.chars().filter(|c| *c != '[' && *c != ']').collect()
}

// ============================================================================
// Outcomes
// ============================================================================

/// What enrichment decided for one all-selected filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// Replaced by `count` explicit values from `column`.
    Resolved { column: String, count: usize },
    /// `column` has at least `DISTINCT_VALUE_CEILING` values; sentinel kept.
    TooManyValues { column: String, count: usize },
    /// `column` matched but no scanned row had a cell for it.
    EmptyColumn { column: String },
    NoMatchingColumn,
    NoRows,
}

impl EnrichmentOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, EnrichmentOutcome::Resolved { .. })
    }
}

/// Per-filter outcomes of one enrichment pass, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentReport {
    pub outcomes: Vec<(String, EnrichmentOutcome)>,
}

impl EnrichmentReport {
    pub fn get(&self, filter: &str) -> Option<&EnrichmentOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == filter)
            .map(|(_, outcome)| outcome)
    }

    pub fn resolved_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_resolved()).count()
    }
}

// ============================================================================
// Enricher
// ============================================================================

/// Distinct formatted values at `column` across the first `SCAN_ROW_LIMIT`
/// rows, in first-seen order. Rows too short for the column are ignored.
pub fn distinct_values(rows: &[DataRow], column: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut distinct = Vec::new();
    for row in rows.iter().take(SCAN_ROW_LIMIT) {
        let Some(cell) = row.get(column) else {
            continue;
        };
        if seen.insert(cell.formatted_value.as_str()) {
            distinct.push(cell.formatted_value.clone());
        }
    }
    distinct
}

/// Filter enrichment engine, generic over the column matching strategy.
#[derive(Debug, Clone, Default)]
pub struct Enricher<M = BracketSubstringMatcher> {
    matcher: M,
}

impl Enricher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: ColumnMatcher> Enricher<M> {
    pub fn with_matcher(matcher: M) -> Self {
        Self { matcher }
    }

    /// Enrich a snapshot against the view's summary data.
    ///
    /// The summary data is fetched at most once, and only when the snapshot
    /// holds at least one sentinel. Host failures propagate; unresolved
    /// filters do not.
    pub async fn enrich(
        &self,
        mut snapshot: FilterSnapshot,
        view: &View<'_>,
    ) -> Result<(FilterSnapshot, EnrichmentReport), HostError> {
        if !snapshot.has_all_selected() {
            return Ok((snapshot, EnrichmentReport::default()));
        }

        let data = view.summary_data(ALL_ROWS).await?;
        debug!(
            view = view.name(),
            columns = data.columns.len(),
            rows = data.rows.len(),
            "summary data fetched"
        );

        let report = self.enrich_with_data(&mut snapshot, &data);
        Ok((snapshot, report))
    }

    /// Enrich a snapshot in place against already-fetched summary data.
    pub fn enrich_with_data(
        &self,
        snapshot: &mut FilterSnapshot,
        data: &SummaryData,
    ) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();

        for name in snapshot.all_selected_names() {
            let (outcome, values) = self.decide(&name, data);
            if let Some(values) = values {
                snapshot.resolve(&name, values);
            }
            debug!(filter = %name, ?outcome, "enrichment decision");
            report.outcomes.push((name, outcome));
        }

        report
    }

    /// The outcome for one filter, plus the replacement values when resolved.
    fn decide(
        &self,
        filter_name: &str,
        data: &SummaryData,
    ) -> (EnrichmentOutcome, Option<Vec<String>>) {
        let matched = self
            .matcher
            .find_column(filter_name, &data.columns)
            .and_then(|index| data.columns.get(index).map(|c| (index, c.field_name.clone())));
        let Some((index, column)) = matched else {
            return (EnrichmentOutcome::NoMatchingColumn, None);
        };
        if data.rows.is_empty() {
            return (EnrichmentOutcome::NoRows, None);
        }

        let values = distinct_values(&data.rows, index);
        match values.len() {
            0 => (EnrichmentOutcome::EmptyColumn { column }, None),
            count if count < DISTINCT_VALUE_CEILING => {
                (EnrichmentOutcome::Resolved { column, count }, Some(values))
            }
            count => (EnrichmentOutcome::TooManyValues { column, count }, None),
        }
    }
}

/// Enrich with the default matcher, discarding the report.
pub async fn enrich(
    snapshot: FilterSnapshot,
    view: &View<'_>,
) -> Result<FilterSnapshot, HostError> {
    Enricher::new()
        .enrich(snapshot, view)
        .await
        .map(|(snapshot, _)| snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DataValue;

    fn columns(names: &[&str]) -> Vec<ColumnDescriptor> {
        names.iter().map(|n| ColumnDescriptor::new(*n)).collect()
    }

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets("[Region]"), "Region");
        assert_eq!(strip_brackets("[Sales].[Region]"), "Sales.Region");
        assert_eq!(strip_brackets("Region"), "Region");
    }

    #[test]
    fn test_matcher_exact_after_stripping() {
        let cols = columns(&["[Date]", "[Region]"]);
        assert_eq!(BracketSubstringMatcher.find_column("Region", &cols), Some(1));
        assert_eq!(BracketSubstringMatcher.find_column("[Region]", &cols), Some(1));
    }

    #[test]
    fn test_matcher_substring_first_wins() {
        let cols = columns(&["[Sub Region]", "[Region]"]);
        // "Sub Region" contains "Region" and comes first
        assert_eq!(BracketSubstringMatcher.find_column("Region", &cols), Some(0));
    }

    #[test]
    fn test_matcher_is_case_sensitive() {
        let cols = columns(&["[region]"]);
        assert_eq!(BracketSubstringMatcher.find_column("Region", &cols), None);
    }

    #[test]
    fn test_matcher_column_must_contain_filter() {
        // The filter containing the column name is not a match
        let cols = columns(&["Region"]);
        assert_eq!(BracketSubstringMatcher.find_column("Region Name", &cols), None);
    }

    #[test]
    fn test_distinct_values_skips_short_rows() {
        let rows = vec![
            vec![DataValue::new("a"), DataValue::new("x")],
            vec![DataValue::new("b")],
            vec![DataValue::new("c"), DataValue::new("y")],
            vec![DataValue::new("d"), DataValue::new("x")],
        ];
        assert_eq!(distinct_values(&rows, 1), vec!["x", "y"]);
    }

    #[test]
    fn test_distinct_values_scans_at_most_limit() {
        let mut rows: Vec<DataRow> = (0..SCAN_ROW_LIMIT)
            .map(|_| vec![DataValue::new("same")])
            .collect();
        rows.push(vec![DataValue::new("late")]);
        assert_eq!(distinct_values(&rows, 0), vec!["same"]);
    }

    struct LastColumnMatcher;

    impl ColumnMatcher for LastColumnMatcher {
        fn find_column(&self, _: &str, columns: &[ColumnDescriptor]) -> Option<usize> {
            columns.len().checked_sub(1)
        }
    }

    #[test]
    fn test_custom_matcher_is_used() {
        let data = SummaryData {
            columns: columns(&["Region", "Other"]),
            rows: vec![vec![DataValue::new("East"), DataValue::new("Z")]],
        };
        let mut snapshot = FilterSnapshot::new();
        snapshot.insert("Region", crate::model::FilterValue::AllSelected);

        let report =
            Enricher::with_matcher(LastColumnMatcher).enrich_with_data(&mut snapshot, &data);

        assert_eq!(snapshot.get("Region").unwrap().as_values().unwrap(), ["Z"]);
        assert_eq!(
            report.get("Region"),
            Some(&EnrichmentOutcome::Resolved {
                column: "Other".into(),
                count: 1
            })
        );
    }
}
