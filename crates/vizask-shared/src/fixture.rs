//! In-memory dashboard host loaded from JSON.
//!
//! Fixture format:
//!
//! ```json
//! {
//!   "worksheets": [
//!     {
//!       "name": "Line_Chart",
//!       "filters": [
//!         { "fieldName": "Region", "isAllSelected": true },
//!         { "fieldName": "Product", "appliedValues": [{ "formattedValue": "A" }] }
//!       ],
//!       "summary": {
//!         "columns": [{ "fieldName": "[Region]" }],
//!         "rows": [[{ "formattedValue": "East" }]]
//!       }
//!     }
//!   ]
//! }
//! ```

use crate::error::{FixtureError, HostError};
use crate::host::{
    ColumnDescriptor, DashboardHost, DataValue, HostFilter, SummaryData, ALL_ROWS,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One worksheet of a fixture dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureWorksheet {
    pub name: String,
    #[serde(default)]
    pub filters: Vec<HostFilter>,
    #[serde(default)]
    pub summary: SummaryData,
    /// When set, summary-data requests fail with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_error: Option<String>,
}

impl FixtureWorksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: HostFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn columns<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.summary.columns = names
            .iter()
            .map(|n| ColumnDescriptor::new(n.as_ref()))
            .collect();
        self
    }

    pub fn row<S: AsRef<str>>(mut self, cells: &[S]) -> Self {
        self.summary
            .rows
            .push(cells.iter().map(|c| DataValue::new(c.as_ref())).collect());
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            self.summary
                .rows
                .push(row.into_iter().map(DataValue::new).collect());
        }
        self
    }

    pub fn failing_summary(mut self, message: impl Into<String>) -> Self {
        self.summary_error = Some(message.into());
        self
    }
}

/// Dashboard host backed by fixture data.
#[derive(Debug, Default, Deserialize)]
pub struct FixtureDashboard {
    #[serde(default)]
    worksheets: Vec<FixtureWorksheet>,
    #[serde(skip)]
    filter_fetches: AtomicUsize,
    #[serde(skip)]
    summary_fetches: AtomicUsize,
}

impl FixtureDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worksheet(mut self, worksheet: FixtureWorksheet) -> Self {
        self.worksheets.push(worksheet);
        self
    }

    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Number of filter requests served so far.
    pub fn filter_fetches(&self) -> usize {
        self.filter_fetches.load(Ordering::SeqCst)
    }

    /// Number of summary-data requests served so far.
    pub fn summary_fetches(&self) -> usize {
        self.summary_fetches.load(Ordering::SeqCst)
    }

    fn worksheet(&self, sheet: &str) -> Result<&FixtureWorksheet, HostError> {
        self.worksheets
            .iter()
            .find(|w| w.name == sheet)
            .ok_or_else(|| HostError::ViewNotFound(sheet.to_string()))
    }
}

#[async_trait]
impl DashboardHost for FixtureDashboard {
    fn worksheet_names(&self) -> Vec<String> {
        self.worksheets.iter().map(|w| w.name.clone()).collect()
    }

    async fn filters(&self, sheet: &str) -> Result<Vec<HostFilter>, HostError> {
        self.filter_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.worksheet(sheet)?.filters.clone())
    }

    async fn summary_data(&self, sheet: &str, max_rows: usize) -> Result<SummaryData, HostError> {
        self.summary_fetches.fetch_add(1, Ordering::SeqCst);
        let worksheet = self.worksheet(sheet)?;
        if let Some(message) = &worksheet.summary_error {
            return Err(HostError::Unavailable(message.clone()));
        }

        let mut data = worksheet.summary.clone();
        if max_rows != ALL_ROWS {
            data.rows.truncate(max_rows);
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_row_cap_zero_returns_everything() {
        let host = FixtureDashboard::new().with_worksheet(
            FixtureWorksheet::new("Sheet")
                .columns(&["A"])
                .rows((0..20).map(|i| vec![i.to_string()])),
        );

        assert_eq!(host.summary_data("Sheet", ALL_ROWS).await.unwrap().rows.len(), 20);
        assert_eq!(host.summary_data("Sheet", 5).await.unwrap().rows.len(), 5);
        assert_eq!(host.summary_fetches(), 2);
    }

    #[tokio::test]
    async fn test_unknown_sheet_is_view_not_found() {
        let host = FixtureDashboard::new();
        let err = host.filters("Nope").await.unwrap_err();
        assert!(matches!(err, HostError::ViewNotFound(name) if name == "Nope"));
    }

    #[tokio::test]
    async fn test_failing_summary() {
        let host = FixtureDashboard::new()
            .with_worksheet(FixtureWorksheet::new("Sheet").failing_summary("extract offline"));
        let err = host.summary_data("Sheet", ALL_ROWS).await.unwrap_err();
        assert_eq!(err.to_string(), "Dashboard host error: extract offline");
    }

    #[test]
    fn test_parse_fixture_json() {
        let host = FixtureDashboard::from_json(
            r#"{
                "worksheets": [{
                    "name": "Line_Chart",
                    "filters": [
                        {"fieldName": "Region", "isAllSelected": true},
                        {"fieldName": "Product", "appliedValues": [{"formattedValue": "A"}]}
                    ],
                    "summary": {
                        "columns": [{"fieldName": "[Region]"}],
                        "data": [[{"formattedValue": "East"}]]
                    }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(host.worksheet_names(), vec!["Line_Chart".to_string()]);
        let sheet = host.worksheet("Line_Chart").unwrap();
        assert_eq!(sheet.filters.len(), 2);
        assert!(sheet.filters[0].is_all_selected);
        assert!(!sheet.filters[1].is_all_selected);
        assert_eq!(sheet.summary.rows.len(), 1);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{"worksheets": [{"name": "Line_Chart"}]}"#).unwrap();

        let host = FixtureDashboard::from_path(&path).unwrap();
        assert_eq!(host.worksheet_names(), vec!["Line_Chart".to_string()]);

        let err = FixtureDashboard::from_path(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, FixtureError::Io(_)));

        std::fs::write(&path, "{").unwrap();
        let err = FixtureDashboard::from_path(&path).unwrap_err();
        assert!(matches!(err, FixtureError::Json(_)));
    }
}
