//! Dashboard host seam.
//!
//! The dashboard runtime owns worksheets, their applied filters and their
//! rendered summary data. Everything here is read-only: the pipeline asks
//! the host for state and never writes back.
//!
//! ## Usage
//!
//! Production code implements `DashboardHost` over whatever runtime exposes
//! the dashboard. The CLI and the tests use `FixtureDashboard`.

use crate::error::HostError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Host data shapes
// ============================================================================

/// One cell or applied value, in its display-formatted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    pub formatted_value: String,
}

impl DataValue {
    pub fn new(formatted_value: impl Into<String>) -> Self {
        Self {
            formatted_value: formatted_value.into(),
        }
    }
}

/// A filter currently applied to a worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostFilter {
    pub field_name: String,
    #[serde(default)]
    pub is_all_selected: bool,
    #[serde(default)]
    pub applied_values: Vec<DataValue>,
}

impl HostFilter {
    /// A filter with every value selected.
    pub fn all(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            is_all_selected: true,
            applied_values: Vec::new(),
        }
    }

    /// A filter with an explicit selection.
    pub fn selected<S: AsRef<str>>(field_name: impl Into<String>, values: &[S]) -> Self {
        Self {
            field_name: field_name.into(),
            is_all_selected: false,
            applied_values: values.iter().map(|v| DataValue::new(v.as_ref())).collect(),
        }
    }
}

/// One column of a worksheet's summary data. The field name may carry
/// bracket decoration such as `[Region]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub field_name: String,
}

impl ColumnDescriptor {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }
}

/// Cells aligned positionally with the columns.
pub type DataRow = Vec<DataValue>;

/// The rendered tabular data behind a worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryData {
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default, alias = "data")]
    pub rows: Vec<DataRow>,
}

// ============================================================================
// Host trait
// ============================================================================

/// Passed as `max_rows` to request the full dataset.
pub const ALL_ROWS: usize = 0;

/// Trait abstraction over the dashboard runtime.
#[async_trait]
pub trait DashboardHost: Send + Sync {
    /// Names of the worksheets on the current dashboard.
    fn worksheet_names(&self) -> Vec<String>;

    /// Filters currently applied to a worksheet.
    async fn filters(&self, sheet: &str) -> Result<Vec<HostFilter>, HostError>;

    /// Summary data of a worksheet, capped at `max_rows` rows. A cap of
    /// `ALL_ROWS` returns everything.
    async fn summary_data(&self, sheet: &str, max_rows: usize) -> Result<SummaryData, HostError>;
}

// ============================================================================
// View handle
// ============================================================================

/// Handle to one named worksheet that is known to exist on the host.
#[derive(Clone, Copy)]
pub struct View<'a> {
    host: &'a dyn DashboardHost,
    name: &'a str,
}

impl<'a> View<'a> {
    /// Resolve a worksheet by exact name.
    pub fn open(host: &'a dyn DashboardHost, name: &'a str) -> Result<Self, HostError> {
        if host.worksheet_names().iter().any(|n| n == name) {
            Ok(Self { host, name })
        } else {
            Err(HostError::ViewNotFound(name.to_string()))
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub async fn filters(&self) -> Result<Vec<HostFilter>, HostError> {
        self.host.filters(self.name).await
    }

    pub async fn summary_data(&self, max_rows: usize) -> Result<SummaryData, HostError> {
        self.host.summary_data(self.name, max_rows).await
    }
}

impl std::fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View").field("name", &self.name).finish()
    }
}
