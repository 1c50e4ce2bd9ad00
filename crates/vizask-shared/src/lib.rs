//! Shared types and the filter pipeline for vizask components.
//!
//! collect -> enrich -> build: read a view's filters, resolve "(All)"
//! sentinels against the rendered data, and shape the backend request.

pub mod collector;
pub mod enrichment;
pub mod error;
pub mod fixture;
pub mod host;
pub mod model;
pub mod payload;

pub use collector::{collect, DEFAULT_EXCLUDED_FILTERS};
pub use enrichment::{
    enrich, BracketSubstringMatcher, ColumnMatcher, Enricher, EnrichmentOutcome,
    EnrichmentReport, DISTINCT_VALUE_CEILING, SCAN_ROW_LIMIT,
};
pub use error::{BuildError, FixtureError, HostError};
pub use fixture::{FixtureDashboard, FixtureWorksheet};
pub use host::{
    ColumnDescriptor, DashboardHost, DataRow, DataValue, HostFilter, SummaryData, View, ALL_ROWS,
};
pub use model::{FilterSnapshot, FilterValue, ALL_MARKER};
pub use payload::{build, validate_question, Mode, Period, RequestMeta, RequestPayload};
