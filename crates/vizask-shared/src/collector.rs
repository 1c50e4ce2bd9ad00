//! Filter collection: reads the applied filters of one view into a snapshot.

use crate::error::HostError;
use crate::host::View;
use crate::model::{FilterSnapshot, FilterValue};
use tracing::{debug, warn};

/// Filters that never describe the data and are skipped by default.
pub const DEFAULT_EXCLUDED_FILTERS: [&str; 3] =
    ["Measure Names", "Metric Name Set", "Filter_Weekend"];

/// Read the filters applied to `view`, skipping every name in `exclusions`.
///
/// All-selected filters become the sentinel; everything else carries the
/// formatted applied values. A filter with nothing applied has no value to
/// carry and is skipped.
pub async fn collect<S: AsRef<str>>(
    view: &View<'_>,
    exclusions: &[S],
) -> Result<FilterSnapshot, HostError> {
    let filters = view.filters().await?;
    debug!(view = view.name(), count = filters.len(), "filters fetched");

    let mut snapshot = FilterSnapshot::new();
    for filter in filters {
        if exclusions.iter().any(|e| e.as_ref() == filter.field_name) {
            debug!(filter = %filter.field_name, "excluded");
            continue;
        }

        let value = if filter.is_all_selected {
            FilterValue::AllSelected
        } else {
            let applied = filter.applied_values.into_iter().map(|v| v.formatted_value);
            match FilterValue::values(applied) {
                Some(value) => value,
                None => {
                    warn!(filter = %filter.field_name, "filter has no applied values, skipping");
                    continue;
                }
            }
        };

        if !snapshot.insert(filter.field_name.clone(), value) {
            warn!(filter = %filter.field_name, "duplicate filter name, keeping first");
        }
    }

    Ok(snapshot)
}
