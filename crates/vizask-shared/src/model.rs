//! Filter snapshot model.
//!
//! A snapshot maps each filter field name to either the "(All)" sentinel or
//! a non-empty list of distinct display values. Snapshots are built fresh for
//! every cycle and only the enrichment pass rewrites entries.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// Marker sent to the backend when every value of a filter is selected.
pub const ALL_MARKER: &str = "(All)";

/// Value held by one filter entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    AllSelected,
    Values(Vec<String>),
}

impl FilterValue {
    /// Explicit value list. Duplicates collapse to the first occurrence and an
    /// empty input yields `None`.
    pub fn values<I, S>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for value in values {
            let value = value.into();
            if seen.insert(value.clone()) {
                distinct.push(value);
            }
        }

        if distinct.is_empty() {
            None
        } else {
            Some(FilterValue::Values(distinct))
        }
    }

    pub fn is_all_selected(&self) -> bool {
        matches!(self, FilterValue::AllSelected)
    }

    /// The explicit values, or `None` for the sentinel.
    pub fn as_values(&self) -> Option<&[String]> {
        match self {
            FilterValue::AllSelected => None,
            FilterValue::Values(values) => Some(values),
        }
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::AllSelected => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(ALL_MARKER)?;
                seq.end()
            }
            FilterValue::Values(values) => values.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<String>::deserialize(deserializer)?;
        if values.len() == 1 && values[0] == ALL_MARKER {
            return Ok(FilterValue::AllSelected);
        }
        FilterValue::values(values).ok_or_else(|| D::Error::custom("filter value list is empty"))
    }
}

/// One dashboard state: filter name -> value, in the order the host reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSnapshot {
    entries: IndexMap<String, FilterValue>,
}

impl FilterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. The first occurrence of a name wins; returns `false`
    /// when the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: FilterValue) -> bool {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, value);
        true
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Names of entries still holding the sentinel, in snapshot order.
    pub fn all_selected_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, v)| v.is_all_selected())
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn has_all_selected(&self) -> bool {
        self.entries.values().any(FilterValue::is_all_selected)
    }

    /// Replace a sentinel entry with explicit values. Entries that are not the
    /// sentinel are left alone.
    pub(crate) fn resolve(&mut self, name: &str, values: Vec<String>) -> bool {
        let Some(slot) = self.entries.get_mut(name) else {
            return false;
        };
        if !slot.is_all_selected() {
            return false;
        }
        match FilterValue::values(values) {
            Some(resolved) => {
                *slot = resolved;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_dedupes_in_first_seen_order() {
        let value = FilterValue::values(["West", "East", "West"]).unwrap();
        assert_eq!(value.as_values().unwrap(), ["West", "East"]);
    }

    #[test]
    fn test_values_rejects_empty() {
        assert!(FilterValue::values(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_sentinel_serializes_as_all_marker() {
        let mut snapshot = FilterSnapshot::new();
        snapshot.insert("Region", FilterValue::AllSelected);
        snapshot.insert("Product", FilterValue::values(["A"]).unwrap());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json, json!({"Region": ["(All)"], "Product": ["A"]}));
    }

    #[test]
    fn test_serialization_keeps_host_order() {
        let mut snapshot = FilterSnapshot::new();
        snapshot.insert("Zeta", FilterValue::AllSelected);
        snapshot.insert("Alpha", FilterValue::AllSelected);

        let text = serde_json::to_string(&snapshot).unwrap();
        assert!(text.find("Zeta").unwrap() < text.find("Alpha").unwrap());
    }

    #[test]
    fn test_all_marker_deserializes_to_sentinel() {
        let value: FilterValue = serde_json::from_value(json!(["(All)"])).unwrap();
        assert!(value.is_all_selected());

        let empty: Result<FilterValue, _> = serde_json::from_value(json!([]));
        assert!(empty.is_err());
    }

    #[test]
    fn test_first_insert_wins() {
        let mut snapshot = FilterSnapshot::new();
        assert!(snapshot.insert("Region", FilterValue::AllSelected));
        assert!(!snapshot.insert("Region", FilterValue::values(["East"]).unwrap()));
        assert!(snapshot.get("Region").unwrap().is_all_selected());
    }

    #[test]
    fn test_resolve_only_touches_sentinel() {
        let mut snapshot = FilterSnapshot::new();
        snapshot.insert("Region", FilterValue::AllSelected);
        snapshot.insert("Product", FilterValue::values(["A"]).unwrap());

        assert!(snapshot.resolve("Region", vec!["East".into()]));
        assert!(!snapshot.resolve("Product", vec!["B".into()]));
        assert!(!snapshot.resolve("Missing", vec!["B".into()]));

        assert_eq!(snapshot.get("Region").unwrap().as_values().unwrap(), ["East"]);
        assert_eq!(snapshot.get("Product").unwrap().as_values().unwrap(), ["A"]);
        assert!(!snapshot.has_all_selected());
    }
}
