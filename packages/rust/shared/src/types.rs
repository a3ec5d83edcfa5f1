//! Core domain types for the DSA topic knowledge base.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Canonical keys
// ---------------------------------------------------------------------------

/// Normalize a topic string into its table key.
///
/// Lower-cases the input and drops whitespace, hyphens and underscores, so
/// `"Binary Search"`, `"binary-search"` and `"BINARY_SEARCH"` all map to
/// `"binarysearch"`. The store and the resolver must both key through this
/// function.
pub fn canonical_key(topic: &str) -> String {
    topic
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// ResourceLink
// ---------------------------------------------------------------------------

/// A labelled external link. Persisted as a 2-element `[label, url]` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ResourceLink {
    /// Display label (e.g. `GeeksforGeeks`).
    pub label: String,
    /// Target URL.
    pub url: String,
}

impl ResourceLink {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

impl From<(String, String)> for ResourceLink {
    fn from((label, url): (String, String)) -> Self {
        Self { label, url }
    }
}

impl From<ResourceLink> for (String, String) {
    fn from(link: ResourceLink) -> Self {
        (link.label, link.url)
    }
}

// ---------------------------------------------------------------------------
// TopicRecord
// ---------------------------------------------------------------------------

/// One merged topic write-up, stored under its canonical key.
///
/// Empty strings mean "no source supplied this field". `"N/A"` in the
/// complexity fields is a real value (a source said it is unknown).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Display name, defaults to the raw topic string.
    pub title: String,
    /// Prose summary.
    #[serde(rename = "short", default)]
    pub short_description: String,
    #[serde(rename = "time", default)]
    pub time_complexity: String,
    #[serde(rename = "space", default)]
    pub space_complexity: String,
    /// Reference implementation (C++).
    #[serde(rename = "code", default)]
    pub code_sample: String,
    /// Links in source-priority order. Repeats are allowed.
    #[serde(rename = "links", default)]
    pub resource_links: Vec<ResourceLink>,
}

impl TopicRecord {
    /// Empty record carrying only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// `canonicalKey -> TopicRecord`, in insertion order.
pub type TopicTable = IndexMap<String, TopicRecord>;

/// `canonicalKey -> links`, the resource-only projection of a [`TopicTable`].
pub type ResourceTable = IndexMap<String, Vec<ResourceLink>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_ignores_case_and_separators() {
        for variant in ["Binary Search", "binary-search", "BINARY_SEARCH", " binary\tsearch "] {
            assert_eq!(canonical_key(variant), "binarysearch", "variant: {variant:?}");
        }
    }

    #[test]
    fn canonical_key_keeps_other_punctuation() {
        assert_eq!(canonical_key("Dijkstra's Algorithm"), "dijkstra'salgorithm");
        assert_eq!(canonical_key("0-1 Knapsack"), "01knapsack");
    }

    #[test]
    fn record_serializes_with_short_field_names() {
        let record = TopicRecord {
            title: "Binary Search".into(),
            short_description: "Halves the range.".into(),
            time_complexity: "O(log n)".into(),
            space_complexity: "O(1)".into(),
            code_sample: String::new(),
            resource_links: vec![ResourceLink::new(
                "GeeksforGeeks",
                "https://www.geeksforgeeks.org/binary-search/",
            )],
        };

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["short"], "Halves the range.");
        assert_eq!(value["time"], "O(log n)");
        assert_eq!(
            value["links"][0],
            serde_json::json!(["GeeksforGeeks", "https://www.geeksforgeeks.org/binary-search/"])
        );
    }

    #[test]
    fn record_tolerates_missing_fields() {
        let json = r#"{"title": "Heap", "links": [["YouTube - Search", "https://youtube.com"]]}"#;
        let record: TopicRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.title, "Heap");
        assert!(record.code_sample.is_empty());
        assert_eq!(record.resource_links[0].label, "YouTube - Search");
    }

    #[test]
    fn table_preserves_insertion_order() {
        let mut table = TopicTable::new();
        table.insert("stack".into(), TopicRecord::titled("Stack"));
        table.insert("arrays".into(), TopicRecord::titled("Arrays"));

        let json = serde_json::to_string(&table).expect("serialize");
        let parsed: TopicTable = serde_json::from_str(&json).expect("deserialize");
        let keys: Vec<&str> = parsed.keys().map(String::as_str).collect();
        assert_eq!(keys, ["stack", "arrays"]);
    }
}
