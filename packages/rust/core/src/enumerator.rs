//! Topic enumeration: the authoritative topic list and its cleanup.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use dsamaster_shared::{AppConfig, Result, canonical_key};
use dsamaster_sources::{OutlineSource, build_client, build_outline_sources};

/// Topics used when no outline source is configured or reachable.
pub const DEFAULT_TOPICS: &[&str] = &[
    "Arrays",
    "Strings",
    "Linked List",
    "Stack",
    "Queue",
    "Hashing",
    "Binary Search",
    "Two Pointers",
    "Sliding Window",
    "Recursion",
    "Backtracking",
    "Sorting",
    "Merge Sort",
    "Quick Sort",
    "Heap",
    "Binary Tree",
    "Binary Search Tree",
    "Trie",
    "Graph",
    "BFS",
    "DFS",
    "Dijkstra's Algorithm",
    "Dynamic Programming",
    "Greedy Algorithms",
    "Bit Manipulation",
    "Segment Tree",
    "Disjoint Set Union",
    "Topological Sort",
];

const MIN_TOPIC_CHARS: usize = 2;
const MAX_TOPIC_CHARS: usize = 50;

/// One leading list marker, checkbox, or ordering number.
///
/// Numbers only count as ordering when followed by `.`, `)`, `:` or a space,
/// so names like "0-1 Knapsack" and "2D Arrays" survive.
static LEADING_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*•·☐☑✅✔]|\[[ xX✓]?\]|\d+[.):]|\d+\s)\s*").expect("valid regex")
});

/// Produces the raw topic list from the configured outline sources.
pub struct TopicEnumerator {
    sources: Vec<Box<dyn OutlineSource>>,
    defaults: Vec<String>,
}

impl TopicEnumerator {
    pub fn new(sources: Vec<Box<dyn OutlineSource>>) -> Self {
        Self {
            sources,
            defaults: DEFAULT_TOPICS.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    /// Replace the built-in default list.
    pub fn with_defaults(mut self, defaults: Vec<String>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = build_client(Duration::from_secs(config.enrichment.request_timeout_secs))?;
        Ok(Self::new(build_outline_sources(config, &client)))
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// Raw topic strings: the first outline source with a non-empty answer,
    /// else the default list. Never fails and never returns an empty list
    /// unless the defaults themselves are empty.
    #[instrument(skip_all, fields(sources = self.sources.len()))]
    pub async fn list_topics(&self) -> Vec<String> {
        for source in &self.sources {
            match source.fetch_topics().await {
                Ok(topics) if !topics.is_empty() => {
                    info!(source = source.name(), count = topics.len(), "topics from outline");
                    return topics;
                }
                Ok(_) => debug!(source = source.name(), "outline source returned no topics"),
                Err(e) => warn!(source = source.name(), error = %e, "outline source failed"),
            }
        }

        info!(count = self.defaults.len(), "using default topic list");
        self.defaults.clone()
    }
}

/// Clean one raw outline fragment into a topic name, or `None` if it is not one.
pub fn clean_topic(raw: &str) -> Option<String> {
    let mut text = raw.trim();
    while let Some(m) = LEADING_MARKUP.find(text) {
        if m.end() == 0 {
            break;
        }
        text = text[m.end()..].trim_start();
    }
    let text = text.trim();

    let len = text.chars().count();
    if !(MIN_TOPIC_CHARS..=MAX_TOPIC_CHARS).contains(&len) {
        return None;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(text.to_string())
}

/// Clean a raw list and drop duplicates by canonical key, keeping first-seen order.
pub fn clean_topics<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|t| clean_topic(t.as_ref()))
        .filter(|t| {
            let key = canonical_key(t);
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dsamaster_shared::DsaMasterError;

    struct FixedOutline(Vec<&'static str>);

    #[async_trait]
    impl OutlineSource for FixedOutline {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn fetch_topics(&self) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct BrokenOutline;

    #[async_trait]
    impl OutlineSource for BrokenOutline {
        fn name(&self) -> &str {
            "broken"
        }
        async fn fetch_topics(&self) -> Result<Vec<String>> {
            Err(DsaMasterError::Network("connection refused".into()))
        }
    }

    #[test]
    fn strips_markers_and_numbering() {
        assert_eq!(clean_topic("  - Arrays ").as_deref(), Some("Arrays"));
        assert_eq!(clean_topic("1. Linked List").as_deref(), Some("Linked List"));
        assert_eq!(clean_topic("12) Heap").as_deref(), Some("Heap"));
        assert_eq!(clean_topic("[x] Binary Search").as_deref(), Some("Binary Search"));
        assert_eq!(clean_topic("☐ Trie").as_deref(), Some("Trie"));
        assert_eq!(clean_topic("- [ ] 3. Graph").as_deref(), Some("Graph"));
    }

    #[test]
    fn keeps_names_that_start_with_digits() {
        assert_eq!(clean_topic("0-1 Knapsack").as_deref(), Some("0-1 Knapsack"));
        assert_eq!(clean_topic("2D Arrays").as_deref(), Some("2D Arrays"));
    }

    #[test]
    fn rejects_noise() {
        assert!(clean_topic("").is_none());
        assert!(clean_topic("x").is_none());
        assert!(clean_topic("2024").is_none());
        assert!(clean_topic("7.").is_none());
        assert!(clean_topic(&"a".repeat(51)).is_none());
        assert!(clean_topic(&"a".repeat(50)).is_some());
    }

    #[test]
    fn dedupes_by_canonical_key() {
        let cleaned = clean_topics([
            "Binary Search",
            "binary-search",
            "1. Stack",
            "BINARY_SEARCH",
            "stack",
            "Queue",
        ]);
        assert_eq!(cleaned, ["Binary Search", "Stack", "Queue"]);
    }

    #[tokio::test]
    async fn first_non_empty_source_wins() {
        let enumerator = TopicEnumerator::new(vec![
            Box::new(BrokenOutline),
            Box::new(FixedOutline(vec![])),
            Box::new(FixedOutline(vec!["Heap", "Trie"])),
            Box::new(FixedOutline(vec!["Graph"])),
        ]);
        assert_eq!(enumerator.list_topics().await, ["Heap", "Trie"]);
    }

    #[tokio::test]
    async fn falls_back_to_defaults() {
        let enumerator = TopicEnumerator::new(vec![Box::new(BrokenOutline)]);
        let topics = enumerator.list_topics().await;
        assert_eq!(topics.len(), DEFAULT_TOPICS.len());
        assert_eq!(topics[0], "Arrays");

        let none = TopicEnumerator::new(Vec::new()).with_defaults(vec!["Stack".into()]);
        assert_eq!(none.list_topics().await, ["Stack"]);
    }

    #[test]
    fn default_list_survives_cleaning() {
        assert_eq!(clean_topics(DEFAULT_TOPICS).len(), DEFAULT_TOPICS.len());
    }
}
