//! Enrichment merger: one topic, many providers, one record.
//!
//! Adapters are visited strictly in priority order. Scalar fields follow
//! first-writer-wins; links are append-only.

use tracing::{debug, instrument};

use dsamaster_shared::{AppConfig, EnrichmentConfig, ResourceLink, Result, TopicRecord};
use dsamaster_sources::{PartialRecord, SourceAdapter, build_adapters};

const YOUTUBE_LABEL: &str = "YouTube - Search";
const LEETCODE_LABEL: &str = "LeetCode - Problems";

/// Provider-independent links appended to every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackLinks {
    pub youtube_search: bool,
    pub leetcode_tag: bool,
}

impl Default for FallbackLinks {
    fn default() -> Self {
        Self {
            youtube_search: true,
            leetcode_tag: true,
        }
    }
}

impl From<&EnrichmentConfig> for FallbackLinks {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            youtube_search: config.youtube_fallback,
            leetcode_tag: config.leetcode_tag_link,
        }
    }
}

impl FallbackLinks {
    /// No fallback links at all.
    pub fn none() -> Self {
        Self {
            youtube_search: false,
            leetcode_tag: false,
        }
    }

    /// The links for `topic`, in display order.
    pub fn links_for(&self, topic: &str) -> Vec<ResourceLink> {
        let mut links = Vec::new();
        if self.youtube_search {
            let query: String = url::form_urlencoded::byte_serialize(topic.as_bytes()).collect();
            links.push(ResourceLink::new(
                YOUTUBE_LABEL,
                format!("https://www.youtube.com/results?search_query={query}"),
            ));
        }
        if self.leetcode_tag {
            links.push(ResourceLink::new(
                LEETCODE_LABEL,
                format!("https://leetcode.com/tag/{}/", tag_slug(topic)),
            ));
        }
        links
    }
}

/// Lowercase, alphanumerics only, runs of anything else collapsed to `-`.
/// Apostrophes are dropped outright ("Dijkstra's" → "dijkstras").
fn tag_slug(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    for c in topic.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if c == '\'' || c == '’' {
            continue;
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Builds a [`TopicRecord`] for one topic from the configured adapters.
pub struct Enricher {
    adapters: Vec<Box<dyn SourceAdapter>>,
    fallback: FallbackLinks,
}

impl Enricher {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, fallback: FallbackLinks) -> Self {
        Self { adapters, fallback }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            build_adapters(config)?,
            FallbackLinks::from(&config.enrichment),
        ))
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Query every adapter in order and merge what they return.
    ///
    /// Never fails: with every adapter down the result is the bare title plus
    /// the fallback links.
    #[instrument(skip(self))]
    pub async fn enrich(&self, topic: &str) -> TopicRecord {
        let mut record = TopicRecord::titled(topic);

        for adapter in &self.adapters {
            match adapter.lookup(topic).await {
                Some(partial) => {
                    debug!(source = adapter.name(), links = partial.links.len(), "merging partial record");
                    merge_partial(&mut record, partial);
                }
                None => debug!(source = adapter.name(), "no data from source"),
            }
        }

        record.resource_links.extend(self.fallback.links_for(topic));
        record
    }

    /// Minimal record for a topic whose enrichment could not complete.
    pub fn stub(&self, topic: &str) -> TopicRecord {
        let mut record = TopicRecord::titled(topic);
        record.resource_links = self.fallback.links_for(topic);
        record
    }
}

/// Fill empty scalar fields from `partial` and append its links.
pub(crate) fn merge_partial(record: &mut TopicRecord, partial: PartialRecord) {
    fill_if_empty(&mut record.short_description, partial.short);
    fill_if_empty(&mut record.time_complexity, partial.time);
    fill_if_empty(&mut record.space_complexity, partial.space);
    fill_if_empty(&mut record.code_sample, partial.code);
    record.resource_links.extend(partial.links);
}

fn fill_if_empty(field: &mut String, value: Option<String>) {
    if field.is_empty() {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            *field = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dsamaster_shared::DsaMasterError;

    /// Returns a fixed partial record.
    struct Fixed {
        name: &'static str,
        partial: PartialRecord,
    }

    #[async_trait]
    impl SourceAdapter for Fixed {
        fn name(&self) -> &str {
            self.name
        }
        async fn locate(&self, topic: &str) -> Result<Option<String>> {
            Ok(Some(topic.to_string()))
        }
        async fn extract(&self, _topic: &str, _reference: &str) -> Result<PartialRecord> {
            Ok(self.partial.clone())
        }
    }

    /// Fails at the locate phase.
    struct Down;

    #[async_trait]
    impl SourceAdapter for Down {
        fn name(&self) -> &str {
            "down"
        }
        async fn locate(&self, _topic: &str) -> Result<Option<String>> {
            Err(DsaMasterError::Network("timed out".into()))
        }
        async fn extract(&self, _topic: &str, _reference: &str) -> Result<PartialRecord> {
            unreachable!("locate always fails")
        }
    }

    fn fixed(name: &'static str, partial: PartialRecord) -> Box<dyn SourceAdapter> {
        Box::new(Fixed { name, partial })
    }

    fn linked(label: &str, url: &str) -> PartialRecord {
        PartialRecord::link_only(label, url)
    }

    #[tokio::test]
    async fn first_writer_wins_per_field() {
        let a = PartialRecord {
            short: Some("x".into()),
            ..Default::default()
        };
        let b = PartialRecord {
            short: Some("y".into()),
            time: Some("O(n)".into()),
            ..Default::default()
        };
        let enricher = Enricher::new(vec![fixed("a", a), fixed("b", b)], FallbackLinks::none());

        let record = enricher.enrich("Arrays").await;
        assert_eq!(record.short_description, "x");
        assert_eq!(record.time_complexity, "O(n)");
        assert_eq!(record.space_complexity, "");
    }

    #[tokio::test]
    async fn links_accumulate_in_priority_order() {
        let mut first = linked("A", "https://a.example/");
        first.short = Some("from a".into());
        let enricher = Enricher::new(
            vec![
                fixed("a", first),
                fixed("b", linked("B", "https://b.example/")),
                fixed("c", linked("C", "https://c.example/")),
            ],
            FallbackLinks::none(),
        );

        let record = enricher.enrich("Stack").await;
        let labels: Vec<_> = record.resource_links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
        assert_eq!(record.short_description, "from a");
    }

    #[tokio::test]
    async fn duplicate_links_are_kept() {
        let enricher = Enricher::new(
            vec![
                fixed("a", linked("GeeksforGeeks", "https://g.example/x")),
                fixed("b", linked("GeeksforGeeks", "https://g.example/x")),
            ],
            FallbackLinks::none(),
        );
        assert_eq!(enricher.enrich("Heap").await.resource_links.len(), 2);
    }

    #[tokio::test]
    async fn total_failure_yields_title_and_fallbacks() {
        let enricher = Enricher::new(vec![Box::new(Down), Box::new(Down)], FallbackLinks::default());

        let record = enricher.enrich("Arrays").await;
        assert_eq!(record.title, "Arrays");
        assert!(record.short_description.is_empty());
        assert!(record.code_sample.is_empty());
        assert_eq!(
            record.resource_links,
            [
                ResourceLink::new(
                    "YouTube - Search",
                    "https://www.youtube.com/results?search_query=Arrays"
                ),
                ResourceLink::new("LeetCode - Problems", "https://leetcode.com/tag/arrays/"),
            ]
        );
    }

    #[tokio::test]
    async fn failing_adapter_does_not_block_later_ones() {
        let enricher = Enricher::new(
            vec![Box::new(Down), fixed("b", linked("B", "https://b.example/"))],
            FallbackLinks::none(),
        );
        assert_eq!(enricher.enrich("Queue").await.resource_links.len(), 1);
    }

    #[tokio::test]
    async fn enrichment_is_deterministic() {
        let partial = PartialRecord {
            short: Some("s".into()),
            time: Some("O(1)".into()),
            space: Some("O(1)".into()),
            code: Some("int main() {}".into()),
            links: vec![ResourceLink::new("L", "https://l.example/")],
        };
        let enricher = Enricher::new(vec![fixed("a", partial)], FallbackLinks::default());

        let first = serde_json::to_string(&enricher.enrich("Trie").await).unwrap();
        let second = serde_json::to_string(&enricher.enrich("Trie").await).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn na_is_a_real_value() {
        let mut record = TopicRecord::titled("Graph");
        merge_partial(
            &mut record,
            PartialRecord {
                time: Some("N/A".into()),
                ..Default::default()
            },
        );
        merge_partial(
            &mut record,
            PartialRecord {
                time: Some("O(V + E)".into()),
                ..Default::default()
            },
        );
        assert_eq!(record.time_complexity, "N/A");
    }

    #[test]
    fn fallback_links_escape_topic() {
        let links = FallbackLinks::default().links_for("Dijkstra's Algorithm");
        assert_eq!(
            links[0].url,
            "https://www.youtube.com/results?search_query=Dijkstra%27s+Algorithm"
        );
        assert_eq!(links[1].url, "https://leetcode.com/tag/dijkstras-algorithm/");
    }

    #[test]
    fn tag_slugs() {
        assert_eq!(tag_slug("Binary Search"), "binary-search");
        assert_eq!(tag_slug("  Two  Pointers "), "two-pointers");
        assert_eq!(tag_slug("Stack & Queue"), "stack-queue");
    }

    #[test]
    fn stub_has_title_and_fallbacks_only() {
        let enricher = Enricher::new(Vec::new(), FallbackLinks::default());
        let stub = enricher.stub("Trie");
        assert_eq!(stub.title, "Trie");
        assert_eq!(stub.resource_links.len(), 2);
        assert!(stub.time_complexity.is_empty());
    }
}
