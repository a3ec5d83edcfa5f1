//! Topic resolution: free-text input → canonical record.
//!
//! The cascade, first success wins:
//! 1. exact canonical key
//! 2. reverse map of re-normalized keys (tolerates keys written by an older normalizer)
//! 3. substring, either direction, in table order
//! 4. closest key by similarity ratio (≥ 0.6)
//!
//! Otherwise the result is [`Resolution::NotFound`] with up to three title
//! suggestions (similarity ≥ 0.4). The ratio is the sequence-matcher one,
//! `2 * matched / (len_a + len_b)` over characters.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use similar::TextDiff;
use tracing::debug;

use dsamaster_shared::{ResourceLink, ResourceTable, TopicRecord, TopicTable, canonical_key};

const CLOSEST_CUTOFF: f64 = 0.6;
const SUGGESTION_CUTOFF: f64 = 0.4;
const MAX_SUGGESTIONS: usize = 3;

/// Which cascade step produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Exact,
    ReverseMap,
    Substring,
    Closest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Found {
        key: &'a str,
        record: &'a TopicRecord,
        strategy: MatchStrategy,
    },
    /// Not an error: the caller shows "did you mean" text.
    NotFound { suggestions: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceLookup<'a> {
    Found {
        key: &'a str,
        title: &'a str,
        links: &'a [ResourceLink],
    },
    NotFound { suggestions: Vec<String> },
}

/// An immutable, fully loaded pair of tables.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    topics: TopicTable,
    resources: ResourceTable,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(topics: TopicTable, resources: ResourceTable) -> Self {
        Self {
            topics,
            resources,
            refreshed_at: None,
        }
    }

    pub fn with_refreshed_at(mut self, refreshed_at: Option<DateTime<Utc>>) -> Self {
        self.refreshed_at = refreshed_at;
        self
    }

    pub fn topics(&self) -> &TopicTable {
        &self.topics
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Resolve user input to a record.
    pub fn resolve(&self, input: &str) -> Resolution<'_> {
        let normalized = canonical_key(input);
        if normalized.is_empty() {
            return Resolution::NotFound {
                suggestions: Vec::new(),
            };
        }

        let found = self
            .exact(&normalized)
            .map(|hit| (hit, MatchStrategy::Exact))
            .or_else(|| self.reverse_map(&normalized).map(|hit| (hit, MatchStrategy::ReverseMap)))
            .or_else(|| self.substring(&normalized).map(|hit| (hit, MatchStrategy::Substring)))
            .or_else(|| self.closest(input).map(|hit| (hit, MatchStrategy::Closest)));

        match found {
            Some(((key, record), strategy)) => {
                debug!(input, key, ?strategy, "topic resolved");
                Resolution::Found {
                    key,
                    record,
                    strategy,
                }
            }
            None => {
                let suggestions = self.suggestions(input);
                debug!(input, suggestions = suggestions.len(), "topic not found");
                Resolution::NotFound { suggestions }
            }
        }
    }

    /// Resolve, then read the resource table at the matched key.
    ///
    /// Falls back to the record's own links if the resource table lacks the
    /// key, which only happens with hand-edited files.
    pub fn resources_for(&self, input: &str) -> ResourceLookup<'_> {
        match self.resolve(input) {
            Resolution::Found { key, record, .. } => {
                let links = self
                    .resources
                    .get(key)
                    .map(Vec::as_slice)
                    .unwrap_or(record.resource_links.as_slice());
                ResourceLookup::Found {
                    key,
                    title: &record.title,
                    links,
                }
            }
            Resolution::NotFound { suggestions } => ResourceLookup::NotFound { suggestions },
        }
    }

    // -- cascade steps --

    fn exact(&self, normalized: &str) -> Option<Hit<'_>> {
        self.topics
            .get_key_value(normalized)
            .map(|(k, v)| (k.as_str(), v))
    }

    fn reverse_map(&self, normalized: &str) -> Option<Hit<'_>> {
        let reverse: HashMap<String, Hit<'_>> = self
            .topics
            .iter()
            .map(|(k, v)| (canonical_key(k), (k.as_str(), v)))
            .collect();
        reverse.get(normalized).copied()
    }

    fn substring(&self, normalized: &str) -> Option<Hit<'_>> {
        self.topics
            .iter()
            .filter(|(k, _)| !k.is_empty())
            .find(|(k, _)| k.contains(normalized) || normalized.contains(k.as_str()))
            .map(|(k, v)| (k.as_str(), v))
    }

    fn closest(&self, input: &str) -> Option<Hit<'_>> {
        let query = input.trim().to_lowercase();
        let candidates = self.topics.iter().map(|(k, v)| (k.as_str(), (k.as_str(), v)));
        best_matches(&query, candidates, CLOSEST_CUTOFF)
            .into_iter()
            .next()
    }

    fn suggestions(&self, input: &str) -> Vec<String> {
        let query = input.trim().to_lowercase();
        let titles = self.topics.values().map(|r| (r.title.as_str(), r.title.as_str()));
        let mut suggestions: Vec<String> = Vec::new();
        for title in best_matches(&query, titles, SUGGESTION_CUTOFF) {
            if !suggestions.iter().any(|s| s == title) {
                suggestions.push(title.to_string());
            }
            if suggestions.len() == MAX_SUGGESTIONS {
                break;
            }
        }
        suggestions
    }
}

/// A table entry: borrowed key and record.
type Hit<'a> = (&'a str, &'a TopicRecord);

/// Items whose text scores at least `cutoff` against `query`, best first.
/// Ties keep iteration order.
fn best_matches<'a, T>(
    query: &str,
    candidates: impl Iterator<Item = (&'a str, T)>,
    cutoff: f64,
) -> Vec<T> {
    let mut scored: Vec<(f64, T)> = candidates
        .map(|(text, item)| (similarity(query, &text.to_lowercase()), item))
        .filter(|(score, _)| *score >= cutoff)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

fn similarity(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_chars(a, b).ratio())
}
