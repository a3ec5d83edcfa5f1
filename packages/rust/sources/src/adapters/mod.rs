//! Topic source adapters.
//!
//! Every provider answers the same question ("what do you know about this
//! topic?") in two phases: [`SourceAdapter::locate`] finds the most relevant
//! external resource, [`SourceAdapter::extract`] pulls a [`PartialRecord`] out
//! of it. [`SourceAdapter::lookup`] chains the two and never fails: any error
//! is logged and reported as "nothing found".

mod cp_algorithms;
mod geeksforgeeks;
mod gemini;
mod takeuforward;

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use dsamaster_shared::{AppConfig, GEMINI_SOURCE, ResourceLink, Result, read_secret};

use crate::http::build_client;

pub use cp_algorithms::CpAlgorithmsAdapter;
pub use geeksforgeeks::GeeksforGeeksAdapter;
pub use gemini::{GeminiAdapter, GeminiSettings};
pub use takeuforward::TakeUForwardAdapter;

// ---------------------------------------------------------------------------
// Partial record
// ---------------------------------------------------------------------------

/// The subset of topic fields one provider could supply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub short: Option<String>,
    pub time: Option<String>,
    pub space: Option<String>,
    pub code: Option<String>,
    /// Links contributed by this provider, in the provider's own order.
    pub links: Vec<ResourceLink>,
}

impl PartialRecord {
    /// A record carrying nothing but one link.
    pub fn link_only(label: &str, url: &str) -> Self {
        Self {
            links: vec![ResourceLink::new(label, url)],
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Capability shared by every topic provider.
///
/// The merger holds an ordered list of these and never needs to know the
/// concrete provider.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Human-readable adapter name for tracing.
    fn name(&self) -> &str;

    /// Find the provider resource for `topic`, or `None` if there is none.
    ///
    /// The reference is opaque to callers: a page URL for scrapers, the raw
    /// model reply for generative sources.
    async fn locate(&self, topic: &str) -> Result<Option<String>>;

    /// Pull topic fields out of a located reference.
    async fn extract(&self, topic: &str, reference: &str) -> Result<PartialRecord>;

    /// Locate then extract, downgrading every failure to `None`.
    async fn lookup(&self, topic: &str) -> Option<PartialRecord> {
        let reference = match self.locate(topic).await {
            Ok(Some(reference)) => reference,
            Ok(None) => {
                debug!(source = self.name(), topic, "no matching resource");
                return None;
            }
            Err(e) => {
                warn!(source = self.name(), topic, error = %e, "source lookup failed");
                return None;
            }
        };

        match self.extract(topic, &reference).await {
            Ok(partial) => Some(partial),
            Err(e) => {
                warn!(source = self.name(), topic, error = %e, "source extraction failed");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Build the configured adapters, in the configured priority order.
///
/// Unknown names are logged and skipped so a typo in the config thins the
/// records instead of stopping the refresh.
pub fn build_adapters(config: &AppConfig) -> Result<Vec<Box<dyn SourceAdapter>>> {
    let client = build_client(Duration::from_secs(config.enrichment.request_timeout_secs))?;
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();

    for name in &config.enrichment.sources {
        match name.to_ascii_lowercase().as_str() {
            "geeksforgeeks" | "gfg" => {
                adapters.push(Box::new(GeeksforGeeksAdapter::new(client.clone())));
            }
            "takeuforward" | "tuf" => {
                adapters.push(Box::new(TakeUForwardAdapter::new(client.clone())));
            }
            "cp-algorithms" | "cpalgorithms" => {
                adapters.push(Box::new(CpAlgorithmsAdapter::new(client.clone())));
            }
            GEMINI_SOURCE => {
                let ai_client = build_client(Duration::from_secs(config.ai.timeout_secs))?;
                let settings = GeminiSettings {
                    api_key: read_secret(&config.ai.api_key_env),
                    api_key_env: config.ai.api_key_env.clone(),
                    model: config.ai.model.clone(),
                    base_url: config.ai.base_url.clone(),
                };
                adapters.push(Box::new(GeminiAdapter::new(ai_client, settings)));
            }
            other => warn!(source = other, "unknown source adapter in config, skipping"),
        }
    }

    debug!(
        adapters = ?adapters.iter().map(|a| a.name()).collect::<Vec<_>>(),
        "source adapters ready"
    );
    Ok(adapters)
}

// ---------------------------------------------------------------------------
// Extraction helpers shared by the scrapers
// ---------------------------------------------------------------------------

/// Heuristic: does this snippet look like C++?
pub(crate) fn looks_like_cpp(text: &str) -> bool {
    ["#include", "int main", "using namespace std", "std::"]
        .iter()
        .any(|marker| text.contains(marker))
}

/// Whitespace-collapsed text content of an element.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first element matching `selector`, if non-empty.
pub(crate) fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .map(|el| element_text(&el))
        .find(|t| !t.is_empty())
}

/// Cut `text` to at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// `Some(trimmed)` unless the string is blank.
pub(crate) fn non_empty(text: impl AsRef<str>) -> Option<String> {
    let trimmed = text.as_ref().trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
pub(crate) fn load_fixture(name: &str) -> String {
    let path = format!("../../../fixtures/html/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
}
