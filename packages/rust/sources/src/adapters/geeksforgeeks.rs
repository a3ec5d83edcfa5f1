//! GeeksforGeeks adapter.
//!
//! Articles on this site reliably carry "Time Complexity" / "Space
//! Complexity" lines, so this is the primary source for the complexity fields.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use dsamaster_shared::{DsaMasterError, ResourceLink, Result};

use super::{PartialRecord, SourceAdapter, element_text, first_text, looks_like_cpp, non_empty};
use crate::http::fetch_html;

const BASE_URL: &str = "https://www.geeksforgeeks.org";
const LABEL: &str = "GeeksforGeeks";

/// Cap for a single complexity line.
const MAX_COMPLEXITY_CHARS: usize = 200;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)time\s+complexity\s*[:\-]\s*(.+)$").expect("time complexity regex")
});

static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:auxiliary\s+space|space\s+complexity)\s*[:\-]\s*(.+)$")
        .expect("space complexity regex")
});

/// Searches geeksforgeeks.org and scrapes the top article.
pub struct GeeksforGeeksAdapter {
    client: Client,
    base_url: String,
}

impl GeeksforGeeksAdapter {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    /// Point the adapter at another origin (mock servers in tests).
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for GeeksforGeeksAdapter {
    fn name(&self) -> &str {
        "geeksforgeeks"
    }

    async fn locate(&self, topic: &str) -> Result<Option<String>> {
        let search_url = Url::parse_with_params(&format!("{}/", self.base_url), &[("s", topic)])
            .map_err(|e| DsaMasterError::validation(format!("bad search URL: {e}")))?;
        let html = fetch_html(&self.client, search_url.as_str()).await?;
        Ok(parse_search_results(&html))
    }

    async fn extract(&self, _topic: &str, reference: &str) -> Result<PartialRecord> {
        let html = fetch_html(&self.client, reference).await?;
        Ok(parse_article(&html, reference))
    }
}

/// First article link on a search results page.
pub(crate) fn parse_search_results(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let card_sel = Selector::parse("div.g-col-sm-6 a[href*='geeksforgeeks.org/']").unwrap();
    if let Some(href) = doc
        .select(&card_sel)
        .find_map(|a| a.value().attr("href"))
    {
        return Some(href.to_string());
    }

    // Older layout: the title element sits inside the result anchor.
    let title_sel = Selector::parse(".entry-title").unwrap();
    doc.select(&title_sel).find_map(|title| {
        title
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "a")
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    })
}

/// Pull theory, complexities, and C++ code out of an article page.
pub(crate) fn parse_article(html: &str, url: &str) -> PartialRecord {
    let doc = Html::parse_document(html);

    let short = first_text(&doc, "article .content > p");
    let (time, space) = extract_complexities(&doc);

    PartialRecord {
        short,
        time,
        space,
        code: extract_cpp(&doc),
        links: vec![ResourceLink::new(LABEL, url)],
    }
}

fn extract_complexities(doc: &Html) -> (Option<String>, Option<String>) {
    let block_sel = Selector::parse("p, li, h3, h4").unwrap();
    let mut time = None;
    let mut space = None;

    for el in doc.select(&block_sel) {
        let text = element_text(&el);
        if time.is_none() {
            time = TIME_RE
                .captures(&text)
                .and_then(|caps| non_empty(&caps[1]))
                .map(|t| super::truncate_chars(&t, MAX_COMPLEXITY_CHARS));
        }
        if space.is_none() {
            space = SPACE_RE
                .captures(&text)
                .and_then(|caps| non_empty(&caps[1]))
                .map(|s| super::truncate_chars(&s, MAX_COMPLEXITY_CHARS));
        }
        if time.is_some() && space.is_some() {
            break;
        }
    }

    (time, space)
}

/// The `<pre>` following a "C++" heading, else the first C++-looking `<pre>`.
fn extract_cpp(doc: &Html) -> Option<String> {
    let sel = Selector::parse("h2, h3, strong, pre").unwrap();
    let mut after_cpp_heading = false;

    for el in doc.select(&sel) {
        if el.value().name() == "pre" {
            if after_cpp_heading {
                return non_empty(el.text().collect::<String>());
            }
        } else if el.text().collect::<String>().contains("C++") {
            after_cpp_heading = true;
        }
    }

    let pre_sel = Selector::parse("pre").unwrap();
    doc.select(&pre_sel)
        .map(|pre| pre.text().collect::<String>())
        .find(|text| looks_like_cpp(text))
        .and_then(non_empty)
}
