//! Outline sources: where the authoritative topic list comes from.
//!
//! Each source returns raw, uncleaned text fragments. Cleaning and the
//! default-list fallback belong to the enumerator in the core crate.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use dsamaster_shared::{AppConfig, DsaMasterError, Result, read_secret};

use crate::adapters::element_text;
use crate::http::fetch_html;

const NOTION_VERSION: &str = "2022-06-28";

/// Title properties tried, in order, on each database row.
const TITLE_PROPERTIES: &[&str] = &["Name", "Topic"];

/// Fragments at least this long are prose, not topic names.
const MAX_FRAGMENT_CHARS: usize = 60;
const MAX_FRAGMENT_WORDS: usize = 6;

#[async_trait]
pub trait OutlineSource: Send + Sync {
    fn name(&self) -> &str;

    /// Raw topic strings, in document order.
    async fn fetch_topics(&self) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// Notion database
// ---------------------------------------------------------------------------

/// Queries a Notion database through the public API.
pub struct NotionDatabaseOutline {
    client: Client,
    api_base_url: String,
    token: String,
    database_id: String,
}

impl NotionDatabaseOutline {
    pub fn new(
        client: Client,
        api_base_url: impl Into<String>,
        token: impl Into<String>,
        database_id: &str,
    ) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
            token: token.into(),
            database_id: format_notion_id(database_id),
        }
    }
}

#[async_trait]
impl OutlineSource for NotionDatabaseOutline {
    fn name(&self) -> &str {
        "notion-database"
    }

    async fn fetch_topics(&self) -> Result<Vec<String>> {
        let url = format!(
            "{}/databases/{}/query",
            self.api_base_url.trim_end_matches('/'),
            self.database_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| DsaMasterError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DsaMasterError::Source(format!(
                "Notion query returned {status}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DsaMasterError::parse(format!("Notion response: {e}")))?;

        Ok(parse_database_rows(&body))
    }
}

fn parse_database_rows(body: &Value) -> Vec<String> {
    let Some(rows) = body.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let props = row.get("properties")?;
            TITLE_PROPERTIES.iter().find_map(|prop| {
                let parts = props.get(*prop)?.get("title")?.as_array()?;
                let text: String = parts
                    .iter()
                    .filter_map(|part| part.get("plain_text").and_then(Value::as_str))
                    .collect();
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
        })
        .collect()
}

/// Normalize a Notion id to the dashed 8-4-4-4-12 form.
///
/// Ids copied from a page URL are 32 bare hex digits; anything else is
/// returned trimmed but otherwise unchanged.
pub fn format_notion_id(id: &str) -> String {
    let id = id.trim();
    if id.len() == 32 && id.chars().all(|c| c.is_ascii_hexdigit()) {
        format!(
            "{}-{}-{}-{}-{}",
            &id[..8],
            &id[8..12],
            &id[12..16],
            &id[16..20],
            &id[20..]
        )
    } else {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Public page
// ---------------------------------------------------------------------------

/// Scrapes short headings and list items from a published outline page.
pub struct PublicPageOutline {
    client: Client,
    url: String,
}

impl PublicPageOutline {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl OutlineSource for PublicPageOutline {
    fn name(&self) -> &str {
        "public-page"
    }

    async fn fetch_topics(&self) -> Result<Vec<String>> {
        let html = fetch_html(&self.client, &self.url).await?;
        Ok(parse_outline_page(&html))
    }
}

pub(crate) fn parse_outline_page(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("h1, h2, h3, h4, li, p").unwrap();
    let mut seen = HashSet::new();

    doc.select(&sel)
        .map(|el| element_text(&el))
        .filter(|text| {
            !text.is_empty()
                && text.chars().count() < MAX_FRAGMENT_CHARS
                && text.split_whitespace().count() <= MAX_FRAGMENT_WORDS
        })
        .filter(|text| seen.insert(text.to_lowercase()))
        .collect()
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Outline sources available under this config, in the order to try them.
pub fn build_outline_sources(config: &AppConfig, client: &Client) -> Vec<Box<dyn OutlineSource>> {
    let mut sources: Vec<Box<dyn OutlineSource>> = Vec::new();
    let outline = &config.outline;

    if let Some(database_id) = outline.database_id.as_deref() {
        match read_secret(&outline.token_env) {
            Some(token) => sources.push(Box::new(NotionDatabaseOutline::new(
                client.clone(),
                outline.api_base_url.clone(),
                token,
                database_id,
            ))),
            None => warn!(
                env = %outline.token_env,
                "Notion database configured but token is not set, skipping"
            ),
        }
    }

    if let Some(url) = outline.public_page_url.as_deref() {
        sources.push(Box::new(PublicPageOutline::new(client.clone(), url)));
    }

    debug!(count = sources.len(), "outline sources ready");
    sources
}
