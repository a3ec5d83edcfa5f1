//! Take U Forward adapter: theory paragraph and a C++ snippet.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use dsamaster_shared::{DsaMasterError, ResourceLink, Result};

use super::{PartialRecord, SourceAdapter, first_text, looks_like_cpp, non_empty};
use crate::http::fetch_html;

const BASE_URL: &str = "https://takeuforward.org";
const LABEL: &str = "Take U Forward";

pub struct TakeUForwardAdapter {
    client: Client,
    base_url: String,
}

impl TakeUForwardAdapter {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for TakeUForwardAdapter {
    fn name(&self) -> &str {
        "takeuforward"
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

pub(crate) fn parse_search_results(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let title_sel = Selector::parse("h2.entry-title a[href]").unwrap();
    if let Some(href) = doc.select(&title_sel).find_map(|a| a.value().attr("href")) {
        return Some(href.to_string());
    }

    // Any deep link into the site; the bare homepage (logo, nav) is not a result.
    let any_sel = Selector::parse("a[href*='takeuforward.org']").unwrap();
    doc.select(&any_sel)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| {
            Url::parse(href)
                .map(|u| !u.path().trim_matches('/').is_empty())
                .unwrap_or(false)
        })
        .map(str::to_string)
}

pub(crate) fn parse_article(html: &str, url: &str) -> PartialRecord {
    let doc = Html::parse_document(html);

    let code_sel = Selector::parse("pre, code").unwrap();
    let code = doc
        .select(&code_sel)
        .map(|el| el.text().collect::<String>())
        .find(|text| looks_like_cpp(text))
        .and_then(non_empty);

    PartialRecord {
        short: first_text(&doc, ".entry-content p"),
        time: None,
        space: None,
        code,
        links: vec![ResourceLink::new(LABEL, url)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::load_fixture;

    #[test]
    fn search_prefers_entry_title_links() {
        let html = load_fixture("tuf_search.html");
        assert_eq!(
            parse_search_results(&html).as_deref(),
            Some("https://takeuforward.org/data-structure/implement-stack-using-array/")
        );
    }

    #[test]
    fn search_fallback_skips_homepage_links() {
        let html = r#"<html><body>
            <a href="https://takeuforward.org/">Home</a>
            <a href="https://takeuforward.org/strivers-a2z-dsa-course/">A2Z</a>
        </body></html>"#;
        assert_eq!(
            parse_search_results(html).as_deref(),
            Some("https://takeuforward.org/strivers-a2z-dsa-course/")
        );
    }

    #[test]
    fn article_takes_first_cpp_block() {
        let html = load_fixture("tuf_article.html");
        let url = "https://takeuforward.org/data-structure/implement-stack-using-array/";
        let partial = parse_article(&html, url);

        assert!(partial.short.as_deref().unwrap().starts_with("A stack is a linear data structure"));
        let code = partial.code.expect("cpp code");
        assert!(code.contains("class Stack"));
        assert!(partial.time.is_none());
        assert_eq!(partial.links, [ResourceLink::new("Take U Forward", url)]);
    }

    #[tokio::test]
    async fn lookup_chains_search_and_article() {
        let server = wiremock::MockServer::start().await;
        let article_url = format!("{}/data-structure/stack/", server.uri());
        let search = format!(
            r#"<html><body><h2 class="entry-title"><a href="{article_url}">Stack</a></h2></body></html>"#
        );

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/"))
            .and(wiremock::matchers::query_param("s", "stack"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(search))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/data-structure/stack/"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(load_fixture("tuf_article.html")),
            )
            .mount(&server)
            .await;

        let client = crate::http::build_client(std::time::Duration::from_secs(5)).unwrap();
        let adapter = TakeUForwardAdapter::with_base_url(client, server.uri());
        let partial = adapter.lookup("stack").await.expect("found");
        assert_eq!(partial.links[0].url, article_url);
        assert!(partial.code.is_some());
    }
}
