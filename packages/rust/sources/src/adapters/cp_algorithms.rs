//! CP-Algorithms adapter.
//!
//! The site has no search endpoint of its own, so the article is located
//! through a `site:` web search and the result redirect links are unwrapped.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use dsamaster_shared::{DsaMasterError, ResourceLink, Result};

use super::{PartialRecord, SourceAdapter, element_text, looks_like_cpp, non_empty, truncate_chars};
use crate::http::fetch_html;

const SEARCH_URL: &str = "https://www.google.com/search";
const SITE_PREFIX: &str = "https://cp-algorithms.com/";
const LABEL: &str = "CP-Algorithms";

const THEORY_PARAGRAPHS: usize = 3;
const MAX_THEORY_CHARS: usize = 800;
const MAX_CODE_CHARS: usize = 1500;

pub struct CpAlgorithmsAdapter {
    client: Client,
    search_url: String,
}

impl CpAlgorithmsAdapter {
    pub fn new(client: Client) -> Self {
        Self::with_search_url(client, SEARCH_URL)
    }

    pub fn with_search_url(client: Client, search_url: impl Into<String>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for CpAlgorithmsAdapter {
    fn name(&self) -> &str {
        "cp-algorithms"
    }

    async fn locate(&self, topic: &str) -> Result<Option<String>> {
        let query = format!("site:cp-algorithms.com {topic}");
        let url = Url::parse_with_params(&self.search_url, &[("q", query.as_str())])
            .map_err(|e| DsaMasterError::validation(format!("bad search URL: {e}")))?;
        let html = fetch_html(&self.client, url.as_str()).await?;
        Ok(parse_search_results(&html))
    }

    async fn extract(&self, _topic: &str, reference: &str) -> Result<PartialRecord> {
        let html = fetch_html(&self.client, reference).await?;
        Ok(parse_article(&html, reference))
    }
}

/// First CP-Algorithms article among the search result links.
pub(crate) fn parse_search_results(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("a[href]").unwrap();

    doc.select(&sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(unwrap_result_link)
        .find(|target| target.starts_with(SITE_PREFIX) && target.ends_with(".html"))
}

/// Resolve `/url?q=<target>&...` redirects; absolute links pass through.
fn unwrap_result_link(href: &str) -> Option<String> {
    if href.starts_with("/url?") {
        let base = Url::parse("https://www.google.com").ok()?;
        let redirect = base.join(href).ok()?;
        return redirect
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned());
    }
    href.starts_with("http").then(|| href.to_string())
}

pub(crate) fn parse_article(html: &str, url: &str) -> PartialRecord {
    let doc = Html::parse_document(html);
    let link = vec![ResourceLink::new(LABEL, url)];

    let article_sel = Selector::parse("article").unwrap();
    let Some(article) = doc.select(&article_sel).next() else {
        return PartialRecord {
            links: link,
            ..Default::default()
        };
    };

    let p_sel = Selector::parse("p").unwrap();
    let theory = article
        .select(&p_sel)
        .take(THEORY_PARAGRAPHS)
        .map(|p| element_text(&p))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    // Only the first block is considered; later ones are usually variations.
    let pre_sel = Selector::parse("pre").unwrap();
    let code = article
        .select(&pre_sel)
        .next()
        .map(|pre| pre.text().collect::<String>())
        .filter(|text| looks_like_cpp(text))
        .and_then(non_empty)
        .map(|code| truncate_chars(&code, MAX_CODE_CHARS));

    PartialRecord {
        short: non_empty(truncate_chars(&theory, MAX_THEORY_CHARS)),
        time: None,
        space: None,
        code,
        links: link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::load_fixture;

    #[test]
    fn search_unwraps_redirect_links() {
        let html = load_fixture("google_search.html");
        assert_eq!(
            parse_search_results(&html).as_deref(),
            Some("https://cp-algorithms.com/graph/dijkstra.html")
        );
    }

    #[test]
    fn search_ignores_non_article_pages() {
        let html = r#"<html><body>
            <a href="/url?q=https://cp-algorithms.com/&amp;sa=U">Home</a>
            <a href="https://example.com/dijkstra.html">Elsewhere</a>
        </body></html>"#;
        assert!(parse_search_results(html).is_none());
    }

    #[test]
    fn article_joins_leading_paragraphs() {
        let html = load_fixture("cp_algorithms_article.html");
        let url = "https://cp-algorithms.com/graph/dijkstra.html";
        let partial = parse_article(&html, url);

        let short = partial.short.expect("theory");
        assert!(short.starts_with("You are given a directed or undirected weighted graph"));
        assert!(short.contains("This algorithm is due to Edsger Dijkstra"));
        assert!(!short.contains("Fourth paragraph"));
        assert!(partial.code.expect("code").contains("void dijkstra"));
        assert_eq!(partial.links, [ResourceLink::new("CP-Algorithms", url)]);
    }

    #[test]
    fn article_without_body_still_links() {
        let partial = parse_article(
            "<html><body><p>moved</p></body></html>",
            "https://cp-algorithms.com/x.html",
        );
        assert!(partial.short.is_none());
        assert!(partial.code.is_none());
        assert_eq!(partial.links.len(), 1);
    }

    #[test]
    fn theory_is_capped() {
        let long = "x".repeat(2000);
        let html = format!("<article><p>{long}</p></article>");
        let partial = parse_article(&html, "https://cp-algorithms.com/x.html");
        assert_eq!(partial.short.unwrap().chars().count(), MAX_THEORY_CHARS);
    }

    #[tokio::test]
    async fn locate_sends_site_query() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/search"))
            .and(wiremock::matchers::query_param("q", "site:cp-algorithms.com dijkstra"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(load_fixture("google_search.html")),
            )
            .mount(&server)
            .await;

        let client = crate::http::build_client(std::time::Duration::from_secs(5)).unwrap();
        let adapter = CpAlgorithmsAdapter::with_search_url(client, format!("{}/search", server.uri()));
        assert_eq!(
            adapter.locate("dijkstra").await.unwrap().as_deref(),
            Some("https://cp-algorithms.com/graph/dijkstra.html")
        );
    }
}
