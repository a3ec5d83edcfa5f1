//! Generative-model adapter backed by the Gemini `generateContent` API.
//!
//! `locate` asks the model for a JSON description of the topic and returns the
//! raw reply text; `extract` parses that reply. Without an API key the adapter
//! stays in the chain but never answers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use dsamaster_shared::{DsaMasterError, GEMINI_SOURCE, ResourceLink, Result};

use super::{PartialRecord, SourceAdapter, non_empty};

/// Connection settings for the model endpoint.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    /// Name of the environment variable the key was read from, for diagnostics.
    pub api_key_env: String,
    pub model: String,
    pub base_url: String,
}

pub struct GeminiAdapter {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiAdapter {
    pub fn new(client: Client, settings: GeminiSettings) -> Self {
        if settings.api_key.is_none() {
            error!(
                env = %settings.api_key_env,
                "model API key is not set; the gemini source will return nothing"
            );
        }
        Self { client, settings }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl SourceAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        GEMINI_SOURCE
    }

    async fn locate(&self, topic: &str) -> Result<Option<String>> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            return Ok(None);
        };

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(topic),
                }],
            }],
        };

        debug!(topic, model = %self.settings.model, "requesting topic description");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| DsaMasterError::Network(format!("model request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DsaMasterError::Source(format!(
                "model API returned {status}: {detail}"
            )));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DsaMasterError::parse(format!("unexpected model response: {e}")))?;

        Ok(reply.first_text())
    }

    async fn extract(&self, _topic: &str, reference: &str) -> Result<PartialRecord> {
        parse_reply(reference)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()
            .and_then(|part| non_empty(part.text))
    }
}

/// The JSON object the prompt asks the model to produce.
#[derive(Debug, Deserialize)]
struct AiTopic {
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    time_complexity: String,
    #[serde(default)]
    space_complexity: String,
    #[serde(default)]
    cpp_code: String,
    #[serde(default)]
    resource_links: Vec<AiLink>,
}

#[derive(Debug, Deserialize)]
struct AiLink {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
}

// ---------------------------------------------------------------------------
// Prompt and reply handling
// ---------------------------------------------------------------------------

fn build_prompt(topic: &str) -> String {
    format!(
        r#"As an expert computer science professor, provide a detailed and accurate guide on the data structure or algorithm: "{topic}".

Your response MUST be a single, valid JSON object. Do not include any text or markdown formatting before or after the JSON object.

The JSON object must have the following structure:
{{
  "title": "The official name of the topic",
  "short_description": "A concise, one-paragraph explanation of what it is, how it works, and its primary use case. Around 3-4 sentences.",
  "time_complexity": "Big O notation for average, best, and worst cases of the major operations, as a simple string.",
  "space_complexity": "Big O notation for the space complexity, as a simple string.",
  "cpp_code": "A clean, commented, complete C++ implementation demonstrating a common use case.",
  "resource_links": [
    {{ "name": "GeeksforGeeks Article", "url": "A direct URL to the most relevant GeeksforGeeks article." }},
    {{ "name": "YouTube Tutorial", "url": "A direct URL to a popular YouTube tutorial on this topic." }},
    {{ "name": "LeetCode Problems", "url": "A direct URL to the LeetCode tag page (e.g. https://leetcode.com/tag/binary-search/)." }}
  ]
}}

The C++ code must be self-contained and ready to compile."#
    )
}

/// Remove Markdown code fences the model wraps around JSON despite instructions.
pub(crate) fn strip_code_fences(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

pub(crate) fn parse_reply(reply: &str) -> Result<PartialRecord> {
    let topic: AiTopic = serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| DsaMasterError::parse(format!("model reply is not valid topic JSON: {e}")))?;

    let links = topic
        .resource_links
        .into_iter()
        .filter(|link| link.url.starts_with("http"))
        .map(|link| {
            let label = non_empty(&link.name).unwrap_or_else(|| link.url.clone());
            ResourceLink::new(&label, &link.url)
        })
        .collect();

    Ok(PartialRecord {
        short: non_empty(topic.short_description),
        time: non_empty(topic.time_complexity),
        space: non_empty(topic.space_complexity),
        code: non_empty(topic.cpp_code),
        links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"```json
{
  "title": "Binary Search",
  "short_description": "Binary search finds an element in a sorted array by halving the range.",
  "time_complexity": "O(log n)",
  "space_complexity": "O(1)",
  "cpp_code": "int bs(vector<int>& a, int x) { return -1; }",
  "resource_links": [
    { "name": "GeeksforGeeks Article", "url": "https://www.geeksforgeeks.org/binary-search/" },
    { "name": "YouTube Tutorial", "url": "https://www.youtube.com/watch?v=abc" },
    { "name": "LeetCode Problems", "url": "not a url" }
  ]
}
```"#;

    fn settings(base_url: &str, api_key: Option<&str>) -> GeminiSettings {
        GeminiSettings {
            api_key: api_key.map(str::to_string),
            api_key_env: "GOOGLE_AI_API_KEY".into(),
            model: "gemini-2.0-flash".into(),
            base_url: base_url.into(),
        }
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn reply_maps_to_partial_record() {
        let partial = parse_reply(REPLY).unwrap();
        assert_eq!(partial.time.as_deref(), Some("O(log n)"));
        assert_eq!(partial.space.as_deref(), Some("O(1)"));
        assert!(partial.code.unwrap().starts_with("int bs"));
        assert_eq!(
            partial.links,
            [
                ResourceLink::new(
                    "GeeksforGeeks Article",
                    "https://www.geeksforgeeks.org/binary-search/"
                ),
                ResourceLink::new("YouTube Tutorial", "https://www.youtube.com/watch?v=abc"),
            ]
        );
    }

    #[test]
    fn partial_reply_leaves_missing_fields_empty() {
        let partial = parse_reply(r#"{"short_description": "Only theory.", "cpp_code": ""}"#).unwrap();
        assert_eq!(partial.short.as_deref(), Some("Only theory."));
        assert!(partial.code.is_none());
        assert!(partial.links.is_empty());
    }

    #[test]
    fn malformed_reply_is_a_parse_error() {
        let err = parse_reply("Sure! Here is your JSON:").unwrap_err();
        assert!(matches!(err, DsaMasterError::Parse { .. }));
    }

    #[tokio::test]
    async fn locate_without_key_returns_none() {
        let client = crate::http::build_client(std::time::Duration::from_secs(5)).unwrap();
        let adapter = GeminiAdapter::new(client, settings("http://127.0.0.1:9", None));
        assert!(adapter.locate("heap").await.unwrap().is_none());
        assert!(adapter.lookup("heap").await.is_none());
    }

    #[tokio::test]
    async fn lookup_round_trips_through_api() {
        let server = wiremock::MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": REPLY }] } }]
        });

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path(
                "/models/gemini-2.0-flash:generateContent",
            ))
            .and(wiremock::matchers::query_param("key", "test-key"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let client = crate::http::build_client(std::time::Duration::from_secs(5)).unwrap();
        let adapter = GeminiAdapter::new(client, settings(&server.uri(), Some("test-key")));
        let partial = adapter.lookup("Binary Search").await.expect("partial");
        assert_eq!(partial.time.as_deref(), Some("O(log n)"));
        assert_eq!(partial.links.len(), 2);
    }

    #[tokio::test]
    async fn api_error_downgrades_to_none() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let client = crate::http::build_client(std::time::Duration::from_secs(5)).unwrap();
        let adapter = GeminiAdapter::new(client, settings(&server.uri(), Some("test-key")));
        assert!(adapter.locate("heap").await.is_err());
        assert!(adapter.lookup("heap").await.is_none());
    }
}
