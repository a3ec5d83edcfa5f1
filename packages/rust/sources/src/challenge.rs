//! Random coding-challenge picker backed by the LeetCode GraphQL catalog.

use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use dsamaster_shared::{ChallengeConfig, DsaMasterError, Result};

const PROBLEM_URL_BASE: &str = "https://leetcode.com/problems";

const QUESTION_LIST_QUERY: &str = r#"
query problemsetQuestionList($limit: Int, $skip: Int) {
  problemsetQuestionList: questionList(limit: $limit, skip: $skip, categorySlug: "", filters: {}) {
    questions: data {
      title
      difficulty
      titleSlug
    }
  }
}
"#;

/// One problem picked from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Challenge {
    pub title: String,
    pub difficulty: String,
    pub url: String,
}

/// Stateless: every call queries the catalog afresh.
pub struct ChallengePicker {
    client: Client,
    endpoint: String,
    limit: u32,
}

impl ChallengePicker {
    pub fn new(client: Client, config: &ChallengeConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            limit: config.limit,
        }
    }

    /// A random problem, or `None` if the catalog could not be read.
    pub async fn pick_random(&self) -> Option<Challenge> {
        match self.fetch_questions().await {
            Ok(questions) => {
                debug!(count = questions.len(), "challenge catalog fetched");
                choose_challenge(&questions)
            }
            Err(e) => {
                warn!(error = %e, "challenge catalog unavailable");
                None
            }
        }
    }

    async fn fetch_questions(&self) -> Result<Vec<Value>> {
        let payload = serde_json::json!({
            "query": QUESTION_LIST_QUERY,
            "variables": { "limit": self.limit, "skip": 0 },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DsaMasterError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DsaMasterError::Source(format!(
                "challenge catalog returned {status}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DsaMasterError::parse(format!("challenge catalog response: {e}")))?;

        Ok(body
            .get("data")
            .and_then(find_question_list)
            .cloned()
            .unwrap_or_default())
    }
}

/// Depth-first search for the first array of objects carrying `titleSlug`.
///
/// The catalog's response shape has drifted over time; the question list is
/// found by content rather than by path.
fn find_question_list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => {
            if items.first().is_some_and(|first| first.get("titleSlug").is_some()) {
                return Some(items);
            }
            items.iter().find_map(find_question_list)
        }
        Value::Object(map) => map.values().find_map(find_question_list),
        _ => None,
    }
}

fn choose_challenge(questions: &[Value]) -> Option<Challenge> {
    let question = questions.choose(&mut rand::thread_rng())?;
    let slug = question.get("titleSlug")?.as_str()?;
    let text = |key: &str| {
        question
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(Challenge {
        title: text("title"),
        difficulty: text("difficulty"),
        url: format!("{PROBLEM_URL_BASE}/{slug}/"),
    })
}
