//! Application configuration for DSA Master.
//!
//! User config lives at `~/.dsamaster/dsamaster.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored in the file, only the names of the env vars that
//! hold them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DsaMasterError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "dsamaster.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".dsamaster";

/// Adapter name that selects the generative-AI source.
pub const GEMINI_SOURCE: &str = "gemini";

// ---------------------------------------------------------------------------
// Config structs (matching dsamaster.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Snapshot locations and freshness.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Source adapters and merge behaviour.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Generative-AI backend settings.
    #[serde(default)]
    pub ai: AiConfig,

    /// Topic outline sources.
    #[serde(default)]
    pub outline: OutlineConfig,

    /// Periodic refresh.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Random challenge catalog.
    #[serde(default)]
    pub challenge: ChallengeConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding both snapshot files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// File name of the topic table.
    #[serde(default = "default_topics_file")]
    pub topics_file: String,

    /// File name of the resource table.
    #[serde(default = "default_resources_file")]
    pub resources_file: String,

    /// A snapshot younger than this is not rebuilt unless forced.
    #[serde(default = "default_staleness_hours")]
    pub staleness_hours: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            topics_file: default_topics_file(),
            resources_file: default_resources_file(),
            staleness_hours: default_staleness_hours(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_topics_file() -> String {
    "dsa_topics.json".into()
}
fn default_resources_file() -> String {
    "resources.json".into()
}
fn default_staleness_hours() -> u64 {
    24
}

/// What to do with a topic whose enrichment task fails outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicFailurePolicy {
    /// Store a minimal record (title + fallback links).
    #[default]
    Stub,
    /// Leave the topic out of this snapshot.
    Skip,
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Adapter names in priority order (first writer wins).
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Pause between topics. Unset means "derive from the primary source".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inter_topic_delay_ms: Option<u64>,

    /// Failure policy for a single topic.
    #[serde(default)]
    pub on_topic_failure: TopicFailurePolicy,

    /// Append a YouTube search link to every topic.
    #[serde(default = "default_true")]
    pub youtube_fallback: bool,

    /// Append a LeetCode tag link to every topic.
    #[serde(default = "default_true")]
    pub leetcode_tag_link: bool,

    /// Timeout for scraper HTTP requests.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            inter_topic_delay_ms: None,
            on_topic_failure: TopicFailurePolicy::default(),
            youtube_fallback: true,
            leetcode_tag_link: true,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_sources() -> Vec<String> {
    vec![
        "geeksforgeeks".into(),
        "takeuforward".into(),
        "cp-algorithms".into(),
    ]
}
fn default_true() -> bool {
    true
}
fn default_request_timeout() -> u64 {
    15
}

/// `[ai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for topic generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL.
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,

    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,

    /// Pause between topics when the AI source is primary (upstream rate limits).
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_ai_base_url(),
            timeout_secs: default_ai_timeout(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

fn default_api_key_env() -> String {
    "GOOGLE_AI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_ai_timeout() -> u64 {
    60
}
fn default_pacing_ms() -> u64 {
    8_000
}

/// `[outline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineConfig {
    /// Name of the env var holding the Notion integration token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Notion database listing the topics (32-hex or dashed UUID form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,

    /// Public outline page scraped when the database is unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_page_url: Option<String>,

    /// Notion API base URL.
    #[serde(default = "default_notion_api_url")]
    pub api_base_url: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            database_id: None,
            public_page_url: None,
            api_base_url: default_notion_api_url(),
        }
    }
}

fn default_token_env() -> String {
    "NOTION_TOKEN".into()
}
fn default_notion_api_url() -> String {
    "https://api.notion.com/v1".into()
}

/// `[schedule]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Interval between background refreshes in `serve` mode.
    #[serde(default = "default_update_interval")]
    pub update_interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            update_interval_minutes: default_update_interval(),
        }
    }
}

fn default_update_interval() -> u64 {
    1440
}

/// `[challenge]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// GraphQL endpoint of the problem catalog.
    #[serde(default = "default_challenge_endpoint")]
    pub endpoint: String,

    /// Number of problems fetched per pick.
    #[serde(default = "default_challenge_limit")]
    pub limit: u32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_challenge_endpoint(),
            limit: default_challenge_limit(),
        }
    }
}

fn default_challenge_endpoint() -> String {
    "https://leetcode.com/graphql".into()
}
fn default_challenge_limit() -> u32 {
    50
}

// ---------------------------------------------------------------------------
// Refresh settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime refresh configuration, derived once from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    /// Path of the topic table file.
    pub topics_path: PathBuf,
    /// Path of the resource table file.
    pub resources_path: PathBuf,
    /// Snapshot age after which a refresh is due.
    pub staleness: Duration,
    /// Pause inserted between consecutive topics.
    pub inter_topic_delay: Duration,
    /// What to do when a topic fails outright.
    pub on_topic_failure: TopicFailurePolicy,
}

impl From<&AppConfig> for RefreshSettings {
    fn from(config: &AppConfig) -> Self {
        let data_dir = PathBuf::from(&config.storage.data_dir);
        let ai_primary = config
            .enrichment
            .sources
            .first()
            .is_some_and(|s| s.eq_ignore_ascii_case(GEMINI_SOURCE));
        let delay_ms = config
            .enrichment
            .inter_topic_delay_ms
            .unwrap_or(if ai_primary { config.ai.pacing_ms } else { 0 });

        Self {
            topics_path: data_dir.join(&config.storage.topics_file),
            resources_path: data_dir.join(&config.storage.resources_file),
            staleness: Duration::from_secs(config.storage.staleness_hours.saturating_mul(3600)),
            inter_topic_delay: Duration::from_millis(delay_ms),
            on_topic_failure: config.enrichment.on_topic_failure,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.dsamaster/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DsaMasterError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.dsamaster/dsamaster.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DsaMasterError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DsaMasterError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DsaMasterError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DsaMasterError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DsaMasterError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a secret from the named env var. Empty values count as unset.
pub fn read_secret(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}
