//! Shared types, error model, and configuration for DSA Master.
//!
//! This crate is the foundation depended on by all other DSA Master crates.
//! It provides:
//! - [`DsaMasterError`]: the unified error type
//! - Domain types ([`TopicRecord`], [`ResourceLink`], [`TopicTable`], [`ResourceTable`])
//! - The key normalizer shared by the store and the resolver ([`canonical_key`])
//! - Configuration ([`AppConfig`], [`RefreshSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AiConfig, AppConfig, ChallengeConfig, EnrichmentConfig, GEMINI_SOURCE, OutlineConfig,
    RefreshSettings, ScheduleConfig, StorageConfig, TopicFailurePolicy, config_dir,
    config_file_path, init_config, load_config, load_config_from, read_secret,
};
pub use error::{DsaMasterError, Result};
pub use types::{ResourceLink, ResourceTable, TopicRecord, TopicTable, canonical_key};
