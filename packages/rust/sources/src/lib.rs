//! External providers behind the DSA topic pipeline.
//!
//! This crate provides:
//! - [`adapters`]: per-provider topic sources (GeeksforGeeks, Take U Forward,
//!   CP-Algorithms, Gemini) behind the [`SourceAdapter`] capability
//! - [`outline`]: sources for the authoritative topic list (Notion database,
//!   public outline page)
//! - [`challenge`]: random coding-challenge picker
//! - [`http`]: the shared HTTP client setup

pub mod adapters;
pub mod challenge;
pub mod http;
pub mod outline;

pub use adapters::{
    CpAlgorithmsAdapter, GeeksforGeeksAdapter, GeminiAdapter, GeminiSettings, PartialRecord,
    SourceAdapter, TakeUForwardAdapter, build_adapters,
};
pub use challenge::{Challenge, ChallengePicker};
pub use http::build_client;
pub use outline::{
    NotionDatabaseOutline, OutlineSource, PublicPageOutline, build_outline_sources,
    format_notion_id,
};
