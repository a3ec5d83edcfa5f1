//! Topic pipeline and lookup for DSA Master.
//!
//! This crate ties the providers from `dsamaster-sources` into the refresh
//! cycle (enumerate → enrich → persist) and answers lookups against the
//! persisted snapshot.

pub mod enumerator;
pub mod merger;
pub mod refresh;
pub mod resolver;
pub mod store;

pub use enumerator::{DEFAULT_TOPICS, TopicEnumerator, clean_topic, clean_topics};
pub use merger::{Enricher, FallbackLinks};
pub use refresh::{RefreshProgress, RefreshReport, Refresher, SilentRefreshProgress};
pub use resolver::{MatchStrategy, Resolution, ResourceLookup, Snapshot};
pub use store::TopicStore;
