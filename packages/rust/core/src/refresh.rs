//! The refresh cycle: enumerate → enrich each topic → persist both tables.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use dsamaster_shared::{
    AppConfig, RefreshSettings, ResourceTable, Result, TopicFailurePolicy, TopicRecord,
    TopicTable, canonical_key,
};

use crate::enumerator::{TopicEnumerator, clean_topics};
use crate::merger::Enricher;
use crate::store::TopicStore;

// ---------------------------------------------------------------------------
// Report & progress
// ---------------------------------------------------------------------------

/// What one [`Refresher::refresh_with_report`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// False when the snapshot was still fresh and nothing was done.
    pub ran: bool,
    /// Records written to the topic table.
    pub topics: usize,
    /// Topics whose enrichment failed and got a stub record.
    pub stubbed: usize,
    /// Topics whose enrichment failed and were left out.
    pub skipped: usize,
    pub topics_persisted: bool,
    pub resources_persisted: bool,
    pub elapsed: Duration,
}

impl RefreshReport {
    fn skipped_as_fresh() -> Self {
        Self::default()
    }

    /// Ran, and both tables reached disk.
    pub fn succeeded(&self) -> bool {
        self.ran && self.topics_persisted && self.resources_persisted
    }
}

/// Progress callback for the refresh cycle.
pub trait RefreshProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each topic is enriched.
    fn topic_started(&self, topic: &str, current: usize, total: usize);
    /// Called once at the end, also when the refresh was skipped.
    fn done(&self, report: &RefreshReport);
}

/// No-op progress reporter for background and test usage.
pub struct SilentRefreshProgress;

impl RefreshProgress for SilentRefreshProgress {
    fn phase(&self, _name: &str) {}
    fn topic_started(&self, _topic: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &RefreshReport) {}
}

// ---------------------------------------------------------------------------
// Refresher
// ---------------------------------------------------------------------------

/// Owns everything one refresh cycle needs. Shareable across tasks.
pub struct Refresher {
    enumerator: TopicEnumerator,
    enricher: Arc<Enricher>,
    store: TopicStore,
    settings: RefreshSettings,
}

impl Refresher {
    pub fn new(enumerator: TopicEnumerator, enricher: Enricher, settings: RefreshSettings) -> Self {
        Self {
            store: TopicStore::from_settings(&settings),
            enumerator,
            enricher: Arc::new(enricher),
            settings,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            TopicEnumerator::from_config(config)?,
            Enricher::from_config(config)?,
            RefreshSettings::from(config),
        ))
    }

    pub fn store(&self) -> &TopicStore {
        &self.store
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }

    /// Run a refresh if one is due (or `force`).
    ///
    /// False when skipped as fresh or when either table failed to persist;
    /// [`Self::refresh_with_report`] tells the two apart.
    pub async fn refresh(&self, force: bool) -> bool {
        self.refresh_with_report(force, &SilentRefreshProgress)
            .await
            .succeeded()
    }

    /// Run a refresh if one is due (or `force`) and report what happened.
    ///
    /// Never fails as a whole: outline, adapter, and per-topic failures are
    /// absorbed, and persistence failures show up in the report flags.
    #[instrument(skip_all, fields(force))]
    pub async fn refresh_with_report(
        &self,
        force: bool,
        progress: &dyn RefreshProgress,
    ) -> RefreshReport {
        if !force && self.store.is_fresh(self.settings.staleness) {
            info!(
                path = %self.store.topics_path().display(),
                "snapshot is fresh, skipping refresh"
            );
            let report = RefreshReport::skipped_as_fresh();
            progress.done(&report);
            return report;
        }

        let start = Instant::now();
        info!(adapters = ?self.enricher.adapter_names(), "starting refresh");

        // --- Phase 1: Enumerate ---
        progress.phase("Listing topics");
        let mut topics = clean_topics(self.enumerator.list_topics().await);
        if topics.is_empty() {
            warn!("outline produced no usable topics, using defaults");
            topics = clean_topics(self.enumerator.defaults());
        }

        // --- Phase 2: Enrich ---
        progress.phase("Enriching topics");
        let (topic_table, resource_table, stubbed, skipped) =
            self.build_tables(&topics, progress).await;

        // --- Phase 3: Persist ---
        progress.phase("Writing snapshot");
        let outcome = self.store.persist(&topic_table, &resource_table);

        let report = RefreshReport {
            ran: true,
            topics: topic_table.len(),
            stubbed,
            skipped,
            topics_persisted: outcome.topics,
            resources_persisted: outcome.resources,
            elapsed: start.elapsed(),
        };

        info!(
            topics = report.topics,
            stubbed,
            skipped,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "refresh complete"
        );
        progress.done(&report);
        report
    }

    /// Enrich every topic in order, one at a time.
    ///
    /// Each topic runs on its own task so a panicking adapter only costs that
    /// topic. The task is awaited before the next one starts.
    async fn build_tables(
        &self,
        topics: &[String],
        progress: &dyn RefreshProgress,
    ) -> (TopicTable, ResourceTable, usize, usize) {
        let mut topic_table = TopicTable::new();
        let mut resource_table = ResourceTable::new();
        let mut stubbed = 0;
        let mut skipped = 0;
        let total = topics.len();

        for (i, topic) in topics.iter().enumerate() {
            if i > 0 && !self.settings.inter_topic_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_topic_delay).await;
            }
            progress.topic_started(topic, i + 1, total);

            let enricher = Arc::clone(&self.enricher);
            let owned = topic.clone();
            let task = tokio::spawn(async move { enricher.enrich(&owned).await });

            let record: TopicRecord = match task.await {
                Ok(record) => record,
                Err(e) => {
                    warn!(%topic, error = %e, policy = ?self.settings.on_topic_failure, "topic enrichment failed");
                    match self.settings.on_topic_failure {
                        TopicFailurePolicy::Stub => {
                            stubbed += 1;
                            self.enricher.stub(topic)
                        }
                        TopicFailurePolicy::Skip => {
                            skipped += 1;
                            continue;
                        }
                    }
                }
            };

            // Colliding keys: the later topic replaces the earlier record.
            let key = canonical_key(topic);
            resource_table.insert(key.clone(), record.resource_links.clone());
            topic_table.insert(key, record);
        }

        (topic_table, resource_table, stubbed, skipped)
    }
}
