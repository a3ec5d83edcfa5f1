//! Persisted topic snapshot: two JSON artifacts written by atomic rename.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use dsamaster_shared::{DsaMasterError, RefreshSettings, ResourceTable, Result, TopicTable};

use crate::resolver::Snapshot;

/// Which artifacts made it to disk in one [`TopicStore::persist`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    pub topics: bool,
    pub resources: bool,
}

/// Locations of the topic table and resource table files.
#[derive(Debug, Clone)]
pub struct TopicStore {
    topics_path: PathBuf,
    resources_path: PathBuf,
}

impl TopicStore {
    pub fn new(topics_path: impl Into<PathBuf>, resources_path: impl Into<PathBuf>) -> Self {
        Self {
            topics_path: topics_path.into(),
            resources_path: resources_path.into(),
        }
    }

    pub fn from_settings(settings: &RefreshSettings) -> Self {
        Self::new(&settings.topics_path, &settings.resources_path)
    }

    pub fn topics_path(&self) -> &Path {
        &self.topics_path
    }

    pub fn resources_path(&self) -> &Path {
        &self.resources_path
    }

    /// Both artifacts are present.
    pub fn exists(&self) -> bool {
        self.topics_path.is_file() && self.resources_path.is_file()
    }

    /// Last write time of the topic table.
    pub fn last_refreshed(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.topics_path)
            .and_then(|m| m.modified())
            .ok()
    }

    /// Both artifacts exist and the topic table is younger than `staleness`.
    pub fn is_fresh(&self, staleness: Duration) -> bool {
        if !self.exists() {
            return false;
        }
        let Some(modified) = self.last_refreshed() else {
            return false;
        };
        // A timestamp in the future (clock skew) counts as brand new.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        age < staleness
    }

    /// Write both tables. Each file is replaced atomically and independently:
    /// a failure on one is logged and does not prevent the other.
    #[instrument(skip_all, fields(topics = topics.len()))]
    pub fn persist(&self, topics: &TopicTable, resources: &ResourceTable) -> PersistOutcome {
        let topics_ok = match write_json_atomic(&self.topics_path, topics) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %self.topics_path.display(), error = %e, "failed to write topic table");
                false
            }
        };
        let resources_ok = match write_json_atomic(&self.resources_path, resources) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %self.resources_path.display(), error = %e, "failed to write resource table");
                false
            }
        };

        info!(topics_ok, resources_ok, "snapshot persisted");
        PersistOutcome {
            topics: topics_ok,
            resources: resources_ok,
        }
    }

    /// Read the persisted snapshot. `Ok(None)` when either file is missing.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        if !self.exists() {
            debug!(path = %self.topics_path.display(), "no persisted snapshot");
            return Ok(None);
        }

        let topics: TopicTable = read_json(&self.topics_path)?;
        let resources: ResourceTable = read_json(&self.resources_path)?;
        let refreshed_at = self.last_refreshed().map(DateTime::<Utc>::from);

        Ok(Some(Snapshot::new(topics, resources).with_refreshed_at(refreshed_at)))
    }
}

/// Serialize to a sibling temp file, then rename it over `path`.
fn write_json_atomic<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| DsaMasterError::Storage(format!("JSON serialization failed: {e}")))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| DsaMasterError::io(&dir, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| DsaMasterError::validation(format!("not a file path: {}", path.display())))?
        .to_string_lossy();
    let temp = dir.join(format!(".{file_name}.{}.tmp", uuid::Uuid::now_v7()));

    std::fs::write(&temp, json).map_err(|e| DsaMasterError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(DsaMasterError::io(path, e));
    }

    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| DsaMasterError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| DsaMasterError::parse(format!("invalid {}: {e}", path.display())))
}
