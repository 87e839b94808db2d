use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Settings for one sync run. Built once at process start and passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Site whose collections are synchronised.
    pub site_id: String,
    /// Optional custom field used as a secondary opt-out gate. Blank disables the filter.
    pub status_field_name: String,
    /// Collection slugs (or display names) to sync. Empty means all collections.
    pub collections_to_sync: Vec<String>,
    /// Maximum number of collections processed at the same time.
    pub concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            site_id: String::new(),
            status_field_name: String::new(),
            collections_to_sync: Vec::new(),
            concurrency: 1,
        }
    }
}

impl SyncConfig {
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            ..Self::default()
        }
    }

    pub fn status_filter_enabled(&self) -> bool {
        !self.status_field_name.trim().is_empty()
    }

    pub fn trace_loaded(&self) {
        info!(
            site_id = %self.site_id,
            status_field = %self.status_field_name,
            collections = ?self.collections_to_sync,
            concurrency = self.concurrency,
            "Loaded SyncConfig"
        );
        debug!(?self, "SyncConfig loaded (full debug)");
    }
}
