//! Progress reporting for sync runs.
//!
//! The orchestrator calls a [`SyncObserver`] at fixed checkpoints instead of logging inline.
//! [`TracingObserver`] turns those checkpoints into structured `tracing` events; tests use
//! their own recording implementation or [`NoopObserver`].

use tracing::{error, info};

use crate::config::SyncConfig;
use crate::contract::Collection;
use crate::error::SyncError;
use crate::synchronise::SyncReport;

/// Checkpoint callbacks. Every method defaults to doing nothing.
pub trait SyncObserver: Send + Sync {
    fn run_started(&self, _config: &SyncConfig, _selected: usize) {}

    fn collection_started(&self, _collection: &Collection, _index_name: &str) {}

    fn items_fetched(&self, _collection: &Collection, _count: usize) {}

    fn published_filtered(&self, _collection: &Collection, _kept: usize, _excluded: usize) {}

    /// Only called when a status field is configured.
    fn status_filtered(
        &self,
        _collection: &Collection,
        _field_name: &str,
        _kept: usize,
        _excluded: usize,
    ) {
    }

    fn records_synced(&self, _collection: &Collection, _index_name: &str, _count: usize) {}

    fn collection_failed(&self, _collection: &Collection, _error: &SyncError) {}

    fn run_finished(&self, _report: &SyncReport) {}
}

/// Ignores every checkpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

/// Logs every checkpoint through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn run_started(&self, config: &SyncConfig, selected: usize) {
        if !config.collections_to_sync.is_empty() {
            info!(collections = ?config.collections_to_sync, "[SYNC] Syncing only specified collections");
        }
        if config.status_filter_enabled() {
            info!(status_field = %config.status_field_name, "[SYNC] Using status field filter");
        }
        info!(selected, "[SYNC] Found collection(s) to sync");
    }

    fn collection_started(&self, collection: &Collection, index_name: &str) {
        info!(
            collection = %collection.display_name,
            collection_id = %collection.id,
            index_name,
            "[SYNC] Syncing collection"
        );
    }

    fn items_fetched(&self, collection: &Collection, count: usize) {
        info!(collection = %collection.display_name, count, "[SYNC] Fetched items from collection");
    }

    fn published_filtered(&self, collection: &Collection, kept: usize, excluded: usize) {
        info!(
            collection = %collection.display_name,
            kept,
            excluded,
            "[SYNC] Filtered to published items"
        );
    }

    fn status_filtered(&self, collection: &Collection, field_name: &str, kept: usize, excluded: usize) {
        info!(
            collection = %collection.display_name,
            field_name,
            kept,
            excluded,
            "[SYNC] Filtered by status field"
        );
    }

    fn records_synced(&self, collection: &Collection, index_name: &str, count: usize) {
        info!(
            collection = %collection.display_name,
            index_name,
            count,
            "[SYNC] Synced records to index"
        );
    }

    fn collection_failed(&self, collection: &Collection, error: &SyncError) {
        error!(
            collection = %collection.display_name,
            error = %error,
            "[SYNC][ERROR] Error syncing collection"
        );
    }

    fn run_finished(&self, report: &SyncReport) {
        info!(
            collections_processed = report.collections_processed,
            total_items_synced = report.total_items_synced,
            failed = report.failures().count(),
            "[SYNC] Sync complete"
        );
    }
}
