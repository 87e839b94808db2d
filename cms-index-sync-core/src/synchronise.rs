//! High-level pipeline: orchestrates fetch → filter → transform → replace for every collection.
//!
//! This module provides the top-level orchestration for one sync run. For each selected
//! collection of the configured site it:
//!   - Fetches all live items page by page ([`crate::fetch`])
//!   - Keeps only published items, then applies the optional status field ([`crate::filter`])
//!   - Flattens the survivors into plain-text records ([`crate::transform`])
//!   - Fully replaces the collection's index with those records ([`crate::index`])
//!
//! # Error Handling
//! A failure inside one collection is caught here, reported to the observer and recorded as a
//! failed [`CollectionSyncResult`]; the remaining collections still run. Only a failure to list
//! collections aborts the run.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Supporting types: [`SyncReport`], [`CollectionSyncResult`].

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::config::SyncConfig;
use crate::contract::{Collection, ContentSource, SearchIndex};
use crate::error::SyncError;
use crate::observer::SyncObserver;
use crate::{fetch, filter, index, transform};

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub collections_processed: usize,
    pub total_items_synced: usize,
    pub results: Vec<CollectionSyncResult>,
}

impl SyncReport {
    fn from_results(results: Vec<CollectionSyncResult>) -> Self {
        Self {
            collections_processed: results.len(),
            total_items_synced: results.iter().map(CollectionSyncResult::items_synced).sum(),
            results,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &CollectionFailure> {
        self.results.iter().filter_map(|r| match r {
            CollectionSyncResult::Failed(f) => Some(f),
            CollectionSyncResult::Synced(_) => None,
        })
    }
}

/// Outcome for one collection; serialized without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CollectionSyncResult {
    Synced(CollectionSynced),
    Failed(CollectionFailure),
}

impl CollectionSyncResult {
    pub fn collection_name(&self) -> &str {
        match self {
            CollectionSyncResult::Synced(s) => &s.collection_name,
            CollectionSyncResult::Failed(f) => &f.collection_name,
        }
    }

    pub fn items_synced(&self) -> usize {
        match self {
            CollectionSyncResult::Synced(s) => s.items_synced,
            CollectionSyncResult::Failed(_) => 0,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CollectionSyncResult::Synced(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSynced {
    pub collection_name: String,
    pub index_name: String,
    pub items_synced: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFailure {
    pub collection_name: String,
    pub error: String,
}

/// Keep the collections named in `allow_list` (matched on [`Collection::name`]).
/// An empty allow-list keeps everything.
pub fn select_collections(collections: Vec<Collection>, allow_list: &[String]) -> Vec<Collection> {
    if allow_list.is_empty() {
        return collections;
    }
    collections
        .into_iter()
        .filter(|c| allow_list.iter().any(|name| name == c.name()))
        .collect()
}

/// Run the full pipeline for a single collection.
pub async fn sync_collection<S, I, O>(
    config: &SyncConfig,
    source: &S,
    search_index: &I,
    observer: &O,
    collection: &Collection,
) -> Result<CollectionSynced, SyncError>
where
    S: ContentSource + ?Sized,
    I: SearchIndex + ?Sized,
    O: SyncObserver + ?Sized,
{
    let index_name = collection.name().to_string();
    observer.collection_started(collection, &index_name);

    let items = fetch::fetch_all_items(source, &collection.id).await?;
    let fetched = items.len();
    observer.items_fetched(collection, fetched);

    let published = filter::filter_published(items);
    let published_count = published.len();
    observer.published_filtered(collection, published_count, fetched - published_count);

    let kept = filter::filter_by_status_field(published, &config.status_field_name);
    if config.status_filter_enabled() {
        observer.status_filtered(
            collection,
            &config.status_field_name,
            kept.len(),
            published_count - kept.len(),
        );
    }

    let records = transform::transform_items(&kept);
    let items_synced = index::sync_index(search_index, &index_name, &records).await?;
    observer.records_synced(collection, &index_name, items_synced);

    Ok(CollectionSynced {
        collection_name: collection.display_name.clone(),
        index_name,
        items_synced,
    })
}

/// Runs one collection and downgrades any error to a failed result.
async fn sync_or_record<S, I, O>(
    config: &SyncConfig,
    source: &S,
    search_index: &I,
    observer: &O,
    collection: &Collection,
) -> CollectionSyncResult
where
    S: ContentSource + ?Sized,
    I: SearchIndex + ?Sized,
    O: SyncObserver + ?Sized,
{
    match sync_collection(config, source, search_index, observer, collection).await {
        Ok(synced) => CollectionSyncResult::Synced(synced),
        Err(e) => {
            observer.collection_failed(collection, &e);
            CollectionSyncResult::Failed(CollectionFailure {
                collection_name: collection.display_name.clone(),
                error: e.to_string(),
            })
        }
    }
}

/// Entrypoint: synchronise every selected collection of the configured site.
///
/// Collections run up to `config.concurrency` at a time; results keep collection order.
pub async fn synchronise<S, I, O>(
    config: &SyncConfig,
    source: &S,
    search_index: &I,
    observer: &O,
) -> Result<SyncReport, SyncError>
where
    S: ContentSource + ?Sized,
    I: SearchIndex + ?Sized,
    O: SyncObserver + ?Sized,
{
    let all_collections = fetch::list_collections(source, &config.site_id).await?;
    let collections = select_collections(all_collections, &config.collections_to_sync);
    observer.run_started(config, collections.len());

    let pending: Vec<_> = collections
        .iter()
        .map(|collection| sync_or_record(config, source, search_index, observer, collection))
        .collect();
    let results: Vec<CollectionSyncResult> = stream::iter(pending)
        .buffered(config.concurrency.max(1))
        .collect()
        .await;

    let report = SyncReport::from_results(results);
    observer.run_finished(&report);
    Ok(report)
}
