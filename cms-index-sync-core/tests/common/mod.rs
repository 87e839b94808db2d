#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cms_index_sync_core::config::SyncConfig;
use cms_index_sync_core::contract::{
    ClientError, Collection, FieldData, Item, ItemPage, MockContentSource, PageRequest, Record,
    SearchIndex,
};
use cms_index_sync_core::error::SyncError;
use cms_index_sync_core::observer::SyncObserver;
use cms_index_sync_core::synchronise::SyncReport;
use serde_json::{json, Value};

pub fn fields(value: Value) -> FieldData {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other:?}"),
    }
}

/// A published, non-draft, non-archived item with a name field.
pub fn live_item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        field_data: Some(fields(json!({ "name": format!("Item {id}") }))),
        created_on: Some("2024-01-01T00:00:00.000Z".to_string()),
        last_published: Some("2024-01-02T00:00:00.000Z".to_string()),
        is_draft: Some(false),
        is_archived: Some(false),
        ..Item::default()
    }
}

pub fn live_items(prefix: &str, count: usize) -> Vec<Item> {
    (0..count).map(|i| live_item(&format!("{prefix}-{i}"))).collect()
}

pub fn collection(id: &str, slug: Option<&str>, display_name: &str) -> Collection {
    Collection {
        id: id.to_string(),
        slug: slug.map(str::to_string),
        display_name: display_name.to_string(),
    }
}

pub fn config(site_id: &str) -> SyncConfig {
    SyncConfig::new(site_id)
}

/// Mock source serving one page per offset from `sizes`; pages past the end are empty.
pub fn paged_source(sizes: Vec<usize>, expected_calls: usize) -> MockContentSource {
    let mut source = MockContentSource::new();
    source
        .expect_list_live_items()
        .times(expected_calls)
        .returning(move |collection_id: &str, page: PageRequest| {
            let index = (page.offset / page.limit) as usize;
            let size = sizes.get(index).copied().unwrap_or(0);
            let items = (0..size)
                .map(|i| live_item(&format!("{collection_id}-{}", page.offset as usize + i)))
                .collect();
            Ok(ItemPage { items })
        });
    source
}

/// In-memory search index keeping the last record set written per index.
#[derive(Default)]
pub struct MemoryIndex {
    pub indexes: Mutex<HashMap<String, Vec<Record>>>,
    pub failing: Vec<String>,
}

impl MemoryIndex {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn contents(&self, index_name: &str) -> Option<Vec<Record>> {
        self.indexes.lock().unwrap().get(index_name).cloned()
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn replace_all_objects(
        &self,
        index_name: &str,
        records: &[Record],
    ) -> Result<(), ClientError> {
        if self.failing.iter().any(|n| n == index_name) {
            return Err(format!("index {index_name} rejected the batch").into());
        }
        self.indexes
            .lock()
            .unwrap()
            .insert(index_name.to_string(), records.to_vec());
        Ok(())
    }
}

/// Observer recording each checkpoint as a short string.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl SyncObserver for RecordingObserver {
    fn run_started(&self, _config: &SyncConfig, selected: usize) {
        self.push(format!("run_started:{selected}"));
    }

    fn collection_started(&self, collection: &Collection, index_name: &str) {
        self.push(format!("started:{}:{index_name}", collection.display_name));
    }

    fn items_fetched(&self, collection: &Collection, count: usize) {
        self.push(format!("fetched:{}:{count}", collection.display_name));
    }

    fn published_filtered(&self, collection: &Collection, kept: usize, excluded: usize) {
        self.push(format!("published:{}:{kept}:{excluded}", collection.display_name));
    }

    fn status_filtered(&self, collection: &Collection, field_name: &str, kept: usize, excluded: usize) {
        self.push(format!(
            "status:{}:{field_name}:{kept}:{excluded}",
            collection.display_name
        ));
    }

    fn records_synced(&self, collection: &Collection, index_name: &str, count: usize) {
        self.push(format!("synced:{}:{index_name}:{count}", collection.display_name));
    }

    fn collection_failed(&self, collection: &Collection, _error: &SyncError) {
        self.push(format!("failed:{}", collection.display_name));
    }

    fn run_finished(&self, report: &SyncReport) {
        self.push(format!("finished:{}", report.total_items_synced));
    }
}
