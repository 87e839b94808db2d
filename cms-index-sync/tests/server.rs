use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use cms_index_sync::server::{build_router, spawn_schedule, AppState, BANNER};
use cms_index_sync_core::config::SyncConfig;
use cms_index_sync_core::contract::{
    Collection, Item, ItemPage, MockContentSource, MockSearchIndex,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn blog() -> Collection {
    Collection {
        id: "c1".into(),
        slug: Some("blog".into()),
        display_name: "Blog".into(),
    }
}

fn published(id: &str) -> Item {
    let mut field_data = serde_json::Map::new();
    field_data.insert("name".into(), json!("<b>Hello</b>"));
    Item {
        id: id.into(),
        field_data: Some(field_data),
        last_published: Some("2024-01-01T00:00:00.000Z".into()),
        is_draft: Some(false),
        is_archived: Some(false),
        ..Default::default()
    }
}

fn healthy_state() -> AppState {
    let mut source = MockContentSource::new();
    source
        .expect_list_collections()
        .returning(|_| Ok(vec![blog()]));
    source.expect_list_live_items().returning(|_, _| {
        Ok(ItemPage {
            items: vec![published("a"), published("b")],
        })
    });

    let mut index = MockSearchIndex::new();
    index
        .expect_replace_all_objects()
        .returning(|name, records| {
            assert_eq!(name, "blog");
            assert_eq!(records.len(), 2);
            Ok(())
        });

    AppState::new(SyncConfig::new("site"), Arc::new(source), Arc::new(index))
}

fn unreachable_state() -> AppState {
    let mut source = MockContentSource::new();
    source
        .expect_list_collections()
        .returning(|_| Err("connection refused".into()));
    let mut index = MockSearchIndex::new();
    index.expect_replace_all_objects().never();

    AppState::new(SyncConfig::new("site"), Arc::new(source), Arc::new(index))
}

/// State whose clients must never be called.
fn idle_state() -> AppState {
    let mut source = MockContentSource::new();
    source.expect_list_collections().never();
    let mut index = MockSearchIndex::new();
    index.expect_replace_all_objects().never();

    AppState::new(SyncConfig::new("site"), Arc::new(source), Arc::new(index))
}

async fn send(state: AppState, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn webhook_runs_sync_and_returns_report() {
    let (status, body) = send(healthy_state(), "POST", "/webhook").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["collectionsProcessed"], 1);
    assert_eq!(json["totalItemsSynced"], 2);
    assert_eq!(
        json["results"][0],
        json!({ "collectionName": "Blog", "indexName": "blog", "itemsSynced": 2 })
    );
    assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn webhook_returns_500_when_run_fails() {
    let (status, body) = send(unreachable_state(), "POST", "/webhook").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("connection refused"));
    assert!(json.get("results").is_none());
}

#[tokio::test]
async fn other_requests_get_banner_without_syncing() {
    for (method, uri) in [("GET", "/"), ("GET", "/webhook"), ("POST", "/other"), ("PUT", "/webhook")] {
        let (status, body) = send(idle_state(), method, uri).await;
        assert_eq!(status, StatusCode::OK, "{method} {uri}");
        assert_eq!(String::from_utf8(body).unwrap(), BANNER, "{method} {uri}");
    }
}

#[tokio::test(start_paused = true)]
async fn schedule_runs_once_per_interval_starting_after_first_interval() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let mut source = MockContentSource::new();
    source.expect_list_collections().times(2).returning(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(vec![])
    });
    let mut index = MockSearchIndex::new();
    index.expect_replace_all_objects().never();
    let state = AppState::new(SyncConfig::new("site"), Arc::new(source), Arc::new(index));

    let handle = spawn_schedule(state, Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(62)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    handle.abort();
    let _ = handle.await;
}
