use cms_index_sync::webflow::{WebflowClient, WebflowSettings};
use cms_index_sync_core::contract::{ContentSource, PageRequest};
use cms_index_sync_core::fetch::fetch_all_items;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> WebflowClient {
    let mut settings = WebflowSettings::new("secret-token");
    settings.base_url = format!("{}/v2", server.uri());
    WebflowClient::new(settings).expect("client builds")
}

fn items(prefix: &str, count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("{prefix}-{i}"),
                "lastPublished": "2024-01-01T00:00:00.000Z",
                "isDraft": false,
                "isArchived": false,
                "fieldData": { "name": format!("Item {i}") }
            })
        })
        .collect();
    json!({ "items": items, "pagination": { "limit": 100, "offset": 0, "total": count } })
}

#[tokio::test]
async fn lists_collections_of_site_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/sites/site-123/collections"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collections": [
                { "id": "c1", "displayName": "Blog Posts", "slug": "blog-posts", "singularName": "Blog Post" },
                { "id": "c2", "displayName": "Team" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let collections = client_for(&server)
        .list_collections("site-123")
        .await
        .expect("collections listed");

    assert_eq!(collections.len(), 2);
    assert_eq!(collections[0].id, "c1");
    assert_eq!(collections[0].name(), "blog-posts");
    assert_eq!(collections[1].slug, None);
    assert_eq!(collections[1].name(), "Team");
}

#[tokio::test]
async fn requests_live_items_with_offset_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/c1/items/live"))
        .and(query_param("offset", "200"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "i1",
                "createdOn": "2023-05-01T10:00:00.000Z",
                "lastPublished": "2024-01-01T00:00:00.000Z",
                "isDraft": false,
                "fieldData": { "name": "Hello", "body": "<p>World</p>" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .list_live_items("c1", PageRequest { offset: 200, limit: 100 })
        .await
        .expect("page fetched");

    assert_eq!(page.items.len(), 1);
    let item = &page.items[0];
    assert_eq!(item.id, "i1");
    assert_eq!(item.created_on.as_deref(), Some("2023-05-01T10:00:00.000Z"));
    assert_eq!(item.is_draft, Some(false));
    assert_eq!(item.is_archived, None);
    let fields = item.field_data.as_ref().expect("field data present");
    assert_eq!(fields["body"], "<p>World</p>");
}

#[tokio::test]
async fn pages_through_all_live_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/c1/items/live"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items("a", 100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/c1/items/live"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items("b", 12)))
        .expect(1)
        .mount(&server)
        .await;

    let all = fetch_all_items(&client_for(&server), "c1")
        .await
        .expect("all items fetched");

    assert_eq!(all.len(), 112);
    assert_eq!(all[0].id, "a-0");
    assert_eq!(all[111].id, "b-11");
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/sites/site-123/collections"))
        .respond_with(ResponseTemplate::new(401).set_body_string("not authorized"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_collections("site-123")
        .await
        .expect_err("401 must fail");

    let message = err.to_string();
    assert!(message.contains("401"), "unexpected error: {message}");
    assert!(message.contains("not authorized"), "unexpected error: {message}");
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/sites/s/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "collections": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = WebflowSettings::new("t");
    settings.base_url = format!("{}/v2/", server.uri());
    let client = WebflowClient::new(settings).expect("client builds");

    assert!(client.list_collections("s").await.expect("listed").is_empty());
}

#[test]
fn debug_output_hides_the_token() {
    let settings = WebflowSettings::new("super-secret");
    assert!(!format!("{settings:?}").contains("super-secret"));
}
