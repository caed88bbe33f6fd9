//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use mailreach_api::rest::AppState;
use mailreach_api::router;
use mailreach_cache::{RosterCache, RosterCacheSettings};
use mailreach_contacts::{ContactPage, ContactSource, StaticContactSource};
use mailreach_core::types::Contact;
use mailreach_core::{MailreachError, MailreachResult, SystemClock};
use mailreach_segmentation::SegmentationEngine;
use serde_json::Value;
use tower::ServiceExt;

fn roster() -> Vec<Contact> {
    let now = Utc::now();

    let mut star = Contact::new("c-1", "star@example.com", now - Duration::days(10));
    star.tags = vec!["VIP".to_string()];
    star.open_count = 8;
    star.last_opened_at = Some(now - Duration::days(1));

    let mut corp = Contact::new("c-2", "corp@example.com", now - Duration::days(200));
    corp.tags = vec!["Premium".to_string()];

    let fresh = Contact::new("c-3", "fresh@example.com", now - Duration::days(2));

    vec![star, corp, fresh]
}

fn app_over(source: Arc<dyn ContactSource>) -> Router {
    let cache = RosterCache::new(source, Arc::new(SystemClock), RosterCacheSettings::default());
    router(AppState {
        engine: Arc::new(SegmentationEngine::new(Arc::new(cache))),
        node_id: "test-node".to_string(),
        start_time: Instant::now(),
    })
}

fn app() -> Router {
    app_over(Arc::new(StaticContactSource::from_contacts(&roster())))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_list_groups() {
    let (status, json) = send(&app(), get("/v1/contact-groups")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["degraded"].is_null());

    let groups = json["data"].as_array().unwrap();
    let ids: Vec<_> = groups.iter().map(|g| g["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["all", "active", "new", "vip", "engaged", "inactive"]);
    assert_eq!(groups[0]["count"], 3);
    assert_eq!(groups[3]["count"], 2);
}

#[tokio::test]
async fn test_group_contacts_and_unknown_group() {
    let app = app();

    let (status, json) = send(&app, get("/v1/contact-groups/new/contacts")).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, ["star@example.com", "fresh@example.com"]);

    let (status, json) = send(&app, get("/v1/contact-groups/whales/contacts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_recipients_dedupe_and_estimate() {
    let app = app();
    send(&app, get("/v1/contact-groups")).await;

    let (status, json) = send(
        &app,
        post_json(
            "/v1/contact-groups/recipients",
            serde_json::json!({ "groupIds": ["vip", "new"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["emails"].as_array().unwrap().len(), 3);
    assert_eq!(json["data"]["estimatedTotal"], 4);
}

#[tokio::test]
async fn test_recipients_rejects_oversized_request() {
    let ids: Vec<String> = (0..40).map(|i| format!("group-{i}")).collect();
    let (status, json) = send(
        &app(),
        post_json(
            "/v1/contact-groups/recipients",
            serde_json::json!({ "groupIds": ids }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_recipients_request");
}

#[tokio::test]
async fn test_refresh_and_cache_status() {
    let app = app();
    send(&app, get("/v1/contact-groups")).await;

    let (_, status_json) = send(&app, get("/v1/contact-groups/cache")).await;
    assert_eq!(status_json["loaded"], true);
    assert_eq!(status_json["count"], 3);

    let (status, _) = send(&app, post_json("/v1/contact-groups/refresh", Value::Null)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, status_json) = send(&app, get("/v1/contact-groups/cache")).await;
    assert_eq!(
        status_json,
        serde_json::json!({ "loaded": false, "lastFetch": 0, "count": 0 })
    );
}

struct Unreachable;

#[async_trait]
impl ContactSource for Unreachable {
    async fn fetch_page(&self, _page: u32, _limit: u32, _search: &str) -> MailreachResult<ContactPage> {
        Err(MailreachError::Http("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_degraded_groups_still_render() {
    let (status, json) = send(&app_over(Arc::new(Unreachable)), get("/v1/contact-groups")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["degraded"].as_str().unwrap().contains("connection refused"));

    let groups = json["data"].as_array().unwrap();
    assert_eq!(groups.len(), 6);
    assert!(groups.iter().all(|g| g["count"] == 0));
}

#[tokio::test]
async fn test_health() {
    let (status, json) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["node_id"], "test-node");
    assert_eq!(json["roster_loaded"], false);

    let (status, _) = send(&app(), get("/live")).await;
    assert_eq!(status, StatusCode::OK);
}
