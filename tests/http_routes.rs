use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use newsprobe::config::Config;
use newsprobe::dashboard::RandomDashboardSource;
use newsprobe::http::{HttpState, build_router};

fn app() -> Router {
    let state = HttpState::new(
        Arc::new(Config::default()),
        Arc::new(RandomDashboardSource::seeded(2024)),
    );
    build_router(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn landing_reports_version() {
    let (status, body) = send(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(
        body["message"],
        "Welcome to the Misinformation Analysis Dashboard API"
    );
}

#[tokio::test]
async fn trending_returns_six_topics() {
    let (status, body) = send(app(), get("/trending")).await;
    assert_eq!(status, StatusCode::OK);
    let topics = body.as_array().unwrap();
    assert_eq!(topics.len(), 6);
    assert_eq!(topics[0]["id"], 1);
    assert_eq!(topics[5]["title"], "Trending Topic 6");
}

#[tokio::test]
async fn analyze_without_fields_is_bad_request() {
    let (status, body) = send(app(), post_json("/analyze", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("At least one of url, keyword, or hashtag")
    );

    let (status, _) = send(
        app(),
        post_json("/analyze", json!({"url": "", "keyword": "", "hashtag": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analyze_malformed_body_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn analyze_returns_dashboard_for_new_content() {
    let (status, body) = send(
        app(),
        post_json("/analyze", json!({"url": "news.example/story"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let id: u32 = body["article"]["article_id"].as_str().unwrap().parse().unwrap();
    assert!((1000..=9999).contains(&id));

    let m = &body["score_metric"];
    let sum = m["source_score"].as_u64().unwrap()
        + m["language_score"].as_u64().unwrap()
        + m["coordination_score"].as_u64().unwrap()
        + m["bot_activity_score"].as_u64().unwrap();
    assert_eq!(m["average_score"].as_u64().unwrap(), sum / 4);
}

#[tokio::test]
async fn dashboard_echoes_article_id() {
    let (status, body) = send(app(), get("/dashboard/article-42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["article_id"], "article-42");
    assert_eq!(
        body["article"]["hyperlink"],
        "https://news-site.com/articles/article-42"
    );
    assert_eq!(
        body["language_score"]["time_series_data"]
            .as_array()
            .unwrap()
            .len(),
        30
    );
    assert!(body["coordination_score"]["network_data"]["nodes"].is_array());
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/trending")
        .header(header::ORIGIN, "https://dashboard.example")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn metrics_count_requests() {
    let state = HttpState::new(
        Arc::new(Config::default()),
        Arc::new(RandomDashboardSource::seeded(1)),
    );
    let router = build_router(state);
    let (status, _) = send(router.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, _) = send(router.clone(), post_json("/analyze", json!({}))).await;

    let (status, body) = send(router, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_requests"], 2);
    assert_eq!(body["errors_total"], 1);
}
