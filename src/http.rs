//! Dashboard REST API
//!
//! Axum router serving the dashboard stub contract: landing, analyze,
//! dashboard lookup and trending topics. Health and metrics are plain JSON.

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use std::{cmp::Ordering, sync::Arc};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::dashboard::{AnalysisRequest, DashboardData, DashboardSource, TrendingTopic};
use crate::error::{NewsProbeError, Result};

const LATENCY_WINDOW: usize = 256;

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<Config>,
    pub source: Arc<dyn DashboardSource>,
    pub metrics: Arc<Mutex<HttpMetrics>>,
}

impl HttpState {
    pub fn new(config: Arc<Config>, source: Arc<dyn DashboardSource>) -> Self {
        Self {
            config,
            source,
            metrics: Arc::new(Mutex::new(HttpMetrics::new())),
        }
    }
}

/// Metrics for HTTP server
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    pub total_requests: u64,
    pub last_request_unix: u64,
    pub errors_total: u64,
    pub analyze_requests: u64,
    pub latencies: Vec<f64>, // ring buffer for p95
}

impl HttpMetrics {
    fn new() -> Self {
        Self {
            total_requests: 0,
            last_request_unix: unix_now(),
            errors_total: 0,
            analyze_requests: 0,
            latencies: Vec::with_capacity(LATENCY_WINDOW),
        }
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Landing endpoint
pub async fn landing_handler(State(state): State<HttpState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": format!("Welcome to the {} API", state.config.server.title),
        "version": state.config.server.version,
    }))
}

/// Accept a url/keyword/hashtag and return dashboard data for a fresh content id
pub async fn analyze_handler(
    State(state): State<HttpState>,
    payload: std::result::Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<DashboardData>> {
    let Json(request) =
        payload.map_err(|e| NewsProbeError::input(format!("malformed request: {}", e.body_text())))?;
    let request = request.normalize()?;
    state.metrics.lock().await.analyze_requests += 1;

    let content_id = state.source.new_content_id();
    tracing::info!(
        "Analyze request url={:?} keyword={:?} hashtag={:?} -> content {}",
        request.url,
        request.keyword,
        request.hashtag,
        content_id
    );
    Ok(Json(state.source.dashboard(&content_id)))
}

pub async fn dashboard_handler(
    State(state): State<HttpState>,
    Path(article_id): Path<String>,
) -> Json<DashboardData> {
    Json(state.source.dashboard(&article_id))
}

pub async fn trending_handler(State(state): State<HttpState>) -> Json<Vec<TrendingTopic>> {
    Json(state.source.trending())
}

/// Metrics endpoint
pub async fn metrics_handler(State(state): State<HttpState>) -> impl IntoResponse {
    let metrics = state.metrics.lock().await.clone();

    let (avg_latency_ms, p95_latency_ms) = if metrics.latencies.is_empty() {
        (None, None)
    } else {
        let sum: f64 = metrics.latencies.iter().sum();
        let avg = sum / metrics.latencies.len() as f64;
        let mut sorted = metrics.latencies.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let p95_idx = ((sorted.len() as f64 * 0.95) as usize).min(sorted.len() - 1);
        (Some(avg), sorted.get(p95_idx).copied())
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "total_requests": metrics.total_requests,
            "analyze_requests": metrics.analyze_requests,
            "last_request_unix": metrics.last_request_unix,
            "errors_total": metrics.errors_total,
            "avg_latency_ms": avg_latency_ms,
            "p95_latency_ms": p95_latency_ms,
        })
        .to_string(),
    )
}

/// Router with every route, CORS and request metrics attached
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(landing_handler))
        .route("/analyze", post(analyze_handler))
        .route("/dashboard/:article_id", get(dashboard_handler))
        .route("/trending", get(trending_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            |State(metrics): State<Arc<Mutex<HttpMetrics>>>,
             req: axum::http::Request<Body>,
             next: axum::middleware::Next| async move {
                let start = std::time::Instant::now();
                let resp = next.run(req).await;
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                let mut m = metrics.lock().await;
                m.latencies.push(latency_ms);
                if m.latencies.len() > LATENCY_WINDOW {
                    m.latencies.remove(0);
                }
                if !resp.status().is_success() {
                    m.errors_total = m.errors_total.saturating_add(1);
                }
                m.total_requests = m.total_requests.saturating_add(1);
                m.last_request_unix = unix_now();
                resp
            },
        ))
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    source: Arc<dyn DashboardSource>,
) -> anyhow::Result<()> {
    let bind = config.server.bind;
    let app = build_router(HttpState::new(config, source));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Starting dashboard API on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
