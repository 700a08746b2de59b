mod rate_limit;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Json, State};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use serde::{Deserialize, Serialize};
use singlish_agents::ChatAgent;
use singlish_core::models::{ChatInput, TrainingSample};
use singlish_core::ResponseComposer;
use singlish_ml::IntentEngine;
use singlish_observability::{AppMetrics, MetricsSnapshot};
use singlish_storage::Store;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rate_limit::IpRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    agent: Arc<ChatAgent<Store>>,
    metrics: Arc<AppMetrics>,
    api_key: String,
    limiter: IpRateLimiter,
}

pub async fn build_app(model_path: Option<PathBuf>) -> Result<Router> {
    let metrics = AppMetrics::shared();

    let store = if let Ok(database_url) = env::var("SINGLISH_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };
    let store = Arc::new(store);

    let engine = Arc::new(IntentEngine::load_or_bootstrap(model_path));
    let agent = Arc::new(ChatAgent::new(
        engine,
        ResponseComposer::from_entropy(),
        store,
        metrics.clone(),
    ));

    let api_key = env::var("SINGLISH_API_KEY").unwrap_or_else(|_| "dev-singlish-key".to_string());
    let rate_limit_window = Duration::from_secs(
        env::var("SINGLISH_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let rate_limit_max = env::var("SINGLISH_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(80);

    let state = ApiState {
        agent,
        metrics,
        api_key,
        limiter: IpRateLimiter::new(rate_limit_window, rate_limit_max),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/predict", post(predict))
        .route("/v1/train", post(train))
        .route("/v1/models/status", get(models_status))
        .route("/v1/analytics", get(analytics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
    models: HealthModels,
}

#[derive(Debug, Serialize)]
struct HealthModels {
    language_classifier: bool,
    intent_engine: &'static str,
    response_composer: bool,
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let status = state.agent.model_status();
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        models: HealthModels {
            language_classifier: true,
            intent_engine: status.strategy,
            response_composer: true,
        },
    };
    (StatusCode::OK, Json(payload))
}

async fn predict(State(state): State<ApiState>, Json(input): Json<ChatInput>) -> Response {
    if input.message.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "empty_message",
                "message": "message must not be blank"
            })),
        )
            .into_response();
    }

    match state.agent.handle_chat(input).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => {
            tracing::error!(%error, "prediction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "prediction_failed",
                    "message": error.to_string()
                })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrainRequest {
    samples: Vec<TrainingSample>,
}

async fn train(State(state): State<ApiState>, Json(request): Json<TrainRequest>) -> Response {
    match state.agent.train(&request.samples) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "training_failed",
                "message": error.to_string()
            })),
        )
            .into_response(),
    }
}

async fn models_status(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.agent.model_status()))
}

async fn analytics(State(state): State<ApiState>) -> Response {
    match state.agent.analytics_summary().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => {
            tracing::error!(%error, "analytics query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "analytics_failed",
                    "message": error.to_string()
                })),
            )
                .into_response()
        }
    }
}

fn is_public_endpoint(path: &str) -> bool {
    path == "/health"
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": "missing or invalid x-api-key"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}
