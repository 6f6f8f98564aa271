//! HTTP chat surface
//!
//! A small axum app exposing `POST /api/chat` plus a health probe. The
//! engine is shared behind an `Arc`; handlers never hold state across
//! requests, so the server scales with the runtime's worker threads.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::RagError;
use crate::rag::RagEngine;

/// Request bodies are short chat messages; anything bigger is abuse.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Returned for any non-client failure. Internal detail goes to the log,
/// never to the caller.
const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

// ============================================================================
// State & Wire Types
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RagEngine>,
    started: Instant,
}

impl AppState {
    pub fn new(engine: Arc<RagEngine>) -> Self {
        Self {
            engine,
            started: Instant::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Wrapper so handler `?` can map engine errors onto HTTP responses.
struct ApiError(RagError);

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            RagError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            other => {
                tracing::error!("Chat request failed: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let answer = state.engine.answer(&request.message).await?;
    Ok(Json(ChatResponse { answer }))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}

// ============================================================================
// Router & Serve
// ============================================================================

/// Assemble the application router.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(
    state: AppState,
    allowed_origins: &[String],
    addr: SocketAddr,
) -> anyhow::Result<()> {
    let app = build_router(state, allowed_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Chat API listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install ctrl-c handler: {e}");
    }
}

// ============================================================================
// Tests
// ============================================================================
