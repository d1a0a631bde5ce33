// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and are read-only: the presentation
// layer polls them (or subscribes to the WebSocket feed) and never mutates
// the session.
//
// CORS is configured permissively so a locally served dashboard page can
// reach the API from another origin.
// =============================================================================

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::AppState;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/state", get(full_state))
        .route("/api/v1/series", get(series))
        .route("/api/v1/analysis", get(analysis))
        // ── WebSocket (handled separately in ws module but mounted here) ─
        .route("/api/v1/ws", get(crate::api::ws::ws_handler))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
    ws_clients: usize,
    ws_messages_sent: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
        ws_clients: state.ws_clients.load(Ordering::SeqCst),
        ws_messages_sent: state.ws_sequence_number.load(Ordering::Relaxed),
    };
    Json(resp)
}

// =============================================================================
// Dashboard data
// =============================================================================

async fn full_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.build_snapshot())
}

async fn series(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.chart_points())
}

async fn analysis(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.analysis())
}
