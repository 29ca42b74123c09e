use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::controller::{AnalysisOutcome, Controller, Selection, SessionSnapshot};
use crate::view::ResultPanel;

/// Start the Axum server with the provided configuration.
///
/// History and theme are flushed once more after a graceful shutdown.
pub async fn start_server(config: Arc<AppConfig>, controller: Arc<Controller>) -> anyhow::Result<()> {
    let state = AppState {
        controller: Arc::clone(&controller),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    controller.flush().await;
    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/state", get(api_get_state))
        .route("/api/sentence", put(api_set_sentence))
        .route("/api/analyze", post(api_analyze))
        .route("/api/sample", post(api_sample))
        .route("/api/history", delete(api_clear_history))
        .route("/api/history/{id}", delete(api_remove_history_entry))
        .route("/api/history/{id}/select", post(api_select_history_entry))
        .route("/api/theme/toggle", post(api_toggle_theme))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(name: "server.shutdown", "Shutdown signal received");
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot plus the derived result panel.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
    pub panel: ResultPanel,
    /// How the triggering analysis ended, for analysis intents only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
}

impl SnapshotResponse {
    fn new(snapshot: SessionSnapshot) -> Self {
        let panel = ResultPanel::from_state(&snapshot.state);
        Self {
            snapshot,
            panel,
            outcome: None,
        }
    }
}

async fn respond(controller: &Controller) -> Json<SnapshotResponse> {
    Json(SnapshotResponse::new(controller.snapshot().await))
}

async fn respond_with_outcome(
    controller: &Controller,
    outcome: &AnalysisOutcome,
) -> Json<SnapshotResponse> {
    let mut body = SnapshotResponse::new(controller.snapshot().await);
    body.outcome = Some(outcome_label(outcome));
    Json(body)
}

fn outcome_label(outcome: &AnalysisOutcome) -> &'static str {
    match outcome {
        AnalysisOutcome::Skipped => "skipped",
        AnalysisOutcome::Busy => "busy",
        AnalysisOutcome::Completed(_) => "completed",
        AnalysisOutcome::Failed(_) => "failed",
        AnalysisOutcome::Superseded => "superseded",
    }
}

/// GET /health
async fn health() -> &'static str {
    "ok"
}

/// GET /api/state
async fn api_get_state(State(state): State<AppState>) -> Json<SnapshotResponse> {
    respond(&state.controller).await
}

/// Request body for PUT /api/sentence.
#[derive(Debug, Deserialize)]
struct SetSentenceRequest {
    sentence: String,
}

/// PUT /api/sentence
async fn api_set_sentence(
    State(state): State<AppState>,
    Json(req): Json<SetSentenceRequest>,
) -> Json<SnapshotResponse> {
    state.controller.set_sentence_text(req.sentence).await;
    respond(&state.controller).await
}

/// Request body for POST /api/analyze.
#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    /// Analyze this instead of the current sentence.
    #[serde(default)]
    sentence: Option<String>,
}

/// POST /api/analyze - Runs the analysis and answers once it has finished.
///
/// An empty body analyzes the current sentence.
async fn api_analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SnapshotResponse>, (StatusCode, String)> {
    let sentence = if body.is_empty() {
        None
    } else {
        let req: AnalyzeRequest = serde_json::from_slice(&body)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid request body: {e}")))?;
        req.sentence
    };
    tracing::info!(has_override = sentence.is_some(), "Received analyze request");

    let outcome = state.controller.request_analysis(sentence.as_deref()).await;
    Ok(respond_with_outcome(&state.controller, &outcome).await)
}

/// POST /api/sample
async fn api_sample(State(state): State<AppState>) -> Json<SnapshotResponse> {
    let outcome = state.controller.pick_random_sample().await;
    respond_with_outcome(&state.controller, &outcome).await
}

/// POST /api/history/:id/select
async fn api_select_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.controller.select_history_entry(&id).await {
        Selection::NotFound => Err(StatusCode::NOT_FOUND),
        Selection::Applied | Selection::Busy => Ok(respond(&state.controller).await),
    }
}

/// DELETE /api/history/:id
async fn api_remove_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<SnapshotResponse> {
    state.controller.remove_history_entry(&id).await;
    respond(&state.controller).await
}

/// DELETE /api/history
async fn api_clear_history(State(state): State<AppState>) -> Json<SnapshotResponse> {
    state.controller.clear_history().await;
    respond(&state.controller).await
}

/// POST /api/theme/toggle
async fn api_toggle_theme(State(state): State<AppState>) -> Json<SnapshotResponse> {
    state.controller.toggle_theme().await;
    respond(&state.controller).await
}
