//! Recording control endpoints.
//!
//! - POST /start    - start a recording
//! - POST /stop     - stop and process the active recording
//! - POST /process  - analyze a pre-recorded file
//! - GET  /status   - current phase and live transcript

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::analysis::AnalysisKind;
use crate::api::error::{ApiError, ApiResult};
use crate::session::RecordingController;

#[derive(Clone)]
pub struct RecordingState {
    pub controller: Arc<RecordingController>,
    pub default_analysis: AnalysisKind,
}

/// Optional request body for stop/process: which analysis to run.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub analysis: Option<AnalysisKind>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessFileRequest {
    pub path: PathBuf,
    #[serde(default)]
    pub analysis: Option<AnalysisKind>,
}

pub fn router(state: RecordingState) -> Router {
    Router::new()
        .route("/start", post(start_recording))
        .route("/stop", post(stop_recording))
        .route("/process", post(process_file))
        .route("/status", get(status))
        .with_state(state)
}

async fn start_recording(State(state): State<RecordingState>) -> ApiResult<Json<Value>> {
    info!("Start recording requested via API");

    state
        .controller
        .start()
        .await
        .map_err(|err| ApiError::conflict(err.to_string()))?;

    Ok(Json(json!({ "success": true, "phase": "recording" })))
}

async fn stop_recording(
    State(state): State<RecordingState>,
    body: Option<Json<AnalysisRequest>>,
) -> ApiResult<Json<Value>> {
    let kind = body
        .and_then(|Json(req)| req.analysis)
        .unwrap_or(state.default_analysis);

    info!("Stop recording requested via API ({})", kind.as_str());

    state
        .controller
        .stop(kind)
        .await
        .map_err(|err| ApiError::conflict(err.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "phase": "processing",
        "analysis": kind.as_str(),
    })))
}

async fn process_file(
    State(state): State<RecordingState>,
    Json(req): Json<ProcessFileRequest>,
) -> ApiResult<Json<Value>> {
    let kind = req.analysis.unwrap_or(state.default_analysis);

    info!(
        "File processing requested via API: {:?} ({})",
        req.path,
        kind.as_str()
    );

    state
        .controller
        .process_file(req.path, kind)
        .await
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "phase": "processing",
        "analysis": kind.as_str(),
    })))
}

async fn status(State(state): State<RecordingState>) -> Json<Value> {
    let session = state.controller.status().get().await;
    let live = state.controller.live_transcript().await;

    Json(json!({
        "phase": session.phase().as_str(),
        "recording_seconds": session.duration_seconds(),
        "live_transcript": live,
        "last_error": session.last_error,
    }))
}
