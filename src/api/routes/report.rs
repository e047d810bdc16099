//! Last processing result, raw and rendered.

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::api::error::{ApiError, ApiResult};
use crate::presenter;

use super::recording::RecordingState;

pub fn router(state: RecordingState) -> Router {
    Router::new()
        .route("/", get(last_report))
        .with_state(state)
}

async fn last_report(State(state): State<RecordingState>) -> ApiResult<Json<Value>> {
    let session = state.controller.status().get().await;

    let Some(result) = session.last_result else {
        return Err(ApiError::not_found("no processing result yet"));
    };

    let report = presenter::render(&result);

    Ok(Json(json!({
        "result": result,
        "rendered": {
            "headline": report.headline,
            "transcript": report.transcript,
            "speakers": report.speaker_overview,
            "analysis": report.analysis,
            "share_enabled": report.share_enabled,
        },
    })))
}
