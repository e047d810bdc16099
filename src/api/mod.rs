//! REST API server for meetscribe.
//!
//! Provides HTTP endpoints for:
//! - Recording control (start, stop, status)
//! - File processing
//! - The last processing report

pub mod error;
pub mod routes;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;

use crate::analysis::AnalysisKind;
use crate::session::RecordingController;

pub use routes::recording::RecordingState;

pub struct ApiServer {
    port: u16,
    state: RecordingState,
}

impl ApiServer {
    pub fn new(
        controller: Arc<RecordingController>,
        default_analysis: AnalysisKind,
        port: u16,
    ) -> Self {
        Self {
            port,
            state: RecordingState {
                controller,
                default_analysis,
            },
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = Router::new()
            .route("/", get(service_info))
            .route("/version", get(version))
            .merge(routes::recording::router(self.state.clone()))
            .nest("/report", routes::report::router(self.state))
            .layer(ServiceBuilder::new());

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET  /         - Service info");
        info!("  POST /start    - Start recording");
        info!("  POST /stop     - Stop recording and process");
        info!("  POST /process  - Analyze a pre-recorded file");
        info!("  GET  /status   - Recording status and live transcript");
        info!("  GET  /report   - Last processing report");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "meetscribe",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "meetscribe"
    }))
}
