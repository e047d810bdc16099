use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::api::ApiServer;
use crate::analysis::{AnalysisOptions, ChatAnalysisClient};
use crate::capture::{CaptureSession, MicInput};
use crate::config::Config;
use crate::global;
use crate::processing::{Orchestrator, OrchestratorConfig};
use crate::recognition::{NullEngine, RecognitionSession};
use crate::session::{BehaviorOptions, RecordingController, SessionStatusHandle};
use crate::share::ClipboardService;
use crate::transcription::{RemoteTranscriptionBackend, TranscribeOptions};

pub async fn run_service() -> Result<()> {
    info!("Starting meetscribe service");

    let config = Config::load()?;
    let orchestrator = build_orchestrator(&config)?;

    let capture = CaptureSession::new(
        Box::new(MicInput::new(config.capture.sample_rate)),
        config.capture.chunk_seconds,
    );

    // No platform recognition engine is bundled; injecting one here
    // enables the live transcript. NullEngine degrades to capture-only
    // mode and warns once.
    let recognition = RecognitionSession::new(
        Box::new(NullEngine),
        Duration::from_millis(config.recognition.restart_delay_ms),
    );

    let controller = Arc::new(RecordingController::new(
        capture,
        recognition,
        orchestrator,
        SessionStatusHandle::default(),
        ClipboardService::new(),
        BehaviorOptions {
            copy_to_clipboard: config.behavior.copy_to_clipboard,
            delete_audio_files: config.behavior.delete_audio_files,
        },
        global::recordings_dir()?,
    ));

    let api_server = ApiServer::new(
        Arc::clone(&controller),
        config.behavior.default_analysis,
        config.api.port,
    );

    info!("meetscribe is ready!");
    info!(
        "Start a recording: curl -X POST http://127.0.0.1:{}/start",
        config.api.port
    );
    info!(
        "Stop and analyze:  curl -X POST http://127.0.0.1:{}/stop",
        config.api.port
    );

    if let Err(e) = api_server.start().await {
        error!("API server failed: {}", e);
        return Err(e);
    }

    Ok(())
}

pub fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let backend = RemoteTranscriptionBackend::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.poll_interval_seconds),
        Duration::from_secs(config.backend.timeout_seconds),
    )?;

    let api_key = config.analysis.resolve_api_key().unwrap_or_else(|| {
        warn!("No analysis API key configured, analysis requests will be rejected");
        String::new()
    });

    let analysis = ChatAnalysisClient::new(
        config.analysis.endpoint.clone(),
        api_key,
        config.analysis.model.clone(),
        Duration::from_secs(config.analysis.timeout_seconds),
    )?;

    Ok(Orchestrator::new(
        Box::new(backend),
        Box::new(analysis),
        OrchestratorConfig {
            use_backend: config.backend.enabled,
            speaker_rotation_period: config.speakers.rotation_period,
            speaker_voices: config.speakers.voices,
            transcribe: TranscribeOptions {
                language: config.backend.language.clone(),
                num_speakers: config.backend.num_speakers,
                analysis_type: None,
            },
            analysis: AnalysisOptions {
                token_budget: config.analysis.token_budget,
                long_input: config.analysis.long_input,
            },
        },
    ))
}
