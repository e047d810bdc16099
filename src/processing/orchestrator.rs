//! Dual-path processing orchestrator.
//!
//! Given a finalized recording (and whatever live transcript accumulated
//! during it), decides which backend path turns it into a report:
//!
//! - full path: remote transcription + diarization, then analysis;
//! - degraded path: analysis of the live transcript with synthetic
//!   speaker labels, used when the backend is unreachable or the full
//!   path throws.
//!
//! The fallback is a single sequential attempt: the full path completes
//! (success or error) before the degraded path starts, the full path is
//! never retried within one invocation, and a degraded-path failure is
//! terminal. Every outcome leaves through `ProcessingResult`; this module
//! never panics or propagates errors past its boundary.

use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{analyze_transcript, AnalysisKind, AnalysisOptions, AnalysisService};
use crate::error::ProcessingError;
use crate::transcript::{
    assign_synthetic_speakers, render_transcript, speaker_stats, split_into_segments,
};
use crate::transcription::{TranscribeOptions, TranscriptionBackend};

use super::result::ProcessingResult;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// When false the remote backend is never consulted and every
    /// recording goes through the degraded path.
    pub use_backend: bool,
    /// Segments per synthetic speaker turn on the degraded path.
    pub speaker_rotation_period: usize,
    /// Size of the synthetic speaker label set.
    pub speaker_voices: usize,
    pub transcribe: TranscribeOptions,
    pub analysis: AnalysisOptions,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            use_backend: true,
            speaker_rotation_period: 3,
            speaker_voices: 2,
            transcribe: TranscribeOptions::default(),
            analysis: AnalysisOptions::default(),
        }
    }
}

pub struct Orchestrator {
    backend: Box<dyn TranscriptionBackend>,
    analysis: Box<dyn AnalysisService>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        backend: Box<dyn TranscriptionBackend>,
        analysis: Box<dyn AnalysisService>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            backend,
            analysis,
            config,
        }
    }

    /// Process one finalized recording. `audio_path` is absent when the
    /// caller only has text; `live_transcript` is absent for uploaded
    /// files that never ran live recognition.
    pub async fn process(
        &self,
        audio_path: Option<&Path>,
        live_transcript: Option<&str>,
        kind: AnalysisKind,
    ) -> ProcessingResult {
        let started = Instant::now();

        let mut result = match self.run(audio_path, live_transcript, kind).await {
            Ok(result) => result,
            Err(err) => {
                warn!("Processing failed: {}", err);
                ProcessingResult::failed(kind, err.to_string())
            }
        };

        result.processing_time_seconds = Some(started.elapsed().as_secs_f64());
        result
    }

    async fn run(
        &self,
        audio_path: Option<&Path>,
        live_transcript: Option<&str>,
        kind: AnalysisKind,
    ) -> Result<ProcessingResult, ProcessingError> {
        if let Some(path) = audio_path {
            if self.config.use_backend && self.probe().await {
                match self.full_path(path, kind).await {
                    Ok(result) => return Ok(result),
                    Err(err) => {
                        warn!("Full path failed, switching to degraded path: {}", err);
                    }
                }
            }
        }

        self.degraded_path(live_transcript, kind).await
    }

    async fn probe(&self) -> bool {
        match self.backend.health().await {
            Ok(()) => true,
            Err(err) => {
                warn!("Transcription backend not reachable: {}", err);
                false
            }
        }
    }

    async fn full_path(
        &self,
        audio_path: &Path,
        kind: AnalysisKind,
    ) -> Result<ProcessingResult, ProcessingError> {
        let mut options = self.config.transcribe.clone();
        options.analysis_type = Some(kind.as_str().to_string());

        let outcome = self
            .backend
            .transcribe(audio_path, &options)
            .await
            .map_err(|err| ProcessingError::BackendUnavailable(err.to_string()))?;

        info!(
            "Backend transcript ready: {} segments (job {})",
            outcome.segments.len(),
            outcome.job_id
        );

        let stats = speaker_stats(&outcome.segments);
        let rendered = render_transcript(&outcome.segments);

        match analyze_transcript(
            self.analysis.as_ref(),
            &rendered,
            kind,
            &self.config.analysis,
        )
        .await
        {
            Ok(analysis_text) => Ok(ProcessingResult::completed(
                kind,
                outcome.segments,
                analysis_text,
                stats,
                outcome.job_id,
                false,
            )),
            Err(err) => {
                // The transcript survived even though analysis did not;
                // keep it as a partial success rather than discarding a
                // real diarized transcript for a degraded re-analysis.
                let failure = ProcessingError::AnalysisFailed(err.to_string());
                warn!("{}", failure);
                Ok(ProcessingResult::partial(
                    kind,
                    outcome.segments,
                    stats,
                    outcome.job_id,
                    failure.to_string(),
                ))
            }
        }
    }

    async fn degraded_path(
        &self,
        live_transcript: Option<&str>,
        kind: AnalysisKind,
    ) -> Result<ProcessingResult, ProcessingError> {
        let text = live_transcript
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(ProcessingError::NoTranscript)?;

        info!(
            "Using degraded path with {} chars of live transcript",
            text.len()
        );

        let segments = assign_synthetic_speakers(
            split_into_segments(text),
            self.config.speaker_rotation_period,
            self.config.speaker_voices,
        );
        let stats = speaker_stats(&segments);
        let rendered = render_transcript(&segments);

        let analysis_text = analyze_transcript(
            self.analysis.as_ref(),
            &rendered,
            kind,
            &self.config.analysis,
        )
        .await
        .map_err(|err| ProcessingError::AnalysisFailed(err.to_string()))?;

        Ok(ProcessingResult::completed(
            kind,
            segments,
            analysis_text,
            stats,
            Uuid::new_v4().to_string(),
            true,
        ))
    }
}
