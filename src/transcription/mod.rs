//! Remote transcription + diarization backend.

pub mod remote;

pub use remote::RemoteTranscriptionBackend;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::transcript::TranscriptSegment;

/// Options forwarded with every transcription request.
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// Language code ("en", "zh", "auto").
    pub language: String,
    /// Exact speaker count hint, when the caller knows it.
    pub num_speakers: Option<u32>,
    /// The analysis the caller will run on the transcript, forwarded as a
    /// hint so the backend can tune its output.
    pub analysis_type: Option<String>,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            num_speakers: None,
            analysis_type: None,
        }
    }
}

/// Completed transcription with diarized segments.
#[derive(Debug, Clone)]
pub struct TranscriptionOutcome {
    pub job_id: String,
    pub segments: Vec<TranscriptSegment>,
}

/// Abstract transcription backend. Implementations submit audio, wait for
/// completion (directly or by polling a job), and return diarized
/// segments.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Lightweight readiness probe used for path selection. An error means
    /// the backend is unreachable and the degraded path should be used.
    async fn health(&self) -> Result<()>;

    /// Submit an audio file and wait for the transcript.
    async fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<TranscriptionOutcome>;
}
