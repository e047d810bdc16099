//! Processing error taxonomy.
//!
//! Every failure the pipeline can surface to a caller is one of these
//! variants. The orchestrator never lets them escape as `Err`; they are
//! normalized into a failed `ProcessingResult` at its boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Microphone access was denied or no input device exists. Fatal to
    /// the current recording attempt; recoverable by retrying after the
    /// user grants access.
    #[error("microphone access denied: {0}")]
    Permission(String),

    /// No live-recognition engine is available on this platform. Not
    /// fatal, capture proceeds without a live transcript.
    #[error("speech recognition is not available: {0}")]
    CapabilityUnsupported(String),

    /// Nothing to analyze: no backend transcript and no live transcript.
    #[error("no transcript available")]
    NoTranscript,

    /// The transcription backend could not be reached, timed out, or
    /// returned a non-success response. Triggers the degraded path once.
    #[error("transcription backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The analysis backend returned an error or no usable content.
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_human_readable() {
        let err = ProcessingError::NoTranscript;
        assert_eq!(err.to_string(), "no transcript available");

        let err = ProcessingError::BackendUnavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
