//! The single normalized outcome of a processing attempt.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisKind;
use crate::transcript::{SpeakerStat, TranscriptSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Completed,
    Failed,
    Processing,
}

/// Everything a processing attempt produced, consumed once by the
/// presenter. Created fresh per attempt; nothing accumulates across
/// calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub status: ProcessingStatus,
    pub kind: AnalysisKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Vec<TranscriptSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_stats: Option<Vec<SpeakerStat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// True when speaker labels came from the round-robin heuristic
    /// rather than real diarization.
    #[serde(default)]
    pub speaker_labels_synthetic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<f64>,
}

impl ProcessingResult {
    pub fn completed(
        kind: AnalysisKind,
        transcript: Vec<TranscriptSegment>,
        analysis_text: String,
        speaker_stats: Vec<SpeakerStat>,
        job_id: String,
        synthetic: bool,
    ) -> Self {
        Self {
            status: ProcessingStatus::Completed,
            kind,
            transcript: Some(transcript),
            analysis_text: Some(analysis_text),
            speaker_stats: Some(speaker_stats),
            job_id: Some(job_id),
            error_message: None,
            speaker_labels_synthetic: synthetic,
            processing_time_seconds: None,
        }
    }

    /// Transcription succeeded but analysis did not: the transcript is
    /// independently useful, so the result stays completed with the
    /// analysis failure recorded in `error_message`.
    pub fn partial(
        kind: AnalysisKind,
        transcript: Vec<TranscriptSegment>,
        speaker_stats: Vec<SpeakerStat>,
        job_id: String,
        error_message: String,
    ) -> Self {
        Self {
            status: ProcessingStatus::Completed,
            kind,
            transcript: Some(transcript),
            analysis_text: None,
            speaker_stats: Some(speaker_stats),
            job_id: Some(job_id),
            error_message: Some(error_message),
            speaker_labels_synthetic: false,
            processing_time_seconds: None,
        }
    }

    pub fn failed(kind: AnalysisKind, error_message: impl Into<String>) -> Self {
        Self {
            status: ProcessingStatus::Failed,
            kind,
            transcript: None,
            analysis_text: None,
            speaker_stats: None,
            job_id: None,
            error_message: Some(error_message.into()),
            speaker_labels_synthetic: false,
            processing_time_seconds: None,
        }
    }

    /// Whether share/export actions may be offered for this result.
    pub fn shareable(&self) -> bool {
        self.status == ProcessingStatus::Completed
            && self
                .analysis_text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_always_carries_a_message() {
        let result = ProcessingResult::failed(AnalysisKind::Summary, "no transcript available");
        assert_eq!(result.status, ProcessingStatus::Failed);
        assert!(result.error_message.is_some());
        assert!(!result.shareable());
    }

    #[test]
    fn test_partial_result_is_completed_but_not_shareable() {
        let result = ProcessingResult::partial(
            AnalysisKind::Summary,
            vec![],
            vec![],
            "job-1".to_string(),
            "analysis failed: timeout".to_string(),
        );
        assert_eq!(result.status, ProcessingStatus::Completed);
        assert!(result.analysis_text.is_none());
        assert!(!result.shareable());
    }

    #[test]
    fn test_completed_with_analysis_is_shareable() {
        let result = ProcessingResult::completed(
            AnalysisKind::Summary,
            vec![],
            "the meeting went well".to_string(),
            vec![],
            "job-1".to_string(),
            false,
        );
        assert!(result.shareable());
    }
}
