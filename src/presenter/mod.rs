//! Rendering of processing results.
//!
//! Pure state mapping with no business logic: a `ProcessingResult` goes
//! in, rendered text views and a UI state come out. Nothing here mutates
//! or re-derives the result.

use crate::processing::{ProcessingResult, ProcessingStatus};
use crate::session::SessionPhase;

/// What the user-facing surface should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Recording,
    Processing,
    Result,
    Error,
}

impl ViewState {
    pub fn from_phase(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Idle => Self::Idle,
            SessionPhase::Recording => Self::Recording,
            SessionPhase::Processing => Self::Processing,
            SessionPhase::Completed => Self::Result,
            SessionPhase::Error => Self::Error,
        }
    }
}

/// A fully rendered report, ready for terminal output or a status API.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub state: ViewState,
    pub headline: String,
    pub transcript: String,
    pub speaker_overview: String,
    pub analysis: String,
    /// Share/export actions are offered only when this is true.
    pub share_enabled: bool,
}

/// Map one result to its rendered report. Deterministic; calling twice
/// with the same result yields the same report.
pub fn render(result: &ProcessingResult) -> RenderedReport {
    match result.status {
        ProcessingStatus::Processing => RenderedReport {
            state: ViewState::Processing,
            headline: "Processing recording...".to_string(),
            transcript: String::new(),
            speaker_overview: String::new(),
            analysis: String::new(),
            share_enabled: false,
        },
        ProcessingStatus::Failed => RenderedReport {
            state: ViewState::Error,
            headline: result
                .error_message
                .clone()
                .unwrap_or_else(|| "processing failed".to_string()),
            transcript: String::new(),
            speaker_overview: String::new(),
            analysis: String::new(),
            share_enabled: false,
        },
        ProcessingStatus::Completed => {
            let transcript = result
                .transcript
                .as_deref()
                .map(crate::transcript::render_transcript)
                .unwrap_or_default();

            let analysis = match &result.analysis_text {
                Some(text) => text.clone(),
                None => format!(
                    "Analysis unavailable: {}",
                    result
                        .error_message
                        .as_deref()
                        .unwrap_or("the analysis backend returned nothing")
                ),
            };

            RenderedReport {
                state: ViewState::Result,
                headline: format!("{} ready", result.kind.label()),
                transcript,
                speaker_overview: render_speaker_overview(result),
                analysis,
                share_enabled: result.shareable(),
            }
        }
    }
}

fn render_speaker_overview(result: &ProcessingResult) -> String {
    let Some(stats) = &result.speaker_stats else {
        return String::new();
    };
    if stats.is_empty() {
        return String::new();
    }

    let mut lines: Vec<String> = stats
        .iter()
        .map(|stat| {
            format!(
                "{}: {:.0}s ({:.1}%)",
                stat.speaker, stat.total_seconds, stat.percent
            )
        })
        .collect();

    if result.speaker_labels_synthetic {
        lines.push("(speaker split estimated, not diarized)".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisKind;
    use crate::transcript::{SpeakerStat, TranscriptSegment};

    fn completed_result() -> ProcessingResult {
        ProcessingResult::completed(
            AnalysisKind::Summary,
            vec![TranscriptSegment {
                text: "hello everyone".to_string(),
                start: Some(0.0),
                end: Some(2.0),
                speaker: Some("SPEAKER_00".to_string()),
                confidence: None,
            }],
            "A short meeting.".to_string(),
            vec![SpeakerStat {
                speaker: "SPEAKER_00".to_string(),
                total_seconds: 2.0,
                percent: 100.0,
            }],
            "job-1".to_string(),
            false,
        )
    }

    #[test]
    fn test_completed_result_renders_everything() {
        let report = render(&completed_result());

        assert_eq!(report.state, ViewState::Result);
        assert!(report.transcript.contains("SPEAKER_00"));
        assert!(report.speaker_overview.contains("100.0%"));
        assert_eq!(report.analysis, "A short meeting.");
        assert!(report.share_enabled);
    }

    #[test]
    fn test_failed_result_hides_share_and_shows_message() {
        let result = ProcessingResult::failed(AnalysisKind::Summary, "no transcript available");
        let report = render(&result);

        assert_eq!(report.state, ViewState::Error);
        assert_eq!(report.headline, "no transcript available");
        assert!(!report.share_enabled);
    }

    #[test]
    fn test_partial_result_shows_transcript_without_share() {
        let result = ProcessingResult::partial(
            AnalysisKind::ActionItems,
            vec![TranscriptSegment::from_text("content survived")],
            vec![],
            "job-2".to_string(),
            "analysis failed: timeout".to_string(),
        );
        let report = render(&result);

        assert_eq!(report.state, ViewState::Result);
        assert!(report.transcript.contains("content survived"));
        assert!(report.analysis.contains("Analysis unavailable"));
        assert!(!report.share_enabled);
    }

    #[test]
    fn test_synthetic_labels_are_marked() {
        let mut result = completed_result();
        result.speaker_labels_synthetic = true;
        let report = render(&result);

        assert!(report.speaker_overview.contains("not diarized"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let result = completed_result();
        assert_eq!(render(&result), render(&result));
    }
}
