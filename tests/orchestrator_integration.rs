//! End-to-end orchestrator scenarios with fake backends.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use meetscribe::analysis::{AnalysisKind, AnalysisOptions, AnalysisService, LongInputStrategy};
use meetscribe::processing::{Orchestrator, OrchestratorConfig, ProcessingStatus};
use meetscribe::transcript::TranscriptSegment;
use meetscribe::transcription::{TranscribeOptions, TranscriptionBackend, TranscriptionOutcome};

#[derive(Clone)]
struct FakeBackend {
    healthy: bool,
    fail_transcribe: bool,
    health_calls: Arc<AtomicUsize>,
    transcribe_calls: Arc<AtomicUsize>,
}

impl FakeBackend {
    fn new(healthy: bool, fail_transcribe: bool) -> Self {
        Self {
            healthy,
            fail_transcribe,
            health_calls: Arc::new(AtomicUsize::new(0)),
            transcribe_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment {
                text: "Welcome everyone, let's get started.".to_string(),
                start: Some(0.0),
                end: Some(12.0),
                speaker: Some("SPEAKER_00".to_string()),
                confidence: Some(0.95),
            },
            TranscriptSegment {
                text: "Thanks, I have two updates.".to_string(),
                start: Some(12.0),
                end: Some(18.0),
                speaker: Some("SPEAKER_01".to_string()),
                confidence: Some(0.91),
            },
        ]
    }
}

#[async_trait]
impl TranscriptionBackend for FakeBackend {
    async fn health(&self) -> Result<()> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy {
            Ok(())
        } else {
            Err(anyhow!("connection refused"))
        }
    }

    async fn transcribe(
        &self,
        _audio_path: &Path,
        _options: &TranscribeOptions,
    ) -> Result<TranscriptionOutcome> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transcribe {
            Err(anyhow!("network error during upload"))
        } else {
            Ok(TranscriptionOutcome {
                job_id: "job-42".to_string(),
                segments: Self::segments(),
            })
        }
    }
}

#[derive(Clone)]
struct FakeAnalysis {
    fail: bool,
    calls: Arc<AtomicUsize>,
    last_input: Arc<std::sync::Mutex<String>>,
}

impl FakeAnalysis {
    fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: Arc::new(AtomicUsize::new(0)),
            last_input: Arc::new(std::sync::Mutex::new(String::new())),
        }
    }

    fn last_input(&self) -> String {
        self.last_input.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisService for FakeAnalysis {
    async fn analyze(&self, transcript_text: &str, kind: AnalysisKind) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = transcript_text.to_string();
        if self.fail {
            Err(anyhow!("model overloaded"))
        } else {
            Ok(format!(
                "{} over {} chars",
                kind.as_str(),
                transcript_text.len()
            ))
        }
    }
}

fn orchestrator(backend: FakeBackend, analysis: FakeAnalysis) -> Orchestrator {
    Orchestrator::new(
        Box::new(backend),
        Box::new(analysis),
        OrchestratorConfig {
            use_backend: true,
            speaker_rotation_period: 3,
            speaker_voices: 2,
            transcribe: TranscribeOptions::default(),
            analysis: AnalysisOptions {
                token_budget: 80_000,
                long_input: LongInputStrategy::Truncate,
            },
        },
    )
}

const AUDIO: &str = "/tmp/meetscribe-test-audio.wav";

#[tokio::test]
async fn full_path_produces_completed_result_with_real_speakers() {
    let backend = FakeBackend::new(true, false);
    let analysis = FakeAnalysis::new(false);
    let orch = orchestrator(backend.clone(), analysis.clone());

    let result = orch
        .process(Some(Path::new(AUDIO)), None, AnalysisKind::Summary)
        .await;

    assert_eq!(result.status, ProcessingStatus::Completed);
    assert!(!result.speaker_labels_synthetic);
    assert_eq!(result.job_id.as_deref(), Some("job-42"));
    assert!(result.analysis_text.is_some());

    let stats = result.speaker_stats.unwrap();
    assert_eq!(stats.len(), 2);
    let sum: f64 = stats.iter().map(|s| s.percent).sum();
    assert!((sum - 100.0).abs() < 0.1);

    assert_eq!(backend.transcribe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(analysis.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn full_path_failure_falls_back_to_degraded_exactly_once() {
    let backend = FakeBackend::new(true, true);
    let analysis = FakeAnalysis::new(false);
    let orch = orchestrator(backend.clone(), analysis.clone());

    let result = orch
        .process(
            Some(Path::new(AUDIO)),
            Some("We agreed to ship on Friday. Marketing will follow up."),
            AnalysisKind::Summary,
        )
        .await;

    // The degraded path ran from the live transcript.
    assert_eq!(result.status, ProcessingStatus::Completed);
    assert!(result.speaker_labels_synthetic);

    // The full path was attempted once and never retried.
    assert_eq!(backend.transcribe_calls.load(Ordering::SeqCst), 1);
    // The degraded path itself ran a single analysis.
    assert_eq!(analysis.calls.load(Ordering::SeqCst), 1);

    let stats = result.speaker_stats.unwrap();
    assert!(!stats.is_empty());
    let sum: f64 = stats.iter().map(|s| s.percent).sum();
    assert!((sum - 100.0).abs() < 0.1);
}

#[tokio::test]
async fn unreachable_backend_skips_full_path() {
    let backend = FakeBackend::new(false, false);
    let analysis = FakeAnalysis::new(false);
    let orch = orchestrator(backend.clone(), analysis.clone());

    let result = orch
        .process(
            Some(Path::new(AUDIO)),
            Some("Short meeting today."),
            AnalysisKind::ActionItems,
        )
        .await;

    assert_eq!(result.status, ProcessingStatus::Completed);
    assert!(result.speaker_labels_synthetic);
    assert_eq!(backend.health_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.transcribe_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn silence_with_no_transcript_fails_with_message() {
    // Recording captured nothing recognizable and the backend is down:
    // there is nothing to analyze.
    let backend = FakeBackend::new(false, false);
    let analysis = FakeAnalysis::new(false);
    let orch = orchestrator(backend, analysis.clone());

    let result = orch
        .process(Some(Path::new(AUDIO)), None, AnalysisKind::Summary)
        .await;

    assert_eq!(result.status, ProcessingStatus::Failed);
    assert!(result
        .error_message
        .as_deref()
        .unwrap()
        .contains("no transcript available"));
    assert_eq!(analysis.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn whitespace_transcript_counts_as_no_transcript() {
    let backend = FakeBackend::new(false, false);
    let analysis = FakeAnalysis::new(false);
    let orch = orchestrator(backend, analysis);

    let result = orch
        .process(Some(Path::new(AUDIO)), Some("   \n  "), AnalysisKind::Summary)
        .await;

    assert_eq!(result.status, ProcessingStatus::Failed);
}

#[tokio::test]
async fn analysis_failure_after_real_transcription_is_partial_success() {
    let backend = FakeBackend::new(true, false);
    let analysis = FakeAnalysis::new(true);
    let orch = orchestrator(backend.clone(), analysis.clone());

    let result = orch
        .process(Some(Path::new(AUDIO)), None, AnalysisKind::KeyDecisions)
        .await;

    // Transcript is kept, analysis failure is recorded, share stays off.
    assert_eq!(result.status, ProcessingStatus::Completed);
    assert!(result.analysis_text.is_none());
    assert!(result
        .error_message
        .as_deref()
        .unwrap()
        .contains("analysis failed"));
    assert!(result.transcript.is_some());
    assert!(!result.shareable());
}

#[tokio::test]
async fn degraded_analysis_failure_is_terminal() {
    let backend = FakeBackend::new(false, false);
    let analysis = FakeAnalysis::new(true);
    let orch = orchestrator(backend, analysis.clone());

    let result = orch
        .process(
            Some(Path::new(AUDIO)),
            Some("Some discussion happened."),
            AnalysisKind::Summary,
        )
        .await;

    assert_eq!(result.status, ProcessingStatus::Failed);
    assert!(result
        .error_message
        .as_deref()
        .unwrap()
        .contains("analysis failed"));
    // One attempt, no retries.
    assert_eq!(analysis.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_processing_does_not_accumulate_state() {
    let backend = FakeBackend::new(true, false);
    let analysis = FakeAnalysis::new(false);
    let orch = orchestrator(backend, analysis);

    let first = orch
        .process(Some(Path::new(AUDIO)), None, AnalysisKind::Summary)
        .await;
    let second = orch
        .process(Some(Path::new(AUDIO)), None, AnalysisKind::Summary)
        .await;

    let first_len = first.transcript.as_ref().unwrap().len();
    let second_len = second.transcript.as_ref().unwrap().len();
    assert_eq!(first_len, second_len);

    let first_stats = first.speaker_stats.unwrap();
    let second_stats = second.speaker_stats.unwrap();
    assert_eq!(first_stats.len(), second_stats.len());
    assert_eq!(first_stats[0].total_seconds, second_stats[0].total_seconds);
}

#[tokio::test]
async fn text_only_input_uses_degraded_path_without_probing() {
    let backend = FakeBackend::new(true, false);
    let analysis = FakeAnalysis::new(false);
    let orch = orchestrator(backend.clone(), analysis);

    let result = orch
        .process(None, Some("Notes pasted by hand."), AnalysisKind::FollowUp)
        .await;

    assert_eq!(result.status, ProcessingStatus::Completed);
    assert!(result.speaker_labels_synthetic);
    // No audio, so the backend is never consulted.
    assert_eq!(backend.health_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.transcribe_calls.load(Ordering::SeqCst), 0);
}

fn orchestrator_with_budget(analysis: FakeAnalysis, token_budget: usize) -> Orchestrator {
    Orchestrator::new(
        Box::new(FakeBackend::new(false, false)),
        Box::new(analysis),
        OrchestratorConfig {
            use_backend: true,
            speaker_rotation_period: 100,
            speaker_voices: 2,
            transcribe: TranscribeOptions::default(),
            analysis: AnalysisOptions {
                token_budget,
                long_input: LongInputStrategy::Truncate,
            },
        },
    )
}

#[tokio::test]
async fn transcript_at_exact_budget_is_not_truncated() {
    use meetscribe::analysis::estimate_tokens;

    let live = "Alpha beta gamma. Delta epsilon zeta.";
    let analysis = FakeAnalysis::new(false);

    // Measure what the degraded path actually sends with no pressure.
    let orch = orchestrator_with_budget(analysis.clone(), usize::MAX);
    orch.process(None, Some(live), AnalysisKind::Summary).await;
    let rendered = analysis.last_input();
    let budget = estimate_tokens(&rendered);

    // An estimate exactly equal to the budget passes through untouched.
    let orch = orchestrator_with_budget(analysis.clone(), budget);
    orch.process(None, Some(live), AnalysisKind::Summary).await;
    assert_eq!(analysis.last_input(), rendered);

    // One token less forces a cut at a sentence boundary, and the cut
    // text is a strict prefix of the original input.
    let orch = orchestrator_with_budget(analysis.clone(), budget - 1);
    orch.process(None, Some(live), AnalysisKind::Summary).await;
    let truncated = analysis.last_input();
    assert!(truncated.len() < rendered.len());
    assert!(rendered.starts_with(&truncated));
    assert!(
        truncated.ends_with('.') || truncated.ends_with('\n'),
        "cut did not land on a sentence boundary: {:?}",
        truncated
    );
}

#[tokio::test]
async fn degraded_speaker_rotation_follows_configured_period() {
    let backend = FakeBackend::new(false, false);
    let analysis = FakeAnalysis::new(false);
    let orch = Orchestrator::new(
        Box::new(backend),
        Box::new(analysis),
        OrchestratorConfig {
            use_backend: true,
            speaker_rotation_period: 1,
            speaker_voices: 2,
            transcribe: TranscribeOptions::default(),
            analysis: AnalysisOptions::default(),
        },
    );

    let result = orch
        .process(
            Some(Path::new(AUDIO)),
            Some("First point. Second point. Third point. Fourth point."),
            AnalysisKind::Summary,
        )
        .await;

    let transcript = result.transcript.unwrap();
    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript[0].speaker.as_deref(), Some("Speaker 1"));
    assert_eq!(transcript[1].speaker.as_deref(), Some("Speaker 2"));
    assert_eq!(transcript[2].speaker.as_deref(), Some("Speaker 1"));
    assert_eq!(transcript[3].speaker.as_deref(), Some("Speaker 2"));
}
