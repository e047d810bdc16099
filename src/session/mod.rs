//! Recording session lifecycle.
//!
//! One controller owns the capture session, the recognition session and
//! the orchestrator handoff. All recording state lives here behind a
//! shared status handle; there are no free-floating globals, and the
//! single-active-session rule is enforced by the phase guard.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::analysis::AnalysisKind;
use crate::capture::{AudioClip, CaptureSession};
use crate::error::ProcessingError;
use crate::processing::{Orchestrator, ProcessingResult};
use crate::recognition::RecognitionSession;
use crate::share::{self, ClipboardService};

/// Post-processing behavior toggles.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorOptions {
    /// Copy the finished analysis to the clipboard.
    pub copy_to_clipboard: bool,
    /// Delete the recording WAV once processing finished.
    pub delete_audio_files: bool,
}

/// Phase of the recording/processing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Recording,
    Processing,
    Completed,
    Error,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Current session state, readable by API handlers.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub started_at: Option<DateTime<Utc>>,
    pub last_result: Option<ProcessingResult>,
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn duration_seconds(&self) -> Option<u64> {
        self.started_at.map(|started| {
            let elapsed = Utc::now() - started;
            elapsed.num_seconds().max(0) as u64
        })
    }
}

/// Thread-safe handle for sharing session state between the controller
/// and API handlers.
#[derive(Clone, Default)]
pub struct SessionStatusHandle {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionStatusHandle {
    pub async fn get(&self) -> SessionState {
        self.inner.lock().await.clone()
    }

    pub async fn start_recording(&self) {
        let mut state = self.inner.lock().await;
        state.phase = SessionPhase::Recording;
        state.started_at = Some(Utc::now());
        state.last_error = None;
    }

    pub async fn set_processing(&self) {
        let mut state = self.inner.lock().await;
        state.phase = SessionPhase::Processing;
        state.started_at = None;
    }

    pub async fn set_result(&self, result: ProcessingResult) {
        let mut state = self.inner.lock().await;
        state.phase = match result.status {
            crate::processing::ProcessingStatus::Failed => SessionPhase::Error,
            _ => SessionPhase::Completed,
        };
        state.last_error = result.error_message.clone();
        state.last_result = Some(result);
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.inner.lock().await;
        state.phase = SessionPhase::Error;
        state.last_error = Some(message);
        state.started_at = None;
    }
}

pub struct RecordingController {
    capture: Mutex<CaptureSession>,
    recognition: Arc<RecognitionSession>,
    orchestrator: Arc<Orchestrator>,
    status: SessionStatusHandle,
    clipboard: ClipboardService,
    behavior: BehaviorOptions,
    recordings_dir: PathBuf,
}

impl RecordingController {
    pub fn new(
        capture: CaptureSession,
        recognition: RecognitionSession,
        orchestrator: Orchestrator,
        status: SessionStatusHandle,
        clipboard: ClipboardService,
        behavior: BehaviorOptions,
        recordings_dir: PathBuf,
    ) -> Self {
        Self {
            capture: Mutex::new(capture),
            recognition: Arc::new(recognition),
            orchestrator: Arc::new(orchestrator),
            status,
            clipboard,
            behavior,
            recordings_dir,
        }
    }

    pub fn status(&self) -> SessionStatusHandle {
        self.status.clone()
    }

    /// Live display text (confirmed + interim) for status endpoints.
    pub async fn live_transcript(&self) -> String {
        self.recognition.display().await
    }

    /// Start a new recording. Rejected while another recording is active
    /// or a previous one is still processing.
    pub async fn start(&self) -> Result<()> {
        let phase = self.status.get().await.phase();
        match phase {
            SessionPhase::Recording => bail!("recording already in progress"),
            SessionPhase::Processing => {
                bail!("previous recording is still processing, try again shortly")
            }
            _ => {}
        }

        {
            let mut capture = self.capture.lock().await;
            if let Err(err) = capture.start() {
                let failure = ProcessingError::Permission(err.to_string());
                self.status.set_error(failure.to_string()).await;
                return Err(err.context("microphone access denied"));
            }
        }

        if let Err(err) = self.recognition.start().await {
            // Capture keeps running; only the live transcript is lost.
            warn!("Failed to start recognition: {}", err);
        }

        self.status.start_recording().await;
        info!("Recording started");
        Ok(())
    }

    /// Stop the active recording and process it in the background. The
    /// in-flight processing of an earlier stop is independent and is not
    /// cancelled.
    pub async fn stop(&self, kind: AnalysisKind) -> Result<()> {
        let phase = self.status.get().await.phase();
        if phase != SessionPhase::Recording {
            bail!("no recording in progress (current phase: {})", phase.as_str());
        }

        let clip = match self.capture.lock().await.stop() {
            Ok(clip) => clip,
            Err(err) => {
                self.recognition.stop().await;
                self.status.set_error(err.to_string()).await;
                return Err(err);
            }
        };
        let live_transcript = self.recognition.stop().await;

        self.status.set_processing().await;

        let audio_path = match clip {
            Some(clip) if !clip.is_empty() => match self.persist_clip(&clip) {
                Ok(path) => Some(path),
                Err(err) => {
                    // Persist failures degrade to the live transcript.
                    warn!("Failed to save recording: {}", err);
                    None
                }
            },
            _ => {
                warn!("No audio captured, processing live transcript only");
                None
            }
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        let status = self.status.clone();
        let clipboard = self.clipboard.clone();
        let behavior = self.behavior;

        tokio::spawn(async move {
            let transcript = if live_transcript.trim().is_empty() {
                None
            } else {
                Some(live_transcript)
            };

            let result = orchestrator
                .process(audio_path.as_deref(), transcript.as_deref(), kind)
                .await;

            if let Some(message) = &result.error_message {
                error!("Processing finished with error: {}", message);
            } else {
                info!("Processing finished");
            }

            if behavior.copy_to_clipboard && result.shareable() {
                let payload = share::format_share(
                    result.analysis_text.as_deref().unwrap_or_default(),
                    result.kind.label(),
                    chrono::Local::now(),
                );
                if let Err(err) = clipboard.copy(&payload).await {
                    error!("Failed to copy report to clipboard: {}", err);
                }
            }

            if behavior.delete_audio_files {
                if let Some(path) = &audio_path {
                    if let Err(err) = tokio::fs::remove_file(path).await {
                        warn!("Failed to delete recording {:?}: {}", path, err);
                    }
                }
            }

            status.set_result(result).await;
        });

        Ok(())
    }

    /// Analyze a pre-recorded file, bypassing capture. Any live
    /// transcript from an earlier recording is deliberately not used;
    /// stale text must never be analyzed against unrelated audio.
    pub async fn process_file(&self, path: PathBuf, kind: AnalysisKind) -> Result<()> {
        let phase = self.status.get().await.phase();
        match phase {
            SessionPhase::Recording => bail!("stop the active recording first"),
            SessionPhase::Processing => bail!("previous recording is still processing"),
            _ => {}
        }

        if !path.exists() {
            bail!("audio file not found: {}", path.display());
        }

        self.status.set_processing().await;

        let orchestrator = Arc::clone(&self.orchestrator);
        let status = self.status.clone();

        tokio::spawn(async move {
            let result = orchestrator.process(Some(&path), None, kind).await;
            status.set_result(result).await;
        });

        Ok(())
    }

    fn persist_clip(&self, clip: &AudioClip) -> Result<PathBuf> {
        let path = self.generate_audio_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        clip.write_wav(&path)?;
        Ok(path)
    }

    fn generate_audio_path(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = format!("meeting-{}.wav", timestamp);
        let path = self.recordings_dir.join(&filename);

        if path.exists() {
            for i in 1..100 {
                let alt = self
                    .recordings_dir
                    .join(format!("meeting-{}-{}.wav", timestamp, i));
                if !alt.exists() {
                    return alt;
                }
            }
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::ProcessingStatus;

    #[test]
    fn test_phase_as_str() {
        assert_eq!(SessionPhase::Idle.as_str(), "idle");
        assert_eq!(SessionPhase::Recording.as_str(), "recording");
        assert_eq!(SessionPhase::Processing.as_str(), "processing");
        assert_eq!(SessionPhase::Completed.as_str(), "completed");
        assert_eq!(SessionPhase::Error.as_str(), "error");
    }

    #[tokio::test]
    async fn test_status_handle_lifecycle() {
        let handle = SessionStatusHandle::default();
        assert_eq!(handle.get().await.phase(), SessionPhase::Idle);

        handle.start_recording().await;
        let state = handle.get().await;
        assert_eq!(state.phase(), SessionPhase::Recording);
        assert!(state.started_at.is_some());

        handle.set_processing().await;
        assert_eq!(handle.get().await.phase(), SessionPhase::Processing);

        handle
            .set_result(ProcessingResult::failed(
                AnalysisKind::Summary,
                "no transcript available",
            ))
            .await;
        let state = handle.get().await;
        assert_eq!(state.phase(), SessionPhase::Error);
        assert_eq!(
            state.last_result.unwrap().status,
            ProcessingStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_completed_result_sets_completed_phase() {
        let handle = SessionStatusHandle::default();
        handle
            .set_result(ProcessingResult::completed(
                AnalysisKind::Summary,
                vec![],
                "summary".to_string(),
                vec![],
                "job".to_string(),
                false,
            ))
            .await;
        assert_eq!(handle.get().await.phase(), SessionPhase::Completed);
    }
}
