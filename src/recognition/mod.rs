//! Live recognition session.
//!
//! Keeps a continuous recognition engine attached for as long as a
//! recording is active, surviving the engine's natural stops: every
//! `Ended` event while still listening schedules a restart after a short
//! debounce delay. An explicit stop disarms the restart so a late
//! `Ended` cannot bring the engine back.
//!
//! The engine is injected behind a trait and events arrive as tagged
//! values, so the session core is a pure transition function testable
//! with a scripted event source. Platforms without an engine degrade to
//! capture-only mode with a one-time warning.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::transcript::{RecognitionEvent, TranscriptAccumulator};

/// Events a recognition engine delivers to the session.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The engine's full results array (re-emitted on every change).
    Results(RecognitionEvent),
    /// The engine stopped on its own (silence, internal timeout).
    Ended,
    /// A transient engine error ("no speech", network hiccup).
    Error(String),
}

/// A continuous speech-recognition engine. `start` may be called again
/// after an `Ended` event to keep the session listening.
pub trait RecognitionEngine: Send {
    /// Whether this platform can recognize speech at all.
    fn is_supported(&self) -> bool;

    fn start(&mut self, events: mpsc::UnboundedSender<EngineEvent>) -> Result<()>;

    fn stop(&mut self);
}

/// Engine used when the platform offers no recognition capability.
pub struct NullEngine;

impl RecognitionEngine for NullEngine {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&mut self, _events: mpsc::UnboundedSender<EngineEvent>) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionPhase {
    Idle,
    Listening,
}

impl Default for RecognitionPhase {
    fn default() -> Self {
        RecognitionPhase::Idle
    }
}

/// What the driver must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    None,
    /// Restart the engine after the debounce delay.
    Restart,
}

/// The session core: accumulator plus lifecycle flags. Purely
/// synchronous; the driver owns the async plumbing.
#[derive(Default)]
pub struct SessionCore {
    accumulator: TranscriptAccumulator,
    phase: RecognitionPhase,
    last_error: Option<String>,
}

impl SessionCore {
    /// Arm the session for a new recording. Resets the accumulator;
    /// this is the only place it resets.
    pub fn begin(&mut self) {
        self.accumulator.reset();
        self.last_error = None;
        self.phase = RecognitionPhase::Listening;
    }

    /// Disarm before detaching the engine, returning the confirmed
    /// transcript. A late `Ended` after this is ignored.
    pub fn finish(&mut self) -> String {
        self.phase = RecognitionPhase::Idle;
        self.accumulator.confirmed().to_string()
    }

    pub fn phase(&self) -> RecognitionPhase {
        self.phase
    }

    pub fn display(&self) -> String {
        self.accumulator.display()
    }

    pub fn confirmed(&self) -> &str {
        self.accumulator.confirmed()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The transition function: fold one engine event into the session.
    pub fn on_event(&mut self, event: EngineEvent) -> SessionAction {
        match event {
            EngineEvent::Results(results) => {
                if self.phase == RecognitionPhase::Listening {
                    self.accumulator.apply(&results);
                }
                SessionAction::None
            }
            EngineEvent::Ended => {
                if self.phase == RecognitionPhase::Listening {
                    debug!("Recognition engine ended while recording, will restart");
                    SessionAction::Restart
                } else {
                    SessionAction::None
                }
            }
            EngineEvent::Error(message) => {
                // Reported as status, never clears accumulated text.
                warn!("Recognition error: {}", message);
                self.last_error = Some(message);
                SessionAction::None
            }
        }
    }
}

/// Owns the engine and the event-pump task for one or more recordings.
pub struct RecognitionSession {
    core: Arc<Mutex<SessionCore>>,
    engine: Arc<Mutex<Box<dyn RecognitionEngine>>>,
    pump: Mutex<Option<tokio::task::JoinHandle<()>>>,
    restart_delay: Duration,
    supported: bool,
}

impl RecognitionSession {
    pub fn new(engine: Box<dyn RecognitionEngine>, restart_delay: Duration) -> Self {
        let supported = engine.is_supported();
        if !supported {
            // One-time capability warning; capture still works.
            let failure = crate::error::ProcessingError::CapabilityUnsupported(
                "no engine on this platform".to_string(),
            );
            warn!("{}, live transcript disabled", failure);
        }

        Self {
            core: Arc::new(Mutex::new(SessionCore::default())),
            engine: Arc::new(Mutex::new(engine)),
            pump: Mutex::new(None),
            restart_delay,
            supported,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Attach the engine for a new recording and start pumping events.
    pub async fn start(&self) -> Result<()> {
        if !self.supported {
            return Ok(());
        }

        self.core.lock().await.begin();

        let (tx, mut rx) = mpsc::unbounded_channel();
        self.engine.lock().await.start(tx.clone())?;
        info!("Recognition session listening");

        let core = Arc::clone(&self.core);
        let engine = Arc::clone(&self.engine);
        let restart_delay = self.restart_delay;

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let action = core.lock().await.on_event(event);

                if action == SessionAction::Restart {
                    // Debounce so a flapping engine cannot restart-loop.
                    sleep(restart_delay).await;

                    if core.lock().await.phase() != RecognitionPhase::Listening {
                        continue;
                    }

                    if let Err(err) = engine.lock().await.start(tx.clone()) {
                        // Restart failures are logged, not fatal; the
                        // recording continues without live text.
                        warn!("Failed to restart recognition engine: {}", err);
                    }
                }
            }
            debug!("Recognition event pump finished");
        });

        if let Some(old) = self.pump.lock().await.replace(handle) {
            old.abort();
        }

        Ok(())
    }

    /// Detach the engine and return the confirmed live transcript. Safe
    /// to call when never started (empty transcript).
    pub async fn stop(&self) -> String {
        let transcript = self.core.lock().await.finish();
        self.engine.lock().await.stop();
        if let Some(pump) = self.pump.lock().await.take() {
            pump.abort();
        }
        transcript
    }

    /// Current confirmed + interim display text, for status endpoints.
    pub async fn display(&self) -> String {
        self.core.lock().await.display()
    }
}
