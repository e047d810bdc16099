//! Live transcript accumulation from incremental recognition events.
//!
//! Recognition engines re-emit the full results array on every event, so
//! the accumulator keeps a consumption watermark and only appends final
//! results it has not seen before. Interim hypotheses are recomputed from
//! scratch each event and never enter the confirmed buffer.

/// One hypothesis inside a recognition event.
#[derive(Debug, Clone)]
pub struct RecognitionAlternative {
    pub text: String,
    /// Final results will not be revised by the engine; interim ones may.
    pub is_final: bool,
}

impl RecognitionAlternative {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// A recognition event carrying the engine's full, ordered results array.
#[derive(Debug, Clone, Default)]
pub struct RecognitionEvent {
    pub results: Vec<RecognitionAlternative>,
}

/// Folds recognition events into a confirmed transcript plus a transient
/// interim tail.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    confirmed: String,
    interim: String,
    next_index: usize,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one event. Final results at or past the watermark are
    /// appended to the confirmed buffer (with a separating space) and
    /// advance the watermark; everything non-final in this event becomes
    /// the new interim text.
    pub fn apply(&mut self, event: &RecognitionEvent) {
        self.interim.clear();

        for (index, result) in event.results.iter().enumerate() {
            if result.is_final {
                if index >= self.next_index {
                    let text = result.text.trim();
                    if !text.is_empty() {
                        if !self.confirmed.is_empty() {
                            self.confirmed.push(' ');
                        }
                        self.confirmed.push_str(text);
                    }
                    self.next_index = index + 1;
                }
            } else {
                self.interim.push_str(&result.text);
            }
        }
    }

    /// The monotonically growing confirmed transcript.
    pub fn confirmed(&self) -> &str {
        &self.confirmed
    }

    /// The latest interim hypothesis, empty between utterances.
    pub fn interim(&self) -> &str {
        &self.interim
    }

    /// Confirmed text followed by the bracketed interim tail, as shown to
    /// the user while recording.
    pub fn display(&self) -> String {
        let interim = self.interim.trim();
        if interim.is_empty() {
            self.confirmed.clone()
        } else if self.confirmed.is_empty() {
            format!("[{}]", interim)
        } else {
            format!("{} [{}]", self.confirmed, interim)
        }
    }

    /// Clear everything for a new recording session.
    pub fn reset(&mut self) {
        self.confirmed.clear();
        self.interim.clear();
        self.next_index = 0;
    }
}
