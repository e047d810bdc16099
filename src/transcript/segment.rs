//! Transcript segments and derived speaker statistics.

use serde::{Deserialize, Serialize};

/// One chronological piece of a meeting transcript.
///
/// Produced either by the remote transcription backend (full timing and
/// speaker fields) or from live-recognition text (text only). Immutable
/// once created; enrichment builds new segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl TranscriptSegment {
    /// Segment with text only, as the degraded path produces.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            end: None,
            speaker: None,
            confidence: None,
        }
    }

    /// Real duration when the backend supplied timing.
    pub fn duration_seconds(&self) -> Option<f64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        }
    }

    /// Duration used for statistics: real timing when present, otherwise a
    /// deterministic estimate from the text. The estimate assumes ~2.5
    /// words/second for space-delimited scripts and ~4 chars/second for
    /// CJK text. It is an approximation, only relevant on the degraded
    /// path where no timing exists.
    pub fn stat_seconds(&self) -> f64 {
        self.duration_seconds()
            .unwrap_or_else(|| estimate_spoken_seconds(&self.text))
    }
}

/// Derived speaking-time statistics for one speaker label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerStat {
    pub speaker: String,
    pub total_seconds: f64,
    pub percent: f64,
}

pub(crate) fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'   // hiragana + katakana
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified
        | '\u{AC00}'..='\u{D7AF}' // hangul syllables
        | '\u{F900}'..='\u{FAFF}' // CJK compatibility
    )
}

fn estimate_spoken_seconds(text: &str) -> f64 {
    let cjk_chars = text.chars().filter(|c| is_cjk(*c)).count();
    let words = text
        .split_whitespace()
        .filter(|w| w.chars().any(|c| !is_cjk(c)))
        .count();
    words as f64 * 0.4 + cjk_chars as f64 * 0.25
}

/// Compute per-speaker totals and percentages over a full transcript.
///
/// Speakers appear in first-occurrence order. Percentages sum to 100
/// (within floating-point tolerance) whenever total speaking time is
/// positive; they are all zero when it is zero.
pub fn speaker_stats(segments: &[TranscriptSegment]) -> Vec<SpeakerStat> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: std::collections::HashMap<String, f64> = std::collections::HashMap::new();

    for segment in segments {
        let label = segment
            .speaker
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        if !totals.contains_key(&label) {
            order.push(label.clone());
        }
        *totals.entry(label).or_insert(0.0) += segment.stat_seconds();
    }

    let grand_total: f64 = totals.values().sum();

    order
        .into_iter()
        .map(|speaker| {
            let total_seconds = totals[&speaker];
            let percent = if grand_total > 0.0 {
                total_seconds / grand_total * 100.0
            } else {
                0.0
            };
            SpeakerStat {
                speaker,
                total_seconds,
                percent,
            }
        })
        .collect()
}

/// Assign synthetic speaker labels by rotating through a fixed label set
/// every `period` segments.
///
/// This is NOT diarization: the assignment has no basis in the audio and
/// exists only so the degraded path can produce per-speaker statistics.
/// Results carrying these labels are flagged as synthetic.
pub fn assign_synthetic_speakers(
    segments: Vec<TranscriptSegment>,
    period: usize,
    voices: usize,
) -> Vec<TranscriptSegment> {
    let period = period.max(1);
    let voices = voices.max(1);

    segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| TranscriptSegment {
            speaker: Some(format!("Speaker {}", (i / period) % voices + 1)),
            ..segment
        })
        .collect()
}

/// Sentence-sized spans of `text`, terminators included, in order.
pub(crate) fn sentence_spans(text: &str) -> Vec<&str> {
    static BOUNDARY: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let boundary = BOUNDARY.get_or_init(|| {
        regex::Regex::new(r"[^.!?。！？\n]*[.!?。！？\n]+|[^.!?。！？\n]+$")
            .expect("sentence boundary regex is valid")
    });

    boundary.find_iter(text).map(|m| m.as_str()).collect()
}

/// Split free text into sentence-level segments, keeping terminators.
///
/// Used by the degraded path to turn the live transcript into segments the
/// synthetic speaker heuristic and statistics can work over.
pub fn split_into_segments(text: &str) -> Vec<TranscriptSegment> {
    sentence_spans(text)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(TranscriptSegment::from_text)
        .collect()
}

/// Render segments as the line format the analysis backend receives:
/// `[MM:SS] SPEAKER: text`, dropping fields that are absent.
pub fn render_transcript(segments: &[TranscriptSegment]) -> String {
    let mut lines = Vec::with_capacity(segments.len());

    for segment in segments {
        let text = segment.text.trim();
        if text.is_empty() {
            continue;
        }

        let mut line = String::new();
        if let Some(start) = segment.start {
            let minutes = (start as u64) / 60;
            let seconds = (start as u64) % 60;
            line.push_str(&format!("[{:02}:{:02}] ", minutes, seconds));
        }
        if let Some(speaker) = &segment.speaker {
            line.push_str(speaker);
            line.push_str(": ");
        }
        line.push_str(text);
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(text: &str, start: f64, end: f64, speaker: &str) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start: Some(start),
            end: Some(end),
            speaker: Some(speaker.to_string()),
            confidence: None,
        }
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let segments = vec![
            timed("hello there", 0.0, 12.0, "SPEAKER_00"),
            timed("hi", 12.0, 15.0, "SPEAKER_01"),
            timed("let's begin", 15.0, 30.0, "SPEAKER_00"),
        ];

        let stats = speaker_stats(&segments);
        assert_eq!(stats.len(), 2);

        let sum: f64 = stats.iter().map(|s| s.percent).sum();
        assert!((sum - 100.0).abs() < 0.1, "percent sum was {}", sum);
        assert_eq!(stats[0].speaker, "SPEAKER_00");
        assert!((stats[0].total_seconds - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_duration_yields_zero_percentages() {
        let segments = vec![timed("", 5.0, 5.0, "SPEAKER_00")];
        let stats = speaker_stats(&segments);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].percent, 0.0);
        assert_eq!(stats[0].total_seconds, 0.0);
    }

    #[test]
    fn test_round_robin_two_speakers_period_three() {
        // Six 10-second segments, rotation period 3: the first three belong
        // to Speaker 1, the next three to Speaker 2.
        let segments: Vec<TranscriptSegment> = (0..6)
            .map(|i| TranscriptSegment {
                text: format!("segment {}", i),
                start: Some(i as f64 * 10.0),
                end: Some(i as f64 * 10.0 + 10.0),
                speaker: None,
                confidence: None,
            })
            .collect();

        let labeled = assign_synthetic_speakers(segments, 3, 2);
        assert_eq!(labeled[0].speaker.as_deref(), Some("Speaker 1"));
        assert_eq!(labeled[2].speaker.as_deref(), Some("Speaker 1"));
        assert_eq!(labeled[3].speaker.as_deref(), Some("Speaker 2"));
        assert_eq!(labeled[5].speaker.as_deref(), Some("Speaker 2"));

        let stats = speaker_stats(&labeled);
        assert_eq!(stats.len(), 2);
        let total: f64 = stats.iter().map(|s| s.total_seconds).sum();
        assert!((total - 60.0).abs() < 1e-9);
        assert!((stats[0].percent - 50.0).abs() < 0.1);
        assert!((stats[1].percent - 50.0).abs() < 0.1);
    }

    #[test]
    fn test_rotation_wraps_past_label_set() {
        let segments: Vec<TranscriptSegment> = (0..5)
            .map(|i| TranscriptSegment::from_text(format!("s{}", i)))
            .collect();

        let labeled = assign_synthetic_speakers(segments, 2, 2);
        assert_eq!(labeled[0].speaker.as_deref(), Some("Speaker 1"));
        assert_eq!(labeled[1].speaker.as_deref(), Some("Speaker 1"));
        assert_eq!(labeled[2].speaker.as_deref(), Some("Speaker 2"));
        assert_eq!(labeled[4].speaker.as_deref(), Some("Speaker 1"));
    }

    #[test]
    fn test_split_into_segments_keeps_terminators() {
        let segments = split_into_segments("First point. Second point! Trailing");
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["First point.", "Second point!", "Trailing"]);
    }

    #[test]
    fn test_split_handles_cjk_terminators() {
        let segments = split_into_segments("第一點。第二點！");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "第一點。");
    }

    #[test]
    fn test_render_transcript_full_fields() {
        let segments = vec![timed("Good morning everyone", 65.0, 70.0, "SPEAKER_00")];
        assert_eq!(
            render_transcript(&segments),
            "[01:05] SPEAKER_00: Good morning everyone"
        );
    }

    #[test]
    fn test_render_transcript_text_only() {
        let segments = vec![TranscriptSegment::from_text("just words")];
        assert_eq!(render_transcript(&segments), "just words");
    }

    #[test]
    fn test_untimed_segments_still_produce_stats() {
        let labeled = assign_synthetic_speakers(
            split_into_segments("One two three four. Five six seven eight."),
            1,
            2,
        );
        let stats = speaker_stats(&labeled);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.total_seconds > 0.0));
        let sum: f64 = stats.iter().map(|s| s.percent).sum();
        assert!((sum - 100.0).abs() < 0.1);
    }
}
