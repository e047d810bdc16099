//! Transcript data model and live accumulation.

pub mod accumulator;
pub mod segment;

pub use accumulator::{RecognitionAlternative, RecognitionEvent, TranscriptAccumulator};
pub use segment::{
    assign_synthetic_speakers, render_transcript, speaker_stats, split_into_segments,
    SpeakerStat, TranscriptSegment,
};
