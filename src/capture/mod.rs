//! Microphone capture with a chunked in-memory sink.

pub mod mic;

pub use mic::MicInput;

use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Trait for audio inputs feeding a capture session. The input pushes
/// samples into the shared sink as they arrive; the session owns the
/// sink and the lifecycle.
pub trait AudioInput: Send {
    fn start(&mut self, sink: Arc<Mutex<ChunkedSink>>) -> Result<()>;

    /// Stop capturing and release the underlying device. Must leave the
    /// OS capture indicator off.
    fn stop(&mut self) -> Result<()>;

    fn is_active(&self) -> bool;

    fn sample_rate(&self) -> u32;
}

/// Collects samples into fixed-duration chunks in delivery order, so
/// partial audio survives a crash mid-recording. Chunks are only ever
/// appended; finalization concatenates them in the same order.
#[derive(Debug)]
pub struct ChunkedSink {
    chunk_samples: usize,
    chunks: Vec<Vec<f32>>,
    pending: Vec<f32>,
}

impl ChunkedSink {
    pub fn new(chunk_samples: usize) -> Self {
        Self {
            chunk_samples: chunk_samples.max(1),
            chunks: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, samples: &[f32]) {
        self.pending.extend_from_slice(samples);
        while self.pending.len() >= self.chunk_samples {
            let rest = self.pending.split_off(self.chunk_samples);
            let chunk = std::mem::replace(&mut self.pending, rest);
            self.chunks.push(chunk);
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Concatenate all chunks plus the unfinished tail, in delivery
    /// order, and reset the sink.
    pub fn finalize(&mut self) -> Vec<f32> {
        let mut samples =
            Vec::with_capacity(self.chunks.iter().map(Vec::len).sum::<usize>() + self.pending.len());
        for chunk in self.chunks.drain(..) {
            samples.extend(chunk);
        }
        samples.extend(self.pending.drain(..));
        samples
    }
}

/// A finalized mono recording.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        info!("Recording saved: {:?} ({} samples)", path, self.samples.len());
        Ok(())
    }
}

/// Owns the microphone for the duration of one recording. Exactly one
/// session is active at a time; `start` while recording and `stop` while
/// idle are both no-ops.
pub struct CaptureSession {
    input: Box<dyn AudioInput>,
    sink: Arc<Mutex<ChunkedSink>>,
    recording: bool,
}

impl CaptureSession {
    /// `chunk_seconds` is the chunking interval of the sink (1 second in
    /// normal operation).
    pub fn new(input: Box<dyn AudioInput>, chunk_seconds: f64) -> Self {
        let chunk_samples = (input.sample_rate() as f64 * chunk_seconds).max(1.0) as usize;
        Self {
            input,
            sink: Arc::new(Mutex::new(ChunkedSink::new(chunk_samples))),
            recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn start(&mut self) -> Result<()> {
        if self.recording {
            warn!("Capture already running, ignoring start");
            return Ok(());
        }

        self.input.start(Arc::clone(&self.sink))?;
        self.recording = true;
        info!("Capture started at {} Hz", self.input.sample_rate());
        Ok(())
    }

    /// Stop capturing and return the finalized clip, or `None` when no
    /// recording was running.
    pub fn stop(&mut self) -> Result<Option<AudioClip>> {
        if !self.recording {
            return Ok(None);
        }

        self.input.stop()?;
        self.recording = false;

        let samples = self.sink.lock().unwrap().finalize();
        info!("Capture stopped, {} samples collected", samples.len());

        Ok(Some(AudioClip {
            samples,
            sample_rate: self.input.sample_rate(),
        }))
    }
}
