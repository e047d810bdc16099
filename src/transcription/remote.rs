//! HTTP client for the transcription jobs API.
//!
//! Submits audio as a streamed multipart upload, then either consumes an
//! immediate result or polls `GET /job/{id}/status` at a fixed interval
//! until the wall-clock budget runs out.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::{debug, error, info, warn};

use super::{TranscribeOptions, TranscriptionBackend, TranscriptionOutcome};
use crate::transcript::TranscriptSegment;

#[derive(Debug, Deserialize)]
struct SegmentDto {
    text: String,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    speaker: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

impl From<SegmentDto> for TranscriptSegment {
    fn from(dto: SegmentDto) -> Self {
        Self {
            text: dto.text,
            start: dto.start,
            end: dto.end,
            speaker: dto.speaker,
            confidence: dto.confidence,
        }
    }
}

/// Response shared by submission and status polling.
#[derive(Debug, Deserialize)]
struct JobResponse {
    job_id: String,
    status: JobStatus,
    #[serde(default)]
    transcript: Option<Vec<SegmentDto>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// First 500 chars of a response body, cut on a char boundary.
fn excerpt(body: &str) -> &str {
    body.char_indices()
        .nth(500)
        .map(|(i, _)| &body[..i])
        .unwrap_or(body)
}

pub struct RemoteTranscriptionBackend {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl RemoteTranscriptionBackend {
    pub fn new(base_url: &str, poll_interval: Duration, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build transcription HTTP client")?;

        info!("Initialized transcription backend at {}", base_url);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval,
            timeout,
        })
    }

    async fn submit(&self, audio_path: &Path, options: &TranscribeOptions) -> Result<JobResponse> {
        let url = format!("{}/process-audio", self.base_url);

        let filename = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let mime_type = match audio_path.extension().and_then(|e| e.to_str()) {
            Some("wav") => "audio/wav",
            Some("mp3") => "audio/mpeg",
            Some("m4a") => "audio/mp4",
            Some("flac") => "audio/flac",
            Some("ogg") => "audio/ogg",
            Some("opus") => "audio/opus",
            Some("webm") => "audio/webm",
            _ => "application/octet-stream",
        };

        // Stream the file so long recordings are not buffered in memory.
        let file = tokio::fs::File::open(audio_path)
            .await
            .context("Failed to open audio file for upload")?;
        let stream = FramedRead::new(file, BytesCodec::new());

        let mut form = Form::new()
            .part(
                "file",
                Part::stream(Body::wrap_stream(stream))
                    .file_name(filename)
                    .mime_str(mime_type)?,
            )
            .text("language", options.language.clone())
            .text("async", "true");

        if let Some(num_speakers) = options.num_speakers {
            form = form.text("num_speakers", num_speakers.to_string());
        }
        if let Some(analysis_type) = &options.analysis_type {
            form = form.text("analysis_type", analysis_type.clone());
        }

        debug!("Submitting audio {:?} for transcription", audio_path);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .context("Failed to submit audio to transcription backend")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read submission response body")?;

        if !status.is_success() {
            error!(
                "Transcription submission failed with status {}: {}",
                status,
                excerpt(&body)
            );
            anyhow::bail!("transcription submission failed ({}): {}", status, body);
        }

        serde_json::from_str(&body).context("Failed to parse submission response")
    }

    async fn poll(&self, job_id: &str) -> Result<JobResponse> {
        let url = format!("{}/job/{}/status", self.base_url, job_id);
        let max_attempts =
            (self.timeout.as_secs() / self.poll_interval.as_secs().max(1)).max(1);

        for attempt in 1..=max_attempts {
            let response = self
                .client
                .get(&url)
                .timeout(self.poll_interval * 2)
                .send()
                .await
                .context("Failed to poll job status")?;

            let status = response.status();
            let body = response
                .text()
                .await
                .context("Failed to read poll response body")?;

            if !status.is_success() {
                anyhow::bail!("job status request failed ({}): {}", status, body);
            }

            let job: JobResponse =
                serde_json::from_str(&body).context("Failed to parse job status response")?;

            match job.status {
                JobStatus::Completed | JobStatus::Failed => return Ok(job),
                JobStatus::Pending | JobStatus::Processing => {
                    if attempt % 30 == 0 {
                        warn!(
                            "Transcription job {} still running after {}s",
                            job_id,
                            attempt * self.poll_interval.as_secs()
                        );
                    }
                    sleep(self.poll_interval).await;
                }
            }
        }

        anyhow::bail!(
            "transcription timed out after {} seconds",
            self.timeout.as_secs()
        )
    }

    fn finish(job: JobResponse) -> Result<TranscriptionOutcome> {
        match job.status {
            JobStatus::Completed => {
                let segments: Vec<TranscriptSegment> = job
                    .transcript
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect();

                if segments.is_empty() {
                    anyhow::bail!("transcription completed but returned no segments");
                }

                info!(
                    "Transcription job {} complete: {} segments",
                    job.job_id,
                    segments.len()
                );

                Ok(TranscriptionOutcome {
                    job_id: job.job_id,
                    segments,
                })
            }
            JobStatus::Failed => {
                let message = job.error.unwrap_or_else(|| "unknown error".to_string());
                error!("Transcription job {} failed: {}", job.job_id, message);
                anyhow::bail!("transcription failed: {}", message)
            }
            _ => anyhow::bail!("transcription job ended in a non-terminal state"),
        }
    }
}

#[async_trait]
impl TranscriptionBackend for RemoteTranscriptionBackend {
    async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Health probe failed")?;

        if !response.status().is_success() {
            anyhow::bail!("health probe returned status {}", response.status());
        }

        Ok(())
    }

    async fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<TranscriptionOutcome> {
        info!("Transcribing {:?} via remote backend", audio_path);

        let submitted = self.submit(audio_path, options).await?;

        // The backend may answer synchronously for short clips.
        let job = match submitted.status {
            JobStatus::Completed | JobStatus::Failed => submitted,
            JobStatus::Pending | JobStatus::Processing => {
                info!("Transcription job submitted: {}", submitted.job_id);
                self.poll(&submitted.job_id).await?
            }
        };

        Self::finish(job)
    }
}
