//! HTTP client for a chat-completions style analysis backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use super::{AnalysisKind, AnalysisService};

const SYSTEM_PROMPT: &str = "You are a professional meeting analysis assistant. \
Provide clear, structured, and actionable analysis results.";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// First 500 chars of a response body, cut on a char boundary.
fn excerpt(body: &str) -> &str {
    body.char_indices()
        .nth(500)
        .map(|(i, _)| &body[..i])
        .unwrap_or(body)
}

pub struct ChatAnalysisClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatAnalysisClient {
    /// The credential comes from config or the environment, never from
    /// code.
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build analysis HTTP client")?;

        info!("Initialized analysis client for model {}", model);

        Ok(Self {
            client,
            endpoint,
            api_key,
            model,
        })
    }

    async fn call(&self, prompt: String) -> Result<String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 4000,
            top_p: 0.9,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to analysis backend")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read analysis response body")?;

        if !status.is_success() {
            error!(
                "Analysis request failed with status {}: {}",
                status,
                excerpt(&response_text)
            );

            if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(&response_text) {
                anyhow::bail!("analysis backend error ({}): {}", status, parsed.error.message);
            }
            anyhow::bail!(
                "analysis backend returned status {}: {}",
                status,
                excerpt(&response_text)
            );
        }

        let parsed: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse analysis response")?;

        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            anyhow::bail!("analysis backend returned no usable content");
        }

        Ok(content)
    }
}

#[async_trait]
impl AnalysisService for ChatAnalysisClient {
    async fn analyze(&self, transcript_text: &str, kind: AnalysisKind) -> Result<String> {
        debug!(
            "Requesting {} analysis for {} chars of transcript",
            kind.as_str(),
            transcript_text.len()
        );

        let prompt = format!(
            "{}\n\nMeeting transcript:\n{}",
            kind.prompt(),
            transcript_text
        );

        let analysis = self.call(prompt).await?;
        info!("Analysis complete: {} chars", analysis.len());
        Ok(analysis)
    }
}
