//! LLM analysis of meeting transcripts.

pub mod budget;
pub mod client;
pub mod prompt;

pub use budget::{estimate_tokens, LongInputStrategy};
pub use client::ChatAnalysisClient;
pub use prompt::AnalysisKind;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Abstract analysis backend: transcript text in, analysis text out.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, transcript_text: &str, kind: AnalysisKind) -> Result<String>;
}

/// How long inputs are shaped before the analysis call.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub token_budget: usize,
    pub long_input: LongInputStrategy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            token_budget: 80_000,
            long_input: LongInputStrategy::Truncate,
        }
    }
}

/// Run an analysis, shaping over-budget transcripts per the configured
/// strategy. Split parts are analyzed sequentially and concatenated under
/// part headers. Deterministic for a given input, budget and strategy.
pub async fn analyze_transcript(
    service: &dyn AnalysisService,
    transcript_text: &str,
    kind: AnalysisKind,
    options: &AnalysisOptions,
) -> Result<String> {
    let estimated = estimate_tokens(transcript_text);
    if estimated <= options.token_budget {
        return service.analyze(transcript_text, kind).await;
    }

    info!(
        "Transcript estimate {} tokens exceeds budget {}, applying {:?}",
        estimated, options.token_budget, options.long_input
    );

    match options.long_input {
        LongInputStrategy::Truncate => {
            let truncated = budget::truncate_to_budget(transcript_text, options.token_budget);
            service.analyze(truncated, kind).await
        }
        LongInputStrategy::Split => {
            let parts = budget::split_to_budget(transcript_text, options.token_budget);
            let total = parts.len();
            let mut sections = Vec::with_capacity(total);

            for (index, part) in parts.iter().enumerate() {
                let analysis = service.analyze(part, kind).await?;
                sections.push(format!("[Part {}/{}]\n{}", index + 1, total, analysis));
            }

            Ok(sections.join("\n\n"))
        }
    }
}
