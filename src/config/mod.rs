use crate::analysis::{AnalysisKind, LongInputStrategy};
use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub analysis: AnalysisConfig,
    pub capture: CaptureConfig,
    pub recognition: RecognitionConfig,
    pub speakers: SpeakerConfig,
    pub behavior: BehaviorConfig,
    pub api: ApiConfig,
}

/// Remote transcription + diarization backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// When false, every recording goes through the live-transcript path.
    pub enabled: bool,
    pub base_url: String,
    /// Language code forwarded with every request ("en", "zh", "auto").
    pub language: String,
    /// Exact speaker count hint, when known ahead of the meeting.
    pub num_speakers: Option<u32>,
    pub poll_interval_seconds: u64,
    /// Wall-clock budget for one transcription job.
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://127.0.0.1:8000".to_string(),
            language: "auto".to_string(),
            num_speakers: None,
            poll_interval_seconds: 3,
            timeout_seconds: 360,
        }
    }
}

/// LLM analysis backend. The API key is read from
/// `MEETSCRIBE_ANALYSIS_API_KEY` when not set here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub token_budget: usize,
    pub long_input: LongInputStrategy,
    pub timeout_seconds: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            api_key: None,
            model: "google/gemma-3-27b-it:free".to_string(),
            token_budget: 80_000,
            long_input: LongInputStrategy::Truncate,
            timeout_seconds: 60,
        }
    }
}

impl AnalysisConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("MEETSCRIBE_ANALYSIS_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub sample_rate: u32,
    /// Chunking interval of the in-memory sink.
    pub chunk_seconds: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            chunk_seconds: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Debounce before restarting an engine that ended on its own.
    pub restart_delay_ms: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: 300,
        }
    }
}

/// Synthetic speaker heuristic used on the degraded path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerConfig {
    /// Segments per synthetic speaker turn.
    pub rotation_period: usize,
    /// Size of the synthetic label set.
    pub voices: usize,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            rotation_period: 3,
            voices: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub copy_to_clipboard: bool,
    pub default_analysis: AnalysisKind,
    pub delete_audio_files: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            copy_to_clipboard: true,
            default_analysis: AnalysisKind::Summary,
            delete_audio_files: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 3870 }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.backend.base_url, config.backend.base_url);
        assert_eq!(parsed.capture.sample_rate, 16_000);
        assert_eq!(parsed.speakers.rotation_period, 3);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [backend]
            base_url = "http://transcribe.internal:9000"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.backend.base_url, "http://transcribe.internal:9000");
        assert!(parsed.backend.enabled);
        assert_eq!(parsed.analysis.token_budget, 80_000);
    }
}
