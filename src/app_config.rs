use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language name or code
    pub source_language: String,

    /// Target language name or code
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Transcript merge config
    #[serde(default)]
    pub merge: MergeConfig,

    /// Transcription config
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// OpenAI API keys, semicolon-separated for a pool
    #[serde(default = "String::new")]
    pub openai_api_key: String,

    /// DeepSeek API keys, semicolon-separated for a pool
    #[serde(default = "String::new")]
    pub deepseek_api_key: String,

    /// Model identifier passed to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum segments per request, margins included
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Context segments on each side of a batch
    #[serde(default = "default_margin")]
    pub margin: usize,

    /// Also write a bilingual subtitle file alongside the translation
    #[serde(default)]
    pub bilingual: bool,

    /// Override for the prompt cache directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            deepseek_api_key: String::new(),
            model: default_model(),
            max_batch_size: default_max_batch_size(),
            margin: default_margin(),
            bilingual: false,
            cache_dir: None,
        }
    }
}

/// Configuration for merging short transcript segments
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MergeConfig {
    /// Maximum gap between two segments for them to be merged
    #[serde(default = "default_merge_threshold_ms")]
    pub threshold_ms: u64,

    /// Maximum combined text length of a merged segment
    #[serde(default = "default_merge_max_length")]
    pub max_length: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            threshold_ms: default_merge_threshold_ms(),
            max_length: default_merge_max_length(),
        }
    }
}

/// Configuration for audio transcription
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// Whisper executable to invoke
    #[serde(default = "default_whisper_command")]
    pub whisper_command: String,

    /// Whisper model name
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            whisper_command: default_whisper_command(),
            whisper_model: default_whisper_model(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_batch_size() -> usize {
    100
}

fn default_margin() -> usize {
    3
}

fn default_merge_threshold_ms() -> u64 {
    7_000
}

fn default_merge_max_length() -> usize {
    100
}

fn default_whisper_command() -> String {
    "whisper".to_string()
}

fn default_whisper_model() -> String {
    "base".to_string()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language must not be empty"));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }

        // Batch windows must leave room for a positive middle span
        if self.translation.max_batch_size <= 2 * self.translation.margin {
            return Err(anyhow!(
                "max_batch_size ({}) must be greater than twice the margin ({})",
                self.translation.max_batch_size,
                self.translation.margin
            ));
        }

        if self.merge.max_length == 0 {
            return Err(anyhow!("merge.max_length must be greater than zero"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "English".to_string(),
            target_language: "Polish".to_string(),
            translation: TranslationConfig::default(),
            merge: MergeConfig::default(),
            transcription: TranscriptionConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaultConfig_shouldValidate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_withOversizedMargin_shouldFail() {
        let mut config = Config::default();
        config.translation.max_batch_size = 6;
        config.translation.margin = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_withEmptyLanguage_shouldFail() {
        let mut config = Config::default();
        config.target_language = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_withPartialJson_shouldFillDefaults() {
        let json = r#"{"source_language": "English", "target_language": "French"}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.translation.model, "gpt-4o");
        assert_eq!(config.translation.max_batch_size, 100);
        assert_eq!(config.translation.margin, 3);
        assert_eq!(config.merge.threshold_ms, 7_000);
        assert_eq!(config.merge.max_length, 100);
        assert_eq!(config.log_level, LogLevel::Info);
    }
}
