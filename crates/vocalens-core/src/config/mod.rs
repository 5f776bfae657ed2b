//! Configuration management for Vocalens.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so an absent file or a partial
//! file both work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Vocalens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vision backend settings
    pub vision: VisionConfig,

    /// Speech backend settings
    pub speech: SpeechConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.vocalens.vocalens/config.toml
    /// - Linux: ~/.config/vocalens/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\vocalens\config\config.toml
    ///
    /// Falls back to ~/.vocalens/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "vocalens", "vocalens")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".vocalens").join("config.toml")
            })
    }

    /// Resolved path of the synthesized speech file (with ~ expansion).
    pub fn speech_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.output.speech_path);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.vision.primary_model, "qwen2-vl-7b-instruct");
        assert_eq!(config.vision.fallback_model, "qwen-vl-max");
        assert_eq!(config.vision.max_tokens, 500);
        assert_eq!(config.speech.model, "tts-1-hd");
        assert_eq!(config.speech.max_input_chars, 4096);
        assert_eq!(config.output.speech_path, "speech.mp3");
        assert!(config.limits.request_timeout_ms.is_none());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[vision]"));
        assert!(toml.contains("[speech]"));
        assert!(toml.contains("${QWEN_API_KEY}"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[speech]\nmodel = \"tts-1\"\n\n[output]\nspeech_path = \"out/voice.mp3\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.speech.model, "tts-1");
        assert_eq!(config.speech.default_voice, crate::speech::Voice::Alloy);
        assert_eq!(config.vision.primary_model, "qwen2-vl-7b-instruct");
        assert_eq!(config.speech_path(), PathBuf::from("out/voice.mp3"));
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vision]\nmax_tokens = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("vision.max_tokens"));
    }

    #[test]
    fn test_default_voice_parsed_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[speech]\ndefault_voice = \"nova\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.speech.default_voice, crate::speech::Voice::Nova);
        assert!(config.to_toml().unwrap().contains("default_voice = \"nova\""));
    }

    #[test]
    fn test_unknown_default_voice_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[speech]\ndefault_voice = \"baritone\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("baritone"));
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vision\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
