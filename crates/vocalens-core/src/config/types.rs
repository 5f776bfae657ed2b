//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::speech::Voice;

/// Vision backend settings (any OpenAI-compatible chat completions API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// API base URL; `/chat/completions` is appended
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model probed first
    pub primary_model: String,

    /// Model probed when the primary one fails
    pub fallback_model: String,

    /// Instruction sent alongside the image
    pub prompt: String,

    /// Maximum tokens generated per description
    pub max_tokens: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://dashscope-intl.aliyuncs.com/compatible-mode/v1".to_string(),
            api_key: "${QWEN_API_KEY}".to_string(),
            primary_model: "qwen2-vl-7b-instruct".to_string(),
            fallback_model: "qwen-vl-max".to_string(),
            prompt: "Describe the content of the image in detail.".to_string(),
            max_tokens: 500,
        }
    }
}

/// Speech backend settings (OpenAI audio/speech API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// API base URL; `/audio/speech` is appended
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// TTS model. There is no fallback.
    pub model: String,

    /// Voice used when none is chosen
    pub default_voice: Voice,

    /// Longest input accepted by the backend, in characters.
    /// Longer descriptions are truncated to this length.
    pub max_input_chars: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "tts-1-hd".to_string(),
            default_voice: Voice::Alloy,
            max_input_chars: 4096,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where synthesized speech is written. Each synthesis overwrites it.
    pub speech_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            speech_path: "speech.mp3".to_string(),
        }
    }
}

/// Resource limits for uploads and backend calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Per-request timeout in milliseconds. Unset keeps the transport default.
    pub request_timeout_ms: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 10000,
            request_timeout_ms: None,
        }
    }
}

impl LimitsConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
