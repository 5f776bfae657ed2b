//! API key resolution for the two backends.
//!
//! Keys are resolved once at startup. A missing key is not an error here: the
//! backend client carries the absence forward and the first call fails with an
//! authorization error, which the probes report like any other failure.

use crate::config::Config;

/// One backend's API key and where it was expected to come from.
#[derive(Clone, Default)]
pub struct ApiKey {
    /// The config value it was resolved from, e.g. `${QWEN_API_KEY}`
    pub source: String,
    pub value: Option<String>,
}

impl ApiKey {
    pub fn resolve(source: &str) -> Self {
        Self {
            source: source.to_string(),
            value: resolve_env_var(source),
        }
    }

    fn env_var(&self) -> Option<&str> {
        self.source
            .strip_prefix("${")
            .and_then(|s| s.strip_suffix('}'))
    }

    /// Name shown to the user when the key is missing.
    pub fn hint(&self) -> &str {
        self.env_var().unwrap_or("the configured api_key")
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Literal keys live in `source` too.
        f.debug_struct("ApiKey")
            .field("source", &self.env_var().unwrap_or("<literal>"))
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolved keys for the vision and speech backends.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub vision: ApiKey,
    pub speech: ApiKey,
}

impl Credentials {
    pub fn from_config(config: &Config) -> Self {
        let credentials = Self {
            vision: ApiKey::resolve(&config.vision.api_key),
            speech: ApiKey::resolve(&config.speech.api_key),
        };
        tracing::debug!(
            vision_key = credentials.vision.value.is_some(),
            speech_key = credentials.speech.value.is_some(),
            "Resolved API keys"
        );
        credentials
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
