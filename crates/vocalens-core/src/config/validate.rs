//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.vision.endpoint, "vision.endpoint")?;
        require_non_empty(&self.vision.primary_model, "vision.primary_model")?;
        require_non_empty(&self.vision.fallback_model, "vision.fallback_model")?;
        require_non_empty(&self.vision.prompt, "vision.prompt")?;
        if self.vision.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "vision.max_tokens must be > 0".into(),
            ));
        }

        require_non_empty(&self.speech.endpoint, "speech.endpoint")?;
        require_non_empty(&self.speech.model, "speech.model")?;
        if self.speech.max_input_chars == 0 {
            return Err(ConfigError::ValidationError(
                "speech.max_input_chars must be > 0".into(),
            ));
        }

        require_non_empty(&self.output.speech_path, "output.speech_path")?;

        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0 when set".into(),
            ));
        }
        Ok(())
    }
}
