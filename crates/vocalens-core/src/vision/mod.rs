//! Vision backend: availability probing and image description.
//!
//! The backend is any OpenAI-compatible chat completions API. The probe walks a
//! two-tier model list (primary, then one fallback); description generation
//! sends a single request against whichever model answered.

mod openai;

pub use openai::OpenAiCompatVision;

use crate::config::VisionConfig;
use crate::error::BackendError;
use crate::report::Reporter;
use crate::session::ModelAvailability;
use crate::upload::{ImageInput, UploadedImage};
use async_trait::async_trait;

/// User message content for a chat request.
#[derive(Debug, Clone)]
pub enum UserContent {
    /// Plain text only
    Text(String),
    /// An instruction followed by one image
    TextWithImage { text: String, image: ImageInput },
}

/// A single-turn chat completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub content: UserContent,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// The cheapest request that proves a model is reachable and authorized.
    pub fn probe(model: &str) -> Self {
        Self {
            model: model.to_string(),
            content: UserContent::Text("Test".to_string()),
            max_tokens: 1,
        }
    }

    /// Ask `model` to describe `image` using the configured instruction.
    pub fn describe(model: &str, image: ImageInput, config: &VisionConfig) -> Self {
        Self {
            model: model.to_string(),
            content: UserContent::TextWithImage {
                text: config.prompt.clone(),
                image,
            },
            max_tokens: config.max_tokens,
        }
    }
}

/// What the backend answered.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Content of the first choice, if there was one
    pub text: Option<String>,
    /// Model identifier reported by the backend
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// A remote model that answers chat requests containing images.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (sessions hold a `Box<dyn VisionBackend>`).
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Send one chat request.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;
}

/// Find a responding vision model: the primary first, then the fallback.
///
/// Each model is tried exactly once. Failures are reported, never returned.
pub async fn probe_vision(
    backend: &dyn VisionBackend,
    config: &VisionConfig,
    reporter: &dyn Reporter,
) -> ModelAvailability {
    let primary = &config.primary_model;
    match backend.complete(&ChatRequest::probe(primary)).await {
        Ok(_) => {
            tracing::debug!(backend = backend.name(), model = %primary, "Primary vision model available");
            return ModelAvailability::Available(primary.clone());
        }
        Err(e) => {
            reporter.warning(&format!("Vision model ({primary}) not available: {e}"));
        }
    }

    let fallback = &config.fallback_model;
    match backend.complete(&ChatRequest::probe(fallback)).await {
        Ok(_) => {
            tracing::debug!(backend = backend.name(), model = %fallback, "Fallback vision model available");
            ModelAvailability::Available(fallback.clone())
        }
        Err(e) => {
            reporter.error(&format!(
                "Fallback vision model ({fallback}) not available: {e}"
            ));
            ModelAvailability::Unavailable
        }
    }
}

/// Describe `image` with `model`, or report why not and return `None`.
pub async fn generate_description(
    backend: &dyn VisionBackend,
    image: &UploadedImage,
    model: &str,
    config: &VisionConfig,
    reporter: &dyn Reporter,
) -> Option<String> {
    let input = match image.to_png_base64() {
        Ok(input) => input,
        Err(e) => {
            reporter.error(&format!("Error generating text from image: {e}"));
            return None;
        }
    };

    let request = ChatRequest::describe(model, input, config);
    match backend.complete(&request).await {
        Ok(reply) => match reply.text.filter(|t| !t.trim().is_empty()) {
            Some(text) => {
                tracing::debug!(
                    model = %reply.model,
                    tokens = ?reply.tokens_used,
                    latency_ms = reply.latency_ms,
                    "Description generated"
                );
                Some(text)
            }
            None => {
                reporter.error("Error generating text from image: the model returned no text");
                None
            }
        },
        Err(e) => {
            reporter.error(&format!("Error generating text from image: {e}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use crate::error::BackendErrorKind;
    use crate::report::{RecordingReporter, ReportLevel};
    use crate::upload::tests::sample_bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers per model name; records every request.
    struct ScriptedVision {
        answers: HashMap<String, Result<Option<String>, BackendErrorKind>>,
        calls: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedVision {
        fn new(answers: &[(&str, Result<Option<&str>, BackendErrorKind>)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(m, a)| (m.to_string(), a.map(|t| t.map(String::from))))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn models_called(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.model.clone())
                .collect()
        }
    }

    #[async_trait]
    impl VisionBackend for ScriptedVision {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
            self.calls.lock().unwrap().push(request.clone());
            match self.answers.get(&request.model) {
                Some(Ok(text)) => Ok(ChatReply {
                    text: text.clone(),
                    model: request.model.clone(),
                    tokens_used: None,
                    latency_ms: 1,
                }),
                Some(Err(kind)) => Err(BackendError::new(*kind, "scripted failure")),
                None => Err(BackendError::new(
                    BackendErrorKind::ModelNotFound,
                    "unknown model",
                )),
            }
        }
    }

    fn upload() -> UploadedImage {
        let bytes = sample_bytes(image::ImageFormat::Png, 4, 4);
        UploadedImage::from_bytes(&bytes, &LimitsConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let backend = ScriptedVision::new(&[
            ("qwen2-vl-7b-instruct", Ok(Some("ok"))),
            ("qwen-vl-max", Ok(Some("ok"))),
        ]);
        let reporter = RecordingReporter::new();

        let result = probe_vision(&backend, &VisionConfig::default(), &reporter).await;
        assert_eq!(
            result,
            ModelAvailability::Available("qwen2-vl-7b-instruct".to_string())
        );
        assert_eq!(backend.models_called(), vec!["qwen2-vl-7b-instruct"]);
        assert!(reporter.entries().is_empty());
    }

    #[tokio::test]
    async fn test_primary_failure_uses_fallback() {
        let backend = ScriptedVision::new(&[
            ("qwen2-vl-7b-instruct", Err(BackendErrorKind::ModelNotFound)),
            ("qwen-vl-max", Ok(None)),
        ]);
        let reporter = RecordingReporter::new();

        let result = probe_vision(&backend, &VisionConfig::default(), &reporter).await;
        assert_eq!(result.model(), Some("qwen-vl-max"));
        assert_eq!(
            backend.models_called(),
            vec!["qwen2-vl-7b-instruct", "qwen-vl-max"]
        );
        let warnings = reporter.messages(ReportLevel::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("qwen2-vl-7b-instruct"));
    }

    #[tokio::test]
    async fn test_both_fail_reports_unavailable() {
        let backend = ScriptedVision::new(&[
            ("qwen2-vl-7b-instruct", Err(BackendErrorKind::Auth)),
            ("qwen-vl-max", Err(BackendErrorKind::Auth)),
        ]);
        let reporter = RecordingReporter::new();

        let result = probe_vision(&backend, &VisionConfig::default(), &reporter).await;
        assert_eq!(result, ModelAvailability::Unavailable);
        // Exactly one attempt per model
        assert_eq!(backend.models_called().len(), 2);
        assert_eq!(reporter.messages(ReportLevel::Warning).len(), 1);
        let errors = reporter.messages(ReportLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("qwen-vl-max"));
    }

    #[tokio::test]
    async fn test_probe_request_is_minimal() {
        let backend = ScriptedVision::new(&[("qwen2-vl-7b-instruct", Ok(None))]);
        let reporter = RecordingReporter::new();
        probe_vision(&backend, &VisionConfig::default(), &reporter).await;

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].max_tokens, 1);
        assert!(matches!(&calls[0].content, UserContent::Text(t) if t == "Test"));
    }

    #[tokio::test]
    async fn test_generate_description_returns_text() {
        let backend =
            ScriptedVision::new(&[("qwen-vl-max", Ok(Some("A red kite over a beach.")))]);
        let reporter = RecordingReporter::new();

        let text = generate_description(
            &backend,
            &upload(),
            "qwen-vl-max",
            &VisionConfig::default(),
            &reporter,
        )
        .await;
        assert_eq!(text.as_deref(), Some("A red kite over a beach."));

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].max_tokens, 500);
        match &calls[0].content {
            UserContent::TextWithImage { text, image } => {
                assert_eq!(text, "Describe the content of the image in detail.");
                assert!(image.data_url().starts_with("data:image/png;base64,"));
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_description_swallows_errors() {
        let backend = ScriptedVision::new(&[("qwen-vl-max", Err(BackendErrorKind::RateLimited))]);
        let reporter = RecordingReporter::new();

        let text = generate_description(
            &backend,
            &upload(),
            "qwen-vl-max",
            &VisionConfig::default(),
            &reporter,
        )
        .await;
        assert!(text.is_none());
        let errors = reporter.messages(ReportLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("rate limited"));
    }

    #[tokio::test]
    async fn test_generate_description_rejects_empty_text() {
        let backend = ScriptedVision::new(&[("qwen-vl-max", Ok(Some("   ")))]);
        let reporter = RecordingReporter::new();

        let text = generate_description(
            &backend,
            &upload(),
            "qwen-vl-max",
            &VisionConfig::default(),
            &reporter,
        )
        .await;
        assert!(text.is_none());
        assert_eq!(reporter.messages(ReportLevel::Error).len(), 1);
    }
}
