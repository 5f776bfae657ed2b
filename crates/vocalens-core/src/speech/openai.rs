//! OpenAI `audio/speech` client. The response body is MP3, streamed.

use super::{AudioStream, SpeechBackend, SpeechRequest, Voice};
use crate::credentials::ApiKey;
use crate::error::{BackendError, BackendErrorKind};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;
use std::time::Duration;

pub struct OpenAiSpeech {
    api_key: ApiKey,
    client: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl OpenAiSpeech {
    /// `base_url` is the API root; `/audio/speech` is appended.
    pub fn new(base_url: &str, api_key: &ApiKey, timeout: Option<Duration>) -> Self {
        Self {
            api_key: api_key.clone(),
            client: reqwest::Client::new(),
            endpoint: format!("{}/audio/speech", base_url.trim_end_matches('/')),
            timeout,
        }
    }
}

#[derive(Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    voice: Voice,
    input: &'a str,
    response_format: &'static str,
}

impl<'a> From<&'a SpeechRequest> for SpeechBody<'a> {
    fn from(request: &'a SpeechRequest) -> Self {
        Self {
            model: &request.model,
            voice: request.voice,
            input: &request.input,
            response_format: "mp3",
        }
    }
}

#[async_trait]
impl SpeechBackend for OpenAiSpeech {
    fn name(&self) -> &str {
        "openai-speech"
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, BackendError> {
        let api_key = self
            .api_key
            .value
            .as_deref()
            .ok_or_else(|| BackendError::missing_key(self.api_key.hint()))?;

        let mut builder = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&SpeechBody::from(request));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await.map_err(|e| {
            BackendError::new(
                BackendErrorKind::Transport,
                format!("Speech request failed: {e}"),
            )
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status.as_u16(), text.trim()));
        }

        let stream = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(BackendError::from));
        Ok(Box::pin(stream))
    }
}
