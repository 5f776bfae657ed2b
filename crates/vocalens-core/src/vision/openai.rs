//! OpenAI-compatible Chat Completions client.
//!
//! Sends the image via data URL in the user message content array. Works with
//! any provider exposing the same wire format (DashScope compatible mode,
//! OpenAI, self-hosted gateways).

use super::{ChatReply, ChatRequest, UserContent, VisionBackend};
use crate::credentials::ApiKey;
use crate::error::{BackendError, BackendErrorKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Vision backend speaking the Chat Completions protocol.
pub struct OpenAiCompatVision {
    api_key: ApiKey,
    client: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl OpenAiCompatVision {
    /// `base_url` is the API root; `/chat/completions` is appended.
    pub fn new(base_url: &str, api_key: &ApiKey, timeout: Option<Duration>) -> Self {
        Self {
            api_key: api_key.clone(),
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentPart<'a> {
    #[serde(rename = "text")]
    Text { text: &'a str },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

impl<'a> ChatBody<'a> {
    fn from_request(request: &'a ChatRequest) -> Self {
        let content = match &request.content {
            UserContent::Text(text) => MessageContent::Text(text),
            UserContent::TextWithImage { text, image } => MessageContent::Parts(vec![
                ContentPart::Text { text },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                },
            ]),
        };
        Self {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            max_tokens: request.max_tokens,
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[async_trait]
impl VisionBackend for OpenAiCompatVision {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let api_key = self
            .api_key
            .value
            .as_deref()
            .ok_or_else(|| BackendError::missing_key(self.api_key.hint()))?;

        let start = Instant::now();
        let body = ChatBody::from_request(request);

        let mut builder = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await.map_err(|e| {
            BackendError::new(
                BackendErrorKind::Transport,
                format!("Chat completions request failed: {e}"),
            )
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status.as_u16(), text.trim()));
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| {
            BackendError::new(
                BackendErrorKind::MalformedResponse,
                format!("Failed to parse chat completions response: {e}"),
            )
        })?;

        let text = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string());

        Ok(ChatReply {
            text,
            model: chat_resp.model.unwrap_or_else(|| request.model.clone()),
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
