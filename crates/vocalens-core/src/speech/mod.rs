//! Speech backend: availability probing and text-to-speech synthesis.
//!
//! A single TTS model is probed with no fallback. Synthesis sends only the
//! first `max_input_chars` characters of the text and streams the audio into
//! one fixed output file, replacing whatever was there.

mod openai;

pub use openai::OpenAiSpeech;

use crate::config::{Config, SpeechConfig};
use crate::error::{BackendError, VocalensError};
use crate::report::Reporter;
use crate::session::ModelAvailability;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Voice timbres offered by the speech backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    /// Every voice, in menu order.
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown voice '{0}' (expected one of alloy, echo, fable, onyx, nova, shimmer)")]
pub struct UnknownVoice(pub String);

impl FromStr for Voice {
    type Err = UnknownVoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVoice(s.to_string()))
    }
}

/// One text-to-speech call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub model: String,
    pub voice: Voice,
    pub input: String,
}

impl SpeechRequest {
    /// The cheapest synthesis that proves the model is reachable and authorized.
    pub fn probe(model: &str) -> Self {
        Self {
            model: model.to_string(),
            voice: Voice::Alloy,
            input: "Test".to_string(),
        }
    }
}

/// Audio bytes as the backend delivers them.
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, BackendError>> + Send>>;

/// A remote text-to-speech model producing MP3 audio.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Start a synthesis. Errors before the first byte are returned here;
    /// errors mid-body arrive through the stream.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, BackendError>;
}

/// Audio written to disk by a successful synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedSpeech {
    pub path: PathBuf,
    pub bytes_written: u64,
}

/// Check the single configured TTS model. There is no fallback.
pub async fn probe_tts(
    backend: &dyn SpeechBackend,
    config: &SpeechConfig,
    reporter: &dyn Reporter,
) -> ModelAvailability {
    let model = &config.model;
    match backend.synthesize(&SpeechRequest::probe(model)).await {
        Ok(_) => {
            tracing::debug!(backend = backend.name(), model = %model, "Speech model available");
            ModelAvailability::Available(model.clone())
        }
        Err(e) => {
            reporter.error(&format!("Speech model ({model}) not available: {e}"));
            reporter.warning(
                "Text-to-speech is unavailable. Only the text description will be shown.",
            );
            ModelAvailability::Unavailable
        }
    }
}

/// Split `text` into slices of at most `max_chars` characters.
///
/// Slices end on character boundaries, never inside a multi-byte sequence.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// The part of `text` that gets synthesized: its first `max_chars` characters.
pub fn first_chunk(text: &str, max_chars: usize) -> &str {
    chunk_text(text, max_chars).into_iter().next().unwrap_or("")
}

/// Synthesize `text` with `voice` and write the audio to the configured path.
///
/// Text beyond `speech.max_input_chars` is dropped. Any existing file at the
/// output path is replaced. Failures are reported and yield `None`.
pub async fn synthesize(
    backend: &dyn SpeechBackend,
    text: &str,
    voice: Voice,
    model: &str,
    config: &Config,
    reporter: &dyn Reporter,
) -> Option<SynthesizedSpeech> {
    let max_chars = config.speech.max_input_chars;
    let input = first_chunk(text, max_chars);
    if input.len() < text.len() {
        tracing::debug!(
            chars = text.chars().count(),
            max_chars,
            "Description truncated for speech synthesis"
        );
    }

    let request = SpeechRequest {
        model: model.to_string(),
        voice,
        input: input.to_string(),
    };

    let stream = match backend.synthesize(&request).await {
        Ok(stream) => stream,
        Err(e) => {
            reporter.error(&format!("Error in text-to-speech conversion: {e}"));
            return None;
        }
    };

    let path = config.speech_path();
    match write_stream(&path, stream).await {
        Ok(bytes_written) => {
            tracing::debug!(path = %path.display(), bytes_written, "Speech written");
            Some(SynthesizedSpeech {
                path,
                bytes_written,
            })
        }
        Err(e) => {
            reporter.error(&format!(
                "Error in text-to-speech conversion: {e} ({})",
                path.display()
            ));
            None
        }
    }
}

/// Stream audio into `path`, truncating it first. Returns bytes written.
///
/// A failure after the file was created removes it.
async fn write_stream(path: &Path, mut stream: AudioStream) -> Result<u64, VocalensError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::File::create(path).await?;

    let result = async {
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok::<u64, VocalensError>(written)
    }
    .await;

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::debug!("Could not remove partial speech file: {e}");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendErrorKind;
    use crate::report::{RecordingReporter, ReportLevel};
    use std::sync::Mutex;

    /// Returns fixed audio chunks, or fails; records every request.
    struct ScriptedSpeech {
        outcome: Result<Vec<Result<Vec<u8>, BackendErrorKind>>, BackendErrorKind>,
        calls: Mutex<Vec<SpeechRequest>>,
    }

    impl ScriptedSpeech {
        fn ok(chunks: &[&str]) -> Self {
            Self {
                outcome: Ok(chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(kind: BackendErrorKind) -> Self {
            Self {
                outcome: Err(kind),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn broken_mid_stream() -> Self {
            Self {
                outcome: Ok(vec![Ok(b"ID3".to_vec()), Err(BackendErrorKind::Transport)]),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechBackend for ScriptedSpeech {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, BackendError> {
            self.calls.lock().unwrap().push(request.clone());
            match &self.outcome {
                Ok(chunks) => {
                    let items: Vec<Result<Vec<u8>, BackendError>> = chunks
                        .iter()
                        .map(|c| {
                            c.clone()
                                .map_err(|kind| BackendError::new(kind, "connection reset"))
                        })
                        .collect();
                    Ok(Box::pin(futures_util::stream::iter(items)))
                }
                Err(kind) => Err(BackendError::new(*kind, "scripted failure")),
            }
        }
    }

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.output.speech_path = dir.join("speech.mp3").to_string_lossy().into_owned();
        config
    }

    #[test]
    fn test_voice_parse_and_display() {
        for voice in Voice::ALL {
            assert_eq!(voice.to_string().parse::<Voice>().unwrap(), voice);
        }
        assert_eq!("nova".parse::<Voice>().unwrap(), Voice::Nova);
        assert!("Nova".parse::<Voice>().is_err());
        assert_eq!(
            "baritone".parse::<Voice>().unwrap_err(),
            UnknownVoice("baritone".to_string())
        );
    }

    #[test]
    fn test_voice_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Voice::Shimmer).unwrap(), "\"shimmer\"");
    }

    #[test]
    fn test_chunk_text_splits_at_limit() {
        let text = "a".repeat(10_000);
        let chunks = chunk_text(&text, 4096);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 4096);
        assert_eq!(chunks[2].len(), 10_000 - 2 * 4096);
    }

    #[test]
    fn test_chunk_text_counts_characters_not_bytes() {
        let text = "é".repeat(5);
        let chunks = chunk_text(&text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
        assert_eq!(first_chunk(&text, 3), "ééé");
    }

    #[test]
    fn test_first_chunk_short_and_empty() {
        assert_eq!(first_chunk("short", 4096), "short");
        assert_eq!(first_chunk("", 4096), "");
        assert!(chunk_text("", 4096).is_empty());
    }

    #[tokio::test]
    async fn test_probe_success() {
        let backend = ScriptedSpeech::ok(&["audio"]);
        let reporter = RecordingReporter::new();
        let result = probe_tts(&backend, &SpeechConfig::default(), &reporter).await;

        assert_eq!(result, ModelAvailability::Available("tts-1-hd".to_string()));
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[SpeechRequest::probe("tts-1-hd")]);
        assert!(reporter.entries().is_empty());
    }

    #[tokio::test]
    async fn test_probe_failure_reports_error_then_warning() {
        let backend = ScriptedSpeech::failing(BackendErrorKind::Auth);
        let reporter = RecordingReporter::new();
        let result = probe_tts(&backend, &SpeechConfig::default(), &reporter).await;

        assert_eq!(result, ModelAvailability::Unavailable);
        // Single attempt, no fallback model
        assert_eq!(backend.calls.lock().unwrap().len(), 1);
        let entries = reporter.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, ReportLevel::Error);
        assert!(entries[0].1.contains("tts-1-hd"));
        assert_eq!(entries[1].0, ReportLevel::Warning);
    }

    #[tokio::test]
    async fn test_synthesize_truncates_to_first_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let backend = ScriptedSpeech::ok(&["mp3"]);
        let reporter = RecordingReporter::new();

        let text = format!("{}{}", "x".repeat(4096), "y".repeat(500));
        synthesize(&backend, &text, Voice::Echo, "tts-1-hd", &config, &reporter)
            .await
            .unwrap();

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input, "x".repeat(4096));
        assert!(!calls[0].input.contains('y'));
        assert_eq!(calls[0].voice, Voice::Echo);
    }

    #[tokio::test]
    async fn test_synthesize_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let reporter = RecordingReporter::new();

        let first = ScriptedSpeech::ok(&["first synthesis, a longer payload"]);
        synthesize(&first, "one", Voice::Alloy, "tts-1-hd", &config, &reporter)
            .await
            .unwrap();

        let second = ScriptedSpeech::ok(&["sec", "ond"]);
        let speech = synthesize(&second, "two", Voice::Alloy, "tts-1-hd", &config, &reporter)
            .await
            .unwrap();

        assert_eq!(speech.path, config.speech_path());
        assert_eq!(speech.bytes_written, 6);
        assert_eq!(std::fs::read(&speech.path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_synthesize_failure_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(config.speech_path(), b"earlier").unwrap();
        let reporter = RecordingReporter::new();

        let backend = ScriptedSpeech::failing(BackendErrorKind::RateLimited);
        let result =
            synthesize(&backend, "text", Voice::Onyx, "tts-1-hd", &config, &reporter).await;

        assert!(result.is_none());
        assert_eq!(std::fs::read(config.speech_path()).unwrap(), b"earlier");
        let errors = reporter.messages(ReportLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("rate limited"));
    }

    #[tokio::test]
    async fn test_synthesize_stream_error_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let reporter = RecordingReporter::new();

        let backend = ScriptedSpeech::broken_mid_stream();
        let result =
            synthesize(&backend, "text", Voice::Fable, "tts-1-hd", &config, &reporter).await;

        assert!(result.is_none());
        assert!(!config.speech_path().exists());
        assert_eq!(reporter.messages(ReportLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_write_stream_keeps_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.mp3");
        let backend = ScriptedSpeech::broken_mid_stream();
        let stream = backend
            .synthesize(&SpeechRequest::probe("tts-1-hd"))
            .await
            .unwrap();

        let err = write_stream(&path, stream).await.unwrap_err();
        assert!(matches!(
            err,
            VocalensError::Backend(BackendError {
                kind: BackendErrorKind::Transport,
                ..
            })
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_write_stream_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, b"").unwrap();
        let backend = ScriptedSpeech::ok(&["abc"]);
        let stream = backend
            .synthesize(&SpeechRequest::probe("tts-1-hd"))
            .await
            .unwrap();

        let err = write_stream(&blocker.join("speech.mp3"), stream)
            .await
            .unwrap_err();
        assert!(matches!(err, VocalensError::Io(_)));
        assert!(blocker.is_file());
    }

    #[tokio::test]
    async fn test_synthesize_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.output.speech_path = dir
            .path()
            .join("nested/out.mp3")
            .to_string_lossy()
            .into_owned();
        let reporter = RecordingReporter::new();

        let backend = ScriptedSpeech::ok(&["abc"]);
        let speech = synthesize(&backend, "hi", Voice::Nova, "tts-1-hd", &config, &reporter)
            .await
            .unwrap();
        assert_eq!(std::fs::read(speech.path).unwrap(), b"abc");
    }
}
