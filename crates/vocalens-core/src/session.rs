//! Session orchestration: probe both backends, then describe images and read
//! the descriptions aloud.
//!
//! A session holds the probe results for its lifetime and nothing else.
//! Starting a new session probes again.

use crate::config::Config;
use crate::error::SessionError;
use crate::report::{Reporter, Step};
use crate::speech::{self, SpeechBackend, SynthesizedSpeech, Voice};
use crate::upload::UploadedImage;
use crate::vision::{self, VisionBackend};

/// Result of probing one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelAvailability {
    /// This model answered
    Available(String),
    Unavailable,
}

impl ModelAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Available(model) => Some(model),
            Self::Unavailable => None,
        }
    }
}

/// What one run produced. Absent parts were reported as they failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub description: Option<String>,
    pub speech: Option<SynthesizedSpeech>,
}

/// Probed backends ready to process images.
pub struct Session {
    vision: Box<dyn VisionBackend>,
    speech: Box<dyn SpeechBackend>,
    config: Config,
    vision_model: String,
    speech_availability: ModelAvailability,
}

impl Session {
    /// Probe vision, then speech.
    ///
    /// Fails only when no vision model answers; a missing speech model just
    /// leaves the session without audio.
    pub async fn start(
        vision: Box<dyn VisionBackend>,
        speech: Box<dyn SpeechBackend>,
        config: Config,
        reporter: &dyn Reporter,
    ) -> Result<Self, SessionError> {
        reporter.begin(Step::Probing);
        let vision_availability =
            vision::probe_vision(vision.as_ref(), &config.vision, reporter).await;
        let vision_model = match vision_availability {
            ModelAvailability::Available(model) => model,
            ModelAvailability::Unavailable => {
                reporter.end(Step::Probing);
                reporter.error(
                    "No vision model available. Check your API key or the models enabled for your account.",
                );
                return Err(SessionError::VisionUnavailable {
                    primary: config.vision.primary_model.clone(),
                    fallback: config.vision.fallback_model.clone(),
                });
            }
        };
        reporter.success(&format!("Using vision model: {vision_model}"));

        let speech_availability =
            speech::probe_tts(speech.as_ref(), &config.speech, reporter).await;
        reporter.end(Step::Probing);
        if let Some(model) = speech_availability.model() {
            reporter.success(&format!("Using speech model: {model}"));
        }

        Ok(Self {
            vision,
            speech,
            config,
            vision_model,
            speech_availability,
        })
    }

    pub fn vision_model(&self) -> &str {
        &self.vision_model
    }

    pub fn speech_model(&self) -> Option<&str> {
        self.speech_availability.model()
    }

    pub fn speech_available(&self) -> bool {
        self.speech_availability.is_available()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Describe `image`; if speech is available, synthesize the description.
    ///
    /// `voice` falls back to the configured default when `None`. Each backend
    /// call is bracketed by `Reporter::begin`/`end`.
    pub async fn run(
        &self,
        image: &UploadedImage,
        voice: Option<Voice>,
        reporter: &dyn Reporter,
    ) -> RunOutcome {
        let Some(description) = self.describe(image, reporter).await else {
            return RunOutcome::default();
        };
        let speech = self.speak(&description, voice, reporter).await;
        RunOutcome {
            description: Some(description),
            speech,
        }
    }

    /// Generate a description only.
    pub async fn describe(&self, image: &UploadedImage, reporter: &dyn Reporter) -> Option<String> {
        reporter.begin(Step::Describing);
        let description = vision::generate_description(
            self.vision.as_ref(),
            image,
            &self.vision_model,
            &self.config.vision,
            reporter,
        )
        .await;
        reporter.end(Step::Describing);
        description
    }

    /// Synthesize `text`, or report that speech is unavailable and return `None`
    /// without calling the backend.
    pub async fn speak(
        &self,
        text: &str,
        voice: Option<Voice>,
        reporter: &dyn Reporter,
    ) -> Option<SynthesizedSpeech> {
        let Some(model) = self.speech_model() else {
            reporter.warning(
                "Text-to-speech is unavailable due to model access restrictions. The description is shown without audio.",
            );
            return None;
        };
        let voice = voice.unwrap_or_else(|| self.default_voice());
        reporter.begin(Step::Synthesizing);
        let speech = speech::synthesize(
            self.speech.as_ref(),
            text,
            voice,
            model,
            &self.config,
            reporter,
        )
        .await;
        reporter.end(Step::Synthesizing);
        speech
    }

    /// The configured default voice.
    pub fn default_voice(&self) -> Voice {
        self.config.speech.default_voice
    }
}
