//! Vocalens Core - describe an image with a hosted vision model and read the
//! description aloud with a hosted text-to-speech model.
//!
//! # Architecture
//!
//! Two remote backends are probed once per session, then driven in sequence:
//!
//! ```text
//! Probe vision (primary → fallback) → Probe speech → Image → Describe → Synthesize → speech.mp3
//! ```
//!
//! Vision is mandatory: a session cannot start without a responding model.
//! Speech is optional: when its probe fails the session degrades to
//! description-only output.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vocalens_core::{Config, Credentials, Session, TracingReporter, UploadedImage, Voice};
//!
//! #[tokio::main]
//! async fn main() -> vocalens_core::Result<()> {
//!     let config = Config::load()?;
//!     let credentials = Credentials::from_config(&config);
//!     let (vision, speech) = vocalens_core::backends(&config, &credentials);
//!     let reporter = TracingReporter;
//!
//!     let session = Session::start(vision, speech, config.clone(), &reporter).await?;
//!     let image = UploadedImage::open("./photo.png".as_ref(), &config.limits)?;
//!     let outcome = session.run(&image, Some(Voice::Nova), &reporter).await;
//!     println!("{:?}", outcome.description);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod report;
pub mod session;
pub mod speech;
pub mod upload;
pub mod vision;

pub use config::Config;
pub use credentials::Credentials;
pub use error::{
    BackendError, BackendErrorKind, ConfigError, ImageError, Result, SessionError, VocalensError,
};
pub use report::{RecordingReporter, ReportLevel, Reporter, Step, TracingReporter};
pub use session::{ModelAvailability, RunOutcome, Session};
pub use speech::{SpeechBackend, SynthesizedSpeech, Voice};
pub use upload::{ImageInput, UploadedImage};
pub use vision::VisionBackend;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the HTTP clients for both backends from config and resolved credentials.
///
/// Missing keys are not checked here; the first call through a client without a
/// key fails with an authorization error.
pub fn backends(
    config: &Config,
    credentials: &Credentials,
) -> (Box<dyn VisionBackend>, Box<dyn SpeechBackend>) {
    let timeout = config.limits.request_timeout();
    let vision = vision::OpenAiCompatVision::new(
        &config.vision.endpoint,
        &credentials.vision,
        timeout,
    );
    let speech = speech::OpenAiSpeech::new(
        &config.speech.endpoint,
        &credentials.speech,
        timeout,
    );
    (Box::new(vision), Box::new(speech))
}
