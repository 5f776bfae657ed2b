//! Command handlers for the Vocalens CLI.

pub mod config;
pub mod describe;
pub mod interactive;
pub mod probe;
pub mod reporter;
pub mod voices;

use vocalens_core::{Config, Credentials, Session, UploadedImage};

use reporter::ConsoleReporter;

/// Resolve keys, build the HTTP backends and probe them.
pub async fn start_session(config: Config, reporter: &ConsoleReporter) -> anyhow::Result<Session> {
    let credentials = Credentials::from_config(&config);
    let (vision, speech) = vocalens_core::backends(&config, &credentials);
    let session = Session::start(vision, speech, config, reporter).await?;
    Ok(session)
}

/// Decode an image file from a user-supplied path (`~` expanded).
pub async fn load_image(raw_path: &str, config: &Config) -> anyhow::Result<UploadedImage> {
    let path = std::path::PathBuf::from(shellexpand::tilde(raw_path).into_owned());
    let image = UploadedImage::load(&path, &config.limits)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    Ok(image)
}
