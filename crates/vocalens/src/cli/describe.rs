//! The `vocalens describe` command.

use clap::Args;
use std::path::{Path, PathBuf};
use vocalens_core::speech::UnknownVoice;
use vocalens_core::{Config, Reporter, RunOutcome, Voice};

use super::reporter::ConsoleReporter;

/// Arguments for the `describe` command.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// PNG or JPEG image to describe
    #[arg(required = true)]
    pub image: String,

    /// Voice for the speech (alloy, echo, fable, onyx, nova, shimmer)
    #[arg(long, value_parser = parse_voice)]
    pub voice: Option<Voice>,

    /// Copy the synthesized speech here as well
    #[arg(long)]
    pub save_as: Option<PathBuf>,

    /// Only describe; do not synthesize speech
    #[arg(long)]
    pub no_speech: bool,
}

fn parse_voice(s: &str) -> Result<Voice, UnknownVoice> {
    s.parse()
}

/// Execute the describe command.
pub async fn execute(args: DescribeArgs, config: Config) -> anyhow::Result<()> {
    let reporter = ConsoleReporter::new();

    let image = super::load_image(&args.image, &config).await?;
    let session = super::start_session(config, &reporter).await?;

    let outcome = if args.no_speech {
        RunOutcome {
            description: session.describe(&image, &reporter).await,
            speech: None,
        }
    } else {
        session.run(&image, args.voice, &reporter).await
    };

    let Some(description) = outcome.description else {
        anyhow::bail!("No description was generated");
    };
    println!("{description}");

    if let Some(speech) = outcome.speech {
        reporter.success(&format!(
            "Speech saved to {} ({} bytes)",
            speech.path.display(),
            speech.bytes_written
        ));
        if let Some(dest) = args.save_as {
            let dest = save_copy(&speech.path, &dest)?;
            reporter.success(&format!("Copied speech to {}", dest.display()));
        }
    }

    Ok(())
}

/// Copy the speech file to `dest` (the "download"). A directory destination
/// receives the file under its original name.
pub fn save_copy(source: &Path, dest: &Path) -> anyhow::Result<PathBuf> {
    let dest = PathBuf::from(shellexpand::tilde(&dest.to_string_lossy()).into_owned());
    let dest = if dest.is_dir() {
        dest.join(source.file_name().unwrap_or_else(|| "speech.mp3".as_ref()))
    } else {
        dest
    };
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, &dest)?;
    Ok(dest)
}
