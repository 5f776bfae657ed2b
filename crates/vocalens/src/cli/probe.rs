//! The `vocalens probe` command: report which models answer.

use console::Style;
use vocalens_core::Config;

use super::reporter::ConsoleReporter;

pub async fn execute(config: Config) -> anyhow::Result<()> {
    let reporter = ConsoleReporter::new();
    let session = super::start_session(config, &reporter).await?;

    let label = Style::new().bold();
    println!(
        "{} {}",
        label.apply_to(format!("{:<8}", "vision")),
        session.vision_model()
    );
    println!(
        "{} {}",
        label.apply_to(format!("{:<8}", "speech")),
        session.speech_model().unwrap_or("unavailable")
    );
    Ok(())
}
