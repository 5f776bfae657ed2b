//! Interactive mode: guided experience for a bare `vocalens` invocation.
//!
//! When `vocalens` is invoked with no subcommand on a TTY, this module offers
//! a menu over the same session logic as the `describe` command.

pub mod describe;
pub mod theme;

use console::Style;
use dialoguer::Select;
use std::path::{Path, PathBuf};
use vocalens_core::{Config, Session};

use super::reporter::ConsoleReporter;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Wraps `interact_text()` calls, which lack an `_opt` variant.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Describe an image",
    "Check models again",
    "View settings",
    "Exit",
];

/// Entry point for interactive mode. `config_path` is the file `config` was
/// loaded from, or would have been.
pub async fn run(config: Config, config_path: PathBuf) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::vocalens_theme();
    let reporter = ConsoleReporter::new();
    // Probed on first use and reused until the user asks to check again.
    let mut session: Option<Session> = None;

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => {
                if session.is_none() {
                    session = probe(&config, &reporter).await;
                }
                if let Some(session) = &session {
                    describe::guided_describe(session, &reporter).await?;
                }
            }
            Some(1) => session = probe(&config, &reporter).await,
            Some(2) => show_config(&config, &config_path)?,
            Some(3) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// Start a session; failures were already reported, so they just yield `None`.
async fn probe(config: &Config, reporter: &ConsoleReporter) -> Option<Session> {
    match super::start_session(config.clone(), reporter).await {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::debug!("Session not started: {e}");
            None
        }
    }
}

/// Rows of the settings summary, label first.
fn summary_rows(config: &Config, config_path: &Path) -> Vec<(&'static str, String)> {
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };
    let dim = Style::new().for_stderr().dim();

    vec![
        (
            "Config file:",
            format!("{} {}", config_path.display(), dim.apply_to(path_note)),
        ),
        (
            "Vision models:",
            format!(
                "{} (fallback: {})",
                config.vision.primary_model, config.vision.fallback_model
            ),
        ),
        ("Speech model:", config.speech.model.clone()),
        ("Default voice:", config.speech.default_voice.to_string()),
        ("Speech file:", config.speech_path().display().to_string()),
        ("Log level:", config.logging.level.clone()),
    ]
}

/// Settings summary with an option to print the full TOML.
fn show_config(config: &Config, config_path: &Path) -> anyhow::Result<()> {
    let theme = theme::vocalens_theme();
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", cyan.apply_to("Current configuration:"));
        eprintln!();

        for (name, value) in summary_rows(config, config_path) {
            eprintln!("    {} {}", label.apply_to(format!("{name:<16}")), value);
        }
        eprintln!();

        let items = &["View full config (TOML)", "Back"];
        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                }
            },
            Some(1) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_shows_selected_config_file() {
        console::set_colors_enabled_stderr(false);
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom.toml");
        std::fs::write(&custom, "").unwrap();

        let rows = summary_rows(&Config::default(), &custom);
        assert_eq!(rows[0].0, "Config file:");
        assert_eq!(rows[0].1, format!("{} (exists)", custom.display()));

        let missing = dir.path().join("missing.toml");
        let rows = summary_rows(&Config::default(), &missing);
        assert_eq!(rows[0].1, format!("{} (using defaults)", missing.display()));
        assert!(rows.contains(&("Default voice:", "alloy".to_string())));
    }
}
