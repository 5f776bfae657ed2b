//! Guided describe flow.
//!
//! Image path → voice → confirmation → description and speech → optional
//! copy of the audio. Repeats until the user is done.

use console::Style;
use dialoguer::{Confirm, Input, Select};
use vocalens_core::{Reporter, Session, UploadedImage, Voice};

use super::theme::vocalens_theme;
use crate::cli::describe::save_copy;
use crate::cli::reporter::ConsoleReporter;

/// Describe images with an already probed session until the user stops.
pub async fn guided_describe(session: &Session, reporter: &ConsoleReporter) -> anyhow::Result<()> {
    let theme = vocalens_theme();

    loop {
        let Some(image) = prompt_image(session).await? else {
            return Ok(());
        };

        let voice = if session.speech_available() {
            match select_voice(session)? {
                Some(voice) => Some(voice),
                None => return Ok(()),
            }
        } else {
            None
        };

        let prompt = if session.speech_available() {
            "Generate description and speech?"
        } else {
            "Generate description?"
        };
        let confirmed = Confirm::with_theme(&theme)
            .with_prompt(prompt)
            .default(true)
            .interact_opt()?;
        if confirmed != Some(true) {
            return Ok(());
        }

        let outcome = session.run(&image, voice, reporter).await;

        if let Some(description) = &outcome.description {
            let dim = Style::new().for_stderr().dim();
            eprintln!();
            eprintln!("{}", dim.apply_to("─".repeat(50)));
            println!("{description}");
            eprintln!("{}", dim.apply_to("─".repeat(50)));
            eprintln!();
        }

        if let Some(speech) = &outcome.speech {
            reporter.success(&format!("Speech saved to {}", speech.path.display()));
            offer_copy(&speech.path, reporter)?;
        }

        let again = Confirm::with_theme(&theme)
            .with_prompt("Describe another image?")
            .default(true)
            .interact_opt()?;
        if again != Some(true) {
            return Ok(());
        }
    }
}

/// Prompt until a decodable image is given. `None` on interrupt.
async fn prompt_image(session: &Session) -> anyhow::Result<Option<UploadedImage>> {
    let theme = vocalens_theme();
    let warn = Style::new().for_stderr().yellow();

    loop {
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Path to a PNG or JPEG image")
                .interact_text(),
        )?
        else {
            return Ok(None);
        };

        match crate::cli::load_image(raw_path.trim(), session.config()).await {
            Ok(image) => return Ok(Some(image)),
            Err(e) => eprintln!("  {}", warn.apply_to(e)),
        }
    }
}

/// Voice picker with the configured default preselected. `None` on Esc.
fn select_voice(session: &Session) -> anyhow::Result<Option<Voice>> {
    let default = session.default_voice();
    let default_index = Voice::ALL.iter().position(|v| *v == default).unwrap_or(0);

    let choice = Select::with_theme(&vocalens_theme())
        .with_prompt("Voice")
        .items(&Voice::ALL.map(|v| v.as_str()))
        .default(default_index)
        .interact_opt()?;

    Ok(choice.map(|i| Voice::ALL[i]))
}

fn offer_copy(source: &std::path::Path, reporter: &ConsoleReporter) -> anyhow::Result<()> {
    let theme = vocalens_theme();

    let save = Confirm::with_theme(&theme)
        .with_prompt("Save a copy of the speech?")
        .default(false)
        .interact_opt()?;
    if save != Some(true) {
        return Ok(());
    }

    let Some(dest) = super::handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Save to")
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    match save_copy(source, std::path::Path::new(dest.trim())) {
        Ok(path) => reporter.success(&format!("Copied speech to {}", path.display())),
        Err(e) => reporter.error(&format!("Could not save a copy: {e}")),
    }
    Ok(())
}
