//! Terminal rendering of core reports.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use vocalens_core::{ReportLevel, Reporter, Step};

/// Prints reports to stderr with a coloured prefix, and mirrors them to
/// `tracing` at debug level for JSON log consumers.
///
/// Each session step gets a spinner on stderr; indicatif hides it when stderr
/// is not a terminal.
#[derive(Default)]
pub struct ConsoleReporter {
    /// Spinner currently drawing on stderr; lines are printed around it.
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn active_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|slot| slot.clone())
    }
}

pub fn format_line(level: ReportLevel, message: &str) -> String {
    let (prefix, style) = match level {
        ReportLevel::Success => ("✓", Style::new().for_stderr().green()),
        ReportLevel::Info => ("·", Style::new().for_stderr().cyan()),
        ReportLevel::Warning => ("!", Style::new().for_stderr().yellow()),
        ReportLevel::Error => ("✗", Style::new().for_stderr().red()),
    };
    format!("  {} {}", style.apply_to(prefix), message)
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

impl Reporter for ConsoleReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        tracing::debug!(%level, "{message}");
        let line = format_line(level, message);
        match self.active_spinner() {
            Some(spinner) => spinner.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
    }

    fn begin(&self, step: Step) {
        tracing::debug!(?step, "Step started");
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(spinner(step.message())) {
                previous.finish_and_clear();
            }
        }
    }

    fn end(&self, _step: Step) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }
}
