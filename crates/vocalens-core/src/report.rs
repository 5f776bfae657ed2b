//! The user-facing reporting channel.
//!
//! Probes, generation and synthesis never return errors to their caller; they
//! surface what happened here instead and hand back a sentinel. The CLI
//! renders reports on the terminal; tests record them.
//!
//! Long-running backend calls are bracketed by `begin`/`end` so a front end can
//! show progress for each step.

use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// A backend round-trip made by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Checking which models answer
    Probing,
    Describing,
    Synthesizing,
}

impl Step {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Probing => "Checking model availability...",
            Self::Describing => "Generating text description...",
            Self::Synthesizing => "Converting to speech...",
        }
    }
}

/// Destination for human-readable status messages.
pub trait Reporter: Send + Sync {
    fn report(&self, level: ReportLevel, message: &str);

    /// A step is about to call a backend.
    fn begin(&self, _step: Step) {}

    /// The step started by the matching `begin` has finished.
    fn end(&self, _step: Step) {}

    fn success(&self, message: &str) {
        self.report(ReportLevel::Success, message);
    }

    fn info(&self, message: &str) {
        self.report(ReportLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.report(ReportLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.report(ReportLevel::Error, message);
    }
}

/// Forwards reports to `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Success | ReportLevel::Info => tracing::info!("{message}"),
            ReportLevel::Warning => tracing::warn!("{message}"),
            ReportLevel::Error => tracing::error!("{message}"),
        }
    }
}

/// Keeps every report and started step in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    entries: Mutex<Vec<(ReportLevel, String)>>,
    steps: Mutex<Vec<Step>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all reports so far.
    pub fn entries(&self) -> Vec<(ReportLevel, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages reported at `level`.
    pub fn messages(&self, level: ReportLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// Steps begun so far.
    pub fn steps(&self) -> Vec<Step> {
        self.steps
            .lock()
            .map(|steps| steps.clone())
            .unwrap_or_default()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }

    fn begin(&self, step: Step) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push(step);
        }
    }
}
