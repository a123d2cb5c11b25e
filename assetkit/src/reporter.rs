//! User-facing progress output.
//!
//! A `Reporter` is built once per command and handed to every component.
//! In JSON mode it writes nothing at all, which keeps stdout free for the
//! single result document.

use std::fmt::Display;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Per-run output sink for human-readable progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reporter {
    json: bool,
}

impl Reporter {
    /// Create a reporter; `json = true` silences every method.
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Reporter for human output.
    pub fn human() -> Self {
        Self::new(false)
    }

    /// Reporter that never writes.
    pub fn silent() -> Self {
        Self::new(true)
    }

    /// Whether human output is suppressed.
    pub fn is_silent(&self) -> bool {
        self.json
    }

    pub fn info(&self, message: impl Display) {
        if !self.json {
            println!("{message}");
        }
    }

    pub fn success(&self, message: impl Display) {
        if !self.json {
            println!("{} {message}", style("✔").green());
        }
    }

    /// Announce the start of one install step.
    pub fn step(&self, name: &str, kind: &str) {
        if !self.json {
            println!("{} {} {}", style("→").cyan(), style(name).bold(), style(format!("({kind})")).dim());
        }
    }

    pub fn warn(&self, message: impl Display) {
        if !self.json {
            eprintln!("{} {message}", style("warning:").yellow().bold());
        }
    }

    pub fn error(&self, message: impl Display) {
        if !self.json {
            eprintln!("{} {message}", style("error:").red().bold());
        }
    }

    /// Start a spinner; hidden in JSON mode.
    pub fn spinner(&self, message: impl Into<String>) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::human()
    }
}
