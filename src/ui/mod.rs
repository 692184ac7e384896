//! UI/Progress presentation layer
//!
//! This module handles:
//! - Status lines, warnings and verbose details for the bootstrap steps
//! - Progress bars for downloads and file placement using indicatif
//! - The progress preference gate in front of progress-reporting steps
//!
//! All output goes through the [`Reporter`] trait. The reporter is built once from
//! [`OutputOptions`] and passed down explicitly to every operation.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::ProgressGateError;

/// How progress-reporting steps behave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ProgressPreference {
    /// No progress bars
    Silent,
    /// Show progress bars
    #[default]
    Continue,
    /// Show progress and ask before each progress-reporting step
    Inquire,
    /// Pause for confirmation before each progress-reporting step
    Break,
    /// Refuse to run progress-reporting steps
    Stop,
}

impl ProgressPreference {
    pub fn shows_progress(self) -> bool {
        !matches!(self, ProgressPreference::Silent)
    }
}

/// Unit a progress bar counts in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Bytes,
    Items,
}

/// Output settings chosen on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub verbose: bool,
    pub progress: ProgressPreference,
}

/// Reporter for the bootstrap steps
pub trait Reporter {
    /// Heading for a workflow step
    fn step(&self, message: &str);

    fn info(&self, message: &str);

    fn success(&self, message: &str);

    /// A recoverable condition; the run continues
    fn warn(&self, message: &str);

    /// Shown only with --verbose
    fn detail(&self, message: &str);

    /// Progress bar for a byte or item count; hidden when progress is silent
    fn progress_bar(&self, kind: ProgressKind, len: Option<u64>, message: &str) -> ProgressBar;

    /// Decide whether a progress-reporting step may start
    fn gate_progress_step(&self, step: &str) -> Result<(), ProgressGateError>;
}

/// Interactive console reporter writing to stderr
pub struct ConsoleReporter {
    options: OutputOptions,
    step_style: Style,
    success_style: Style,
    warn_style: Style,
    detail_style: Style,
}

impl ConsoleReporter {
    pub fn new(options: OutputOptions) -> Self {
        Self {
            options,
            step_style: Style::new().cyan().bold(),
            success_style: Style::new().green(),
            warn_style: Style::new().yellow().bold(),
            detail_style: Style::new().dim(),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn step(&self, message: &str) {
        eprintln!("{} {}", self.step_style.apply_to("==>"), message);
    }

    fn info(&self, message: &str) {
        eprintln!("    {message}");
    }

    fn success(&self, message: &str) {
        eprintln!("    {}", self.success_style.apply_to(message));
    }

    fn warn(&self, message: &str) {
        eprintln!("{} {}", self.warn_style.apply_to("Warning:"), message);
    }

    fn detail(&self, message: &str) {
        if self.options.verbose {
            eprintln!("    {}", self.detail_style.apply_to(message));
        }
    }

    fn progress_bar(&self, kind: ProgressKind, len: Option<u64>, message: &str) -> ProgressBar {
        if !self.options.progress.shows_progress() {
            return ProgressBar::hidden();
        }

        let pb = match len {
            Some(total) => {
                let template = match kind {
                    ProgressKind::Bytes => "    [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
                    ProgressKind::Items => "    [{bar:40.green/yellow}] {pos}/{len} {msg}",
                };
                let style = ProgressStyle::default_bar()
                    .template(template)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-");
                ProgressBar::new(total).with_style(style)
            }
            None => {
                let style = ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner());
                ProgressBar::new_spinner().with_style(style)
            }
        };
        pb.set_message(message.to_string());
        pb
    }

    fn gate_progress_step(&self, step: &str) -> Result<(), ProgressGateError> {
        match self.options.progress {
            ProgressPreference::Silent | ProgressPreference::Continue => Ok(()),
            ProgressPreference::Stop => Err(ProgressGateError::Stopped {
                step: step.to_string(),
            }),
            ProgressPreference::Inquire | ProgressPreference::Break => {
                let confirmed = inquire::Confirm::new(&format!("Continue with {step}?"))
                    .with_default(true)
                    .prompt()
                    .map_err(|e| ProgressGateError::Prompt {
                        step: step.to_string(),
                        reason: e.to_string(),
                    })?;
                if confirmed {
                    Ok(())
                } else {
                    Err(ProgressGateError::Declined {
                        step: step.to_string(),
                    })
                }
            }
        }
    }
}
