//! # Progress Output
//!
//! The orchestrator never prints directly. It emits [`Event`]s to a
//! [`Reporter`]; [`ConsoleReporter`] renders them as the familiar
//! `[skip]` / `[clone]` / `[patch]` lines, and tests collect them into a
//! `Vec<Event>` instead.
//!
//! ## Respecting User Preferences
//!
//! Prefixes are colored only when [`OutputConfig`] allows it:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use console::{style, Color};

use crate::state::Stage;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether prefixes should be colored.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `--color=always` overrides `NO_COLOR`; `--color=auto` (or anything
    /// unrecognized) falls back to environment detection.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Why an entry was skipped without running any command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination exists and no record says otherwise.
    AlreadyExists,
    /// The state record says provisioning finished.
    Complete,
}

/// Something the orchestrator wants the operator to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A manifest line that did not split into three tokens.
    Malformed { line_number: usize, line: String },
    /// An entry short-circuited by the idempotency check.
    Skipped {
        repository: String,
        destination: PathBuf,
        reason: SkipReason,
    },
    /// A skipped entry whose record disagrees with the manifest or the patch
    /// directory.
    Drift { repository: String, detail: String },
    /// Starting the full clone sequence.
    Cloning { slug: String, commit: String },
    /// Continuing an entry a previous run left part-way.
    Resuming {
        slug: String,
        commit: String,
        stage: Stage,
    },
    /// About to apply `count` patches.
    Patching { repository: String, count: usize },
    /// A `--repo` name that matched no manifest entry.
    UnknownSelection { name: String },
    /// Every entry has been handled.
    Done,
}

/// Receives progress events from the orchestrator.
pub trait Reporter {
    fn report(&mut self, event: Event);
}

impl Reporter for Vec<Event> {
    fn report(&mut self, event: Event) {
        self.push(event);
    }
}

/// Prints events to stdout, warnings to stderr.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    config: OutputConfig,
}

impl ConsoleReporter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    fn prefix(&self, label: &str, color: Color) -> String {
        style(format!("[{}]", label))
            .fg(color)
            .bold()
            .force_styling(self.config.use_color)
            .to_string()
    }

    /// Render an event to the line it prints, and whether it belongs on
    /// stderr.
    pub fn render(&self, event: &Event) -> (String, bool) {
        match event {
            Event::Malformed { line_number, line } => (
                format!("Skipping malformed line {}: {:?}", line_number, line),
                true,
            ),
            Event::Skipped { destination, .. } => (
                format!(
                    "{} {} already exists",
                    self.prefix("skip", Color::Yellow),
                    destination.display()
                ),
                false,
            ),
            Event::Drift { repository, detail } => (
                format!("{} {}: {}", self.prefix("warn", Color::Magenta), repository, detail),
                true,
            ),
            Event::Cloning { slug, commit } => (
                format!("{} {} @ {}", self.prefix("clone", Color::Green), slug, commit),
                false,
            ),
            Event::Resuming {
                slug,
                commit,
                stage,
            } => {
                let progress = match stage {
                    Stage::Absent => "previous clone did not finish".to_string(),
                    stage => format!("previous run stopped at {}", stage),
                };
                (
                    format!(
                        "{} {} @ {} ({})",
                        self.prefix("resume", Color::Cyan),
                        slug,
                        commit,
                        progress
                    ),
                    false,
                )
            }
            Event::Patching { repository, count } => (
                format!(
                    "{} Applying {} patch(es) to {}",
                    self.prefix("patch", Color::Blue),
                    count,
                    repository
                ),
                false,
            ),
            Event::UnknownSelection { name } => (
                format!(
                    "{} --repo {} does not match any manifest entry",
                    self.prefix("warn", Color::Magenta),
                    name
                ),
                true,
            ),
            Event::Done => ("Done.".to_string(), false),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: Event) {
        let (line, to_stderr) = self.render(&event);
        // Output is flushed so it interleaves correctly with child processes.
        if to_stderr {
            let mut stderr = io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
        } else {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", line);
            let _ = stdout.flush();
        }
    }
}
