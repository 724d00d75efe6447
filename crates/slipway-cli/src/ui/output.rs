//! Styled terminal output for command feedback.
//!
//! Every operation in slipway is serial, so messages are written directly;
//! the [`Reporter`] impl lets the ops layer stay terminal-agnostic.

use crossterm::style::Stylize;
use slipway_core::reporter::Reporter;

/// Handle for writing command feedback to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output;

impl Output {
    /// Create a new output handle.
    pub fn new() -> Self {
        Self
    }

    /// Print an informational message.
    pub fn info(&self, msg: &str) {
        println!("  {msg}");
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        println!("{} {}", "ok".green(), msg.green());
    }

    /// Print a warning message.
    pub fn warning(&self, msg: &str) {
        println!("{} {}", "!!".yellow(), msg.yellow());
    }

    /// Print an error message to stderr.
    pub fn error(&self, msg: &str) {
        eprintln!("{} {}", "error:".red(), msg.red());
    }
}

impl Reporter for Output {
    fn info(&self, msg: &str) {
        self.info(msg);
    }

    fn success(&self, msg: &str) {
        self.success(msg);
    }

    fn warning(&self, msg: &str) {
        self.warning(msg);
    }

    fn error(&self, msg: &str) {
        self.error(msg);
    }
}
