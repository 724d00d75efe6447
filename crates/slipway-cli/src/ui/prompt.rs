//! Interactive yes/no prompt implementing the decision port.

use slipway_core::decision::DecisionPort;
use std::io::Write;

/// Prompts on stdin with a `(y/N)` question; the default answer is no.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl DecisionPort for StdinPrompt {
    fn confirm(&self, message: &str) -> bool {
        print!("  {message} (y/N) ");
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err() {
            return false;
        }

        input.trim().eq_ignore_ascii_case("y")
    }
}
