//! Decision port: publish-time refusal conditions are resolved by an
//! injected yes/no policy, never by a hard-coded terminal prompt.

/// Yes/no policy consulted when a publish hits a confirmable condition.
pub trait DecisionPort {
    /// Answer `true` to proceed despite the described condition.
    fn confirm(&self, message: &str) -> bool;
}

/// Non-interactive policy answering every confirmation the same way
/// (CI pipelines, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub bool);

impl DecisionPort for FixedDecision {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_decision_ignores_the_question() {
        assert!(FixedDecision(true).confirm("proceed?"));
        assert!(!FixedDecision(false).confirm("proceed?"));
    }
}
