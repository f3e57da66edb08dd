use crate::decision::{Action, TradingDecision};

/// Decides whether an oracle decision is worth acting on.
#[derive(Debug, Clone)]
pub struct DecisionGate {
    confidence_threshold: u8,
}

impl Default for DecisionGate {
    fn default() -> Self {
        Self::new(75)
    }
}

impl DecisionGate {
    #[must_use]
    pub const fn new(confidence_threshold: u8) -> Self {
        Self { confidence_threshold }
    }

    /// True iff confidence is strictly above the threshold and the action is not HOLD.
    ///
    /// `CLOSE_ALL` passes like any other action.
    #[must_use]
    pub fn should_execute(&self, decision: &TradingDecision) -> bool {
        decision.confidence > self.confidence_threshold && decision.action != Action::Hold
    }
}
