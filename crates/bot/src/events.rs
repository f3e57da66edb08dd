use perp_agent_core::ExecutionRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a single cycle ended when no error was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleOutcome {
    /// An order was placed.
    Executed(ExecutionRecord),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No usable last price in the snapshot.
    NoPrice,
    /// Confidence at or below threshold, or the decision was HOLD.
    GateClosed,
    /// Requested size above the risk cap.
    RiskRejected,
    /// Requested size was zero or negative.
    ZeroSize,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoPrice => "no price",
            Self::GateClosed => "gate closed",
            Self::RiskRejected => "risk rejected",
            Self::ZeroSize => "zero size",
        };
        f.write_str(text)
    }
}

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopState {
    RunningCycle,
    /// Sleeping until the next cycle; `after_error` selects the short delay.
    Cooldown { after_error: bool },
}
