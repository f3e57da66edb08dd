pub mod control_loop;
pub mod events;
pub mod executor;
pub mod market_state;
pub mod prompt;

pub use control_loop::{ControlLoop, LoopTiming};
pub use events::{CycleOutcome, LoopState, SkipReason};
pub use executor::{ExecutionOutcome, OrderExecutor};
pub use market_state::{MarketStateAggregator, SnapshotSettings};
pub use prompt::build_prompt;
