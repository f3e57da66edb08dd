use crate::events::{CycleOutcome, LoopState, SkipReason};
use crate::executor::{ExecutionOutcome, OrderExecutor};
use crate::market_state::{MarketStateAggregator, SnapshotSettings};
use crate::prompt::build_prompt;
use anyhow::{Context, Result};
use perp_agent_core::{
    DecisionGate, DecisionOracle, ExchangeClient, NewsSource, PositionSizer, RiskValidator,
    TradingConfig, TradingDecision,
};
use std::sync::Arc;
use std::time::Duration;

/// Delays between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    pub cycle_interval: Duration,
    pub error_cooldown: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_secs(45),
            error_cooldown: Duration::from_secs(10),
        }
    }
}

impl From<&TradingConfig> for LoopTiming {
    fn from(config: &TradingConfig) -> Self {
        Self {
            cycle_interval: Duration::from_secs(config.cycle_interval_secs),
            error_cooldown: Duration::from_secs(config.error_cooldown_secs),
        }
    }
}

/// Perpetual snapshot, decide, execute supervisor.
///
/// A failing cycle never stops the loop: the error is logged and the next
/// cycle starts after the short cooldown.
pub struct ControlLoop {
    symbol: String,
    aggregator: MarketStateAggregator,
    oracle: Arc<dyn DecisionOracle>,
    news: Arc<dyn NewsSource>,
    gate: DecisionGate,
    risk: RiskValidator,
    executor: OrderExecutor,
    timing: LoopTiming,
    state: LoopState,
    cycles: u64,
}

impl ControlLoop {
    #[must_use]
    pub fn new(
        config: &TradingConfig,
        exchange: Arc<dyn ExchangeClient>,
        oracle: Arc<dyn DecisionOracle>,
        news: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            symbol: config.symbol.clone(),
            aggregator: MarketStateAggregator::new(
                Arc::clone(&exchange),
                SnapshotSettings::from(config),
            ),
            oracle,
            news,
            gate: DecisionGate::new(config.confidence_threshold),
            risk: RiskValidator::new(config.max_risk_percent),
            executor: OrderExecutor::new(exchange, PositionSizer::new(config.reference_equity)),
            timing: LoopTiming::from(config),
            state: LoopState::RunningCycle,
            cycles: 0,
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing: LoopTiming) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Runs forever.
    pub async fn run(&mut self) {
        tracing::info!(
            symbol = %self.symbol,
            interval_secs = self.timing.cycle_interval.as_secs(),
            cooldown_secs = self.timing.error_cooldown.as_secs(),
            "Trading loop started"
        );

        loop {
            let delay = self.tick().await;
            tokio::time::sleep(delay).await;
        }
    }

    /// Runs one cycle, absorbs its error, and returns the delay before the next.
    pub async fn tick(&mut self) -> Duration {
        self.state = LoopState::RunningCycle;
        self.cycles += 1;
        let cycle = self.cycles;

        match self.run_cycle().await {
            Ok(outcome) => {
                match &outcome {
                    CycleOutcome::Executed(record) => tracing::info!(
                        cycle,
                        order_id = %record.order_id,
                        "Cycle finished with an order"
                    ),
                    CycleOutcome::Skipped(reason) => {
                        tracing::info!(cycle, %reason, "Cycle finished without an order");
                    }
                }
                self.state = LoopState::Cooldown { after_error: false };
                self.timing.cycle_interval
            }
            Err(e) => {
                tracing::error!(cycle, error = %format!("{e:#}"), "Cycle failed");
                self.state = LoopState::Cooldown { after_error: true };
                self.timing.error_cooldown
            }
        }
    }

    /// One snapshot, decide, execute pass.
    ///
    /// # Errors
    /// Returns error if the oracle call fails or the executor raises
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let market = self.aggregator.snapshot(&self.symbol).await;
        tracing::info!(
            symbol = %market.symbol,
            price = %market.last_price,
            change_5m = %market.change_5m,
            rsi_5m = %market.rsi_5m,
            rsi_1h = %market.rsi_1h,
            depth = %market.liquidity_depth,
            balance = %market.balance_usdt,
            "Market snapshot"
        );

        if !market.has_price() {
            tracing::warn!(symbol = %self.symbol, "No last price, skipping cycle");
            return Ok(CycleOutcome::Skipped(SkipReason::NoPrice));
        }

        let news = self.news.fetch_latest().await;
        let prompt = build_prompt(&market, &news);

        let raw = self
            .oracle
            .invoke(&prompt)
            .await
            .context("Decision oracle call failed")?;
        tracing::debug!(raw = %raw, "Oracle reply");

        let decision = TradingDecision::from_oracle_output(&raw);
        tracing::info!(
            action = %decision.action,
            confidence = decision.confidence,
            leverage = decision.leverage,
            size = %decision.size_percent_of_equity,
            reasoning = %decision.reasoning,
            "Decision"
        );

        if !self.gate.should_execute(&decision) {
            tracing::info!(
                action = %decision.action,
                confidence = decision.confidence,
                "Holding, waiting for a better setup"
            );
            return Ok(CycleOutcome::Skipped(SkipReason::GateClosed));
        }

        let equity = self.executor.sizer().reference_equity();
        if !self.risk.validate(decision.size_percent_of_equity, equity) {
            tracing::warn!(
                size = %decision.size_percent_of_equity,
                max = %self.risk.max_risk_percent(),
                "Size exceeds risk cap, skipping"
            );
            return Ok(CycleOutcome::Skipped(SkipReason::RiskRejected));
        }

        let outcome = self
            .executor
            .execute(&decision, market.last_price, &self.symbol)
            .await?;

        Ok(match outcome {
            ExecutionOutcome::Executed(record) => CycleOutcome::Executed(record),
            ExecutionOutcome::Skipped => CycleOutcome::Skipped(SkipReason::ZeroSize),
        })
    }
}
