use perp_agent_core::{
    ExchangeClient, ExecutionError, ExecutionRecord, Order, OrderSide, PositionSizer,
    TradingDecision,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Result of handing a decision to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Executed(ExecutionRecord),
    /// Requested size was zero or negative; nothing was sent.
    Skipped,
}

/// Turns an approved decision into a leveraged market order.
pub struct OrderExecutor {
    exchange: Arc<dyn ExchangeClient>,
    sizer: PositionSizer,
}

impl OrderExecutor {
    #[must_use]
    pub fn new(exchange: Arc<dyn ExchangeClient>, sizer: PositionSizer) -> Self {
        Self { exchange, sizer }
    }

    #[must_use]
    pub const fn sizer(&self) -> &PositionSizer {
        &self.sizer
    }

    /// Sets symmetric leverage, sizes the order and submits it at market.
    ///
    /// Leverage must be accepted before any order is placed.
    ///
    /// # Errors
    /// Returns [`ExecutionError`] if leverage is refused, the order cannot be
    /// sized, or the exchange rejects the order.
    pub async fn execute(
        &self,
        decision: &TradingDecision,
        entry_price: Decimal,
        symbol: &str,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        if decision.size_percent_of_equity <= Decimal::ZERO {
            tracing::info!(
                size = %decision.size_percent_of_equity,
                "Non-positive size requested, nothing to execute"
            );
            return Ok(ExecutionOutcome::Skipped);
        }

        let leverage = decision.leverage;
        self.exchange
            .set_leverage(symbol, leverage, leverage)
            .await
            .map_err(|e| ExecutionError::LeverageRejected {
                symbol: symbol.to_string(),
                leverage,
                message: format!("{e:#}"),
            })?;

        let quantity = self
            .sizer
            .size(decision, entry_price)
            .map_err(|e| ExecutionError::Sizing(e.to_string()))?;

        let order = Order {
            symbol: symbol.to_string(),
            side: OrderSide::for_action(decision.action),
            quantity,
            leverage,
            reference_price: entry_price,
        };

        let ack = self
            .exchange
            .place_market_order(&order.symbol, order.side, order.quantity)
            .await
            .map_err(|e| ExecutionError::OrderRejected {
                symbol: order.symbol.clone(),
                message: format!("{e:#}"),
            })?;

        let record = ExecutionRecord {
            action: decision.action,
            side: order.side,
            quantity: order.quantity,
            symbol: order.symbol,
            reference_price: order.reference_price,
            leverage: order.leverage,
            order_id: ack.order_id,
        };

        tracing::info!(
            action = %record.action,
            side = %record.side,
            quantity = %record.quantity,
            symbol = %record.symbol,
            price = %record.reference_price,
            leverage = record.leverage,
            order_id = %record.order_id,
            "ORDER EXECUTED"
        );

        Ok(ExecutionOutcome::Executed(record))
    }
}
