use crate::decision::TradingDecision;
use anyhow::Result;
use rust_decimal::{Decimal, RoundingStrategy};

/// Smallest order quantity the exchange accepts.
pub const MIN_ORDER_QTY: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Decimal places of the order quantity.
pub const QTY_DECIMALS: u32 = 3;

/// Converts a percent-of-equity intent into an exchange-valid quantity.
///
/// Sizing is computed against a fixed reference equity from configuration,
/// not the live wallet balance seen in the same cycle.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    reference_equity: Decimal,
}

impl PositionSizer {
    #[must_use]
    pub const fn new(reference_equity: Decimal) -> Self {
        Self { reference_equity }
    }

    #[must_use]
    pub const fn reference_equity(&self) -> Decimal {
        self.reference_equity
    }

    /// Quantity for `decision` at `entry_price`.
    ///
    /// `equity × size% / 100 × leverage / entry_price`, rounded to 3 decimal
    /// places with ties away from zero and floored at [`MIN_ORDER_QTY`].
    ///
    /// # Errors
    /// Returns error if `entry_price` is not positive.
    pub fn size(&self, decision: &TradingDecision, entry_price: Decimal) -> Result<Decimal> {
        if entry_price <= Decimal::ZERO {
            anyhow::bail!("Entry price must be positive, got {entry_price}");
        }

        let equity_to_risk =
            self.reference_equity * decision.size_percent_of_equity / Decimal::ONE_HUNDRED;
        let raw_qty = equity_to_risk * Decimal::from(decision.leverage) / entry_price;

        let mut quantity =
            raw_qty.round_dp_with_strategy(QTY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        quantity.rescale(QTY_DECIMALS);

        Ok(quantity.max(MIN_ORDER_QTY))
    }
}
