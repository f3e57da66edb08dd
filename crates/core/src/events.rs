use crate::decision::Action;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point-in-time view of the market for a single cycle.
///
/// Every field carries a safe default so a snapshot can always be built,
/// even when individual exchange queries fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    pub symbol: String,
    pub last_price: Decimal,
    /// Percent change of `last_price` against the close two bars back on the 5m series
    pub change_5m: Decimal,
    pub rsi_5m: Decimal,
    pub rsi_1h: Decimal,
    pub liquidity_depth: Decimal,
    pub balance_usdt: Decimal,
}

impl MarketState {
    /// Neutral RSI reading used when the indicator cannot be computed.
    pub const NEUTRAL_RSI: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

    /// Balance assumed when the wallet query fails or the coin is missing.
    pub const FALLBACK_BALANCE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

    /// Returns true when the ticker produced a usable price.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.last_price > Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub last_price: Decimal,
}

/// OHLC bar as returned by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kline {
    /// Bar open time, epoch milliseconds
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlineInterval {
    FiveMinutes,
    OneHour,
}

impl KlineInterval {
    /// Interval code understood by the exchange API.
    #[must_use]
    pub const fn as_api_str(self) -> &'static str {
        match self {
            Self::FiveMinutes => "5",
            Self::OneHour => "60",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FiveMinutes => write!(f, "5m"),
            Self::OneHour => write!(f, "1h"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub asks: Vec<OrderBookLevel>,
    pub bids: Vec<OrderBookLevel>,
}

impl OrderBook {
    /// Average of the summed ask and bid quantities.
    #[must_use]
    pub fn average_depth(&self) -> Decimal {
        let asks: Decimal = self.asks.iter().map(|l| l.quantity).sum();
        let bids: Decimal = self.bids.iter().map(|l| l.quantity).sum();
        (asks + bids) / Decimal::TWO
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[default]
    Unified,
    Contract,
}

impl AccountType {
    #[must_use]
    pub const fn as_api_str(self) -> &'static str {
        match self {
            Self::Unified => "UNIFIED",
            Self::Contract => "CONTRACT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Only `LONG` buys; every other action sells.
    #[must_use]
    pub const fn for_action(action: Action) -> Self {
        match action {
            Action::Long => Self::Buy,
            Action::Short | Action::Hold | Action::CloseAll => Self::Sell,
        }
    }

    #[must_use]
    pub const fn as_api_str(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// Market order built by the executor for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub leverage: u32,
    pub reference_price: Decimal,
}

/// Exchange acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
}

/// Structured record of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub action: Action,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub symbol: String,
    pub reference_price: Decimal,
    pub leverage: u32,
    pub order_id: String,
}
