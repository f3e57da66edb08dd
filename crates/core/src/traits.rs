use crate::events::{AccountType, Kline, KlineInterval, OrderAck, OrderBook, OrderSide, Ticker};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Exchange operations the agent depends on.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker>;

    /// Klines ordered oldest first.
    async fn get_klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: u32,
    ) -> Result<Vec<Kline>>;

    /// Available balance per coin.
    async fn get_balance(&self, account_type: AccountType) -> Result<HashMap<String, Decimal>>;

    async fn get_order_book(&self, symbol: &str, depth: u32) -> Result<OrderBook>;

    async fn set_leverage(&self, symbol: &str, buy_leverage: u32, sell_leverage: u32)
        -> Result<()>;

    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderAck>;
}

/// Opaque prompt-in, text-out decision maker.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Source of recent market news. Never fails; degrades to fallback text.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_latest(&self) -> String;
}
