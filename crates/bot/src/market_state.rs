use perp_agent_core::indicators::{percent_change, rsi, RSI_PERIOD};
use perp_agent_core::{AccountType, ExchangeClient, KlineInterval, MarketState, TradingConfig};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Query sizes and fallbacks used when building a snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotSettings {
    pub kline_limit_5m: u32,
    pub kline_limit_1h: u32,
    pub order_book_depth: u32,
    pub account_type: AccountType,
    pub quote_coin: String,
    pub fallback_balance: Decimal,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self::from(&TradingConfig::default())
    }
}

impl From<&TradingConfig> for SnapshotSettings {
    fn from(config: &TradingConfig) -> Self {
        Self {
            kline_limit_5m: config.kline_limit_5m,
            kline_limit_1h: config.kline_limit_1h,
            order_book_depth: config.order_book_depth,
            account_type: AccountType::Unified,
            quote_coin: config.quote_coin.clone(),
            fallback_balance: config.fallback_balance,
        }
    }
}

/// Builds a [`MarketState`] from independent exchange queries.
///
/// Each query that fails is logged and replaced by its default, so a
/// snapshot is always produced.
pub struct MarketStateAggregator {
    exchange: Arc<dyn ExchangeClient>,
    settings: SnapshotSettings,
}

impl MarketStateAggregator {
    #[must_use]
    pub fn new(exchange: Arc<dyn ExchangeClient>, settings: SnapshotSettings) -> Self {
        Self { exchange, settings }
    }

    pub async fn snapshot(&self, symbol: &str) -> MarketState {
        let last_price = match self.exchange.get_ticker(symbol).await {
            Ok(ticker) => ticker.last_price,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "Ticker unavailable");
                Decimal::ZERO
            }
        };

        let closes_5m = self
            .closes(symbol, KlineInterval::FiveMinutes, self.settings.kline_limit_5m)
            .await;
        let closes_1h = self
            .closes(symbol, KlineInterval::OneHour, self.settings.kline_limit_1h)
            .await;

        let balance_usdt = self.balance().await;

        let liquidity_depth = match self
            .exchange
            .get_order_book(symbol, self.settings.order_book_depth)
            .await
        {
            Ok(book) => book.average_depth(),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "Order book unavailable");
                Decimal::ZERO
            }
        };

        MarketState {
            symbol: symbol.to_string(),
            last_price,
            change_5m: change_vs_prior_bar(last_price, &closes_5m),
            rsi_5m: rsi(&closes_5m, RSI_PERIOD).unwrap_or(MarketState::NEUTRAL_RSI),
            rsi_1h: rsi(&closes_1h, RSI_PERIOD).unwrap_or(MarketState::NEUTRAL_RSI),
            liquidity_depth,
            balance_usdt,
        }
    }

    /// Closes oldest first; empty when the fetch fails.
    async fn closes(&self, symbol: &str, interval: KlineInterval, limit: u32) -> Vec<Decimal> {
        match self.exchange.get_klines(symbol, interval, limit).await {
            Ok(klines) => klines.into_iter().map(|k| k.close).collect(),
            Err(e) => {
                tracing::warn!(symbol, %interval, error = %e, "Klines unavailable");
                Vec::new()
            }
        }
    }

    async fn balance(&self) -> Decimal {
        match self.exchange.get_balance(self.settings.account_type).await {
            Ok(balances) => balances
                .get(&self.settings.quote_coin)
                .copied()
                .unwrap_or(self.settings.fallback_balance),
            Err(e) => {
                tracing::warn!(error = %e, "Balance unavailable");
                self.settings.fallback_balance
            }
        }
    }
}

/// Percent change of `price` against the second-to-last close.
///
/// Zero with fewer than two bars or without a positive price.
fn change_vs_prior_bar(price: Decimal, closes: &[Decimal]) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match closes {
        [.., prior, _] => percent_change(price, *prior).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}
