use crate::client::{ApiError, BybitClient};
use crate::models::{
    parse_decimal, KlineList, OrderBookResult, OrderCreateResult, TickerList, WalletBalanceResult,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use perp_agent_core::{
    AccountType, ExchangeClient, Kline, KlineInterval, OrderAck, OrderBook, OrderSide, Ticker,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;

/// Linear (USDT-margined) perpetuals.
const CATEGORY: &str = "linear";

/// `retCode` for "leverage not modified": the requested leverage is already set.
pub const LEVERAGE_NOT_MODIFIED: i64 = 110_043;

#[async_trait]
impl ExchangeClient for BybitClient {
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker> {
        let tickers: TickerList = self
            .get_public(
                "/v5/market/tickers",
                &[("category", CATEGORY.to_string()), ("symbol", symbol.to_string())],
            )
            .await?;

        let entry = tickers
            .list
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No ticker returned for {symbol}"))?;

        Ok(Ticker {
            last_price: parse_decimal("lastPrice", &entry.last_price)?,
            symbol: entry.symbol,
        })
    }

    async fn get_klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: u32,
    ) -> Result<Vec<Kline>> {
        let klines: KlineList = self
            .get_public(
                "/v5/market/kline",
                &[
                    ("category", CATEGORY.to_string()),
                    ("symbol", symbol.to_string()),
                    ("interval", interval.as_api_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        klines.into_klines()
    }

    async fn get_balance(&self, account_type: AccountType) -> Result<HashMap<String, Decimal>> {
        let wallet: WalletBalanceResult = self
            .get_signed(
                "/v5/account/wallet-balance",
                &[("accountType", account_type.as_api_str().to_string())],
            )
            .await?;
        wallet.into_available()
    }

    async fn get_order_book(&self, symbol: &str, depth: u32) -> Result<OrderBook> {
        let book: OrderBookResult = self
            .get_public(
                "/v5/market/orderbook",
                &[
                    ("category", CATEGORY.to_string()),
                    ("symbol", symbol.to_string()),
                    ("limit", depth.to_string()),
                ],
            )
            .await?;
        book.into_order_book()
    }

    async fn set_leverage(
        &self,
        symbol: &str,
        buy_leverage: u32,
        sell_leverage: u32,
    ) -> Result<()> {
        let envelope = self
            .post_signed(
                "/v5/position/set-leverage",
                &json!({
                    "category": CATEGORY,
                    "symbol": symbol,
                    "buyLeverage": buy_leverage.to_string(),
                    "sellLeverage": sell_leverage.to_string(),
                }),
            )
            .await?;

        if envelope.ret_code == LEVERAGE_NOT_MODIFIED {
            tracing::debug!(symbol, buy_leverage, "Leverage already set");
            return Ok(());
        }
        if envelope.ret_code != 0 {
            return Err(ApiError {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            }
            .into());
        }
        Ok(())
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderAck> {
        let envelope = self
            .post_signed(
                "/v5/order/create",
                &json!({
                    "category": CATEGORY,
                    "symbol": symbol,
                    "side": side.as_api_str(),
                    "orderType": "Market",
                    "qty": quantity.to_string(),
                }),
            )
            .await?;

        let created: OrderCreateResult = Self::decode(envelope)?;
        Ok(OrderAck {
            order_id: created.order_id,
        })
    }
}
