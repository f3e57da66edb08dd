//! Bybit V5 response payloads and their conversion into core types.

use anyhow::{Context, Result};
use perp_agent_core::{Kline, OrderBook, OrderBookLevel};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Common V5 envelope; `result` is decoded separately once `ret_code` is known.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub ret_code: i64,
    #[serde(default)]
    pub ret_msg: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct TickerList {
    pub list: Vec<TickerEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerEntry {
    pub symbol: String,
    pub last_price: String,
}

/// Rows are `[startTime, open, high, low, close, volume, turnover]`, newest first.
#[derive(Debug, Deserialize)]
pub struct KlineList {
    pub list: Vec<Vec<String>>,
}

impl KlineList {
    /// Converts to klines ordered oldest first.
    ///
    /// # Errors
    /// Returns error if a row is short or holds a non-numeric value
    pub fn into_klines(self) -> Result<Vec<Kline>> {
        let mut klines = self
            .list
            .into_iter()
            .map(|row| {
                if row.len() < 5 {
                    anyhow::bail!("Kline row has {} fields, expected at least 5", row.len());
                }
                Ok(Kline {
                    open_time: row[0]
                        .parse::<i64>()
                        .with_context(|| format!("Invalid kline start time: {}", row[0]))?,
                    open: parse_decimal("open", &row[1])?,
                    high: parse_decimal("high", &row[2])?,
                    low: parse_decimal("low", &row[3])?,
                    close: parse_decimal("close", &row[4])?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        klines.sort_by_key(|k| k.open_time);
        Ok(klines)
    }
}

/// Levels are `[price, size]`.
#[derive(Debug, Deserialize)]
pub struct OrderBookResult {
    #[serde(default)]
    pub a: Vec<Vec<String>>,
    #[serde(default)]
    pub b: Vec<Vec<String>>,
}

impl OrderBookResult {
    /// # Errors
    /// Returns error if a level is malformed
    pub fn into_order_book(self) -> Result<OrderBook> {
        Ok(OrderBook {
            asks: parse_levels(self.a)?,
            bids: parse_levels(self.b)?,
        })
    }
}

fn parse_levels(rows: Vec<Vec<String>>) -> Result<Vec<OrderBookLevel>> {
    rows.into_iter()
        .map(|row| match row.as_slice() {
            [price, quantity, ..] => Ok(OrderBookLevel {
                price: parse_decimal("price", price)?,
                quantity: parse_decimal("size", quantity)?,
            }),
            _ => anyhow::bail!("Order book level has {} fields, expected 2", row.len()),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct WalletBalanceResult {
    pub list: Vec<WalletAccount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub coin: Vec<CoinBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    pub coin: String,
    #[serde(default)]
    pub wallet_balance: String,
    #[serde(default)]
    pub available_to_withdraw: String,
}

impl CoinBalance {
    /// Withdrawable amount, or the wallet balance when the exchange leaves it blank.
    fn available(&self) -> Result<Decimal> {
        if self.available_to_withdraw.trim().is_empty() {
            parse_decimal("walletBalance", &self.wallet_balance)
        } else {
            parse_decimal("availableToWithdraw", &self.available_to_withdraw)
        }
    }
}

impl WalletBalanceResult {
    /// Available balance per coin across the returned accounts.
    ///
    /// # Errors
    /// Returns error if an amount is not numeric
    pub fn into_available(self) -> Result<HashMap<String, Decimal>> {
        let mut balances = HashMap::new();
        for coin in self.list.iter().flat_map(|account| account.coin.iter()) {
            *balances.entry(coin.coin.clone()).or_insert(Decimal::ZERO) += coin.available()?;
        }
        Ok(balances)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateResult {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
}

pub(crate) fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).with_context(|| format!("Invalid {field}: {value:?}"))
}
