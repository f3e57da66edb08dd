#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use perp_agent_core::{
    AccountType, DecisionOracle, ExchangeClient, Kline, KlineInterval, NewsSource, OrderAck,
    OrderBook, OrderBookLevel, OrderSide, Ticker,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeCall {
    Ticker,
    Klines(KlineInterval, u32),
    Balance(AccountType),
    OrderBook(u32),
    SetLeverage { buy: u32, sell: u32 },
    MarketOrder { side: OrderSide, quantity: Decimal },
}

/// Scripted exchange. `None` fields make the matching call fail.
pub struct MockExchange {
    pub price: Option<Decimal>,
    pub klines_5m: Option<Vec<Kline>>,
    pub klines_1h: Option<Vec<Kline>>,
    pub balances: Option<HashMap<String, Decimal>>,
    pub order_book: Option<OrderBook>,
    pub leverage_error: Option<String>,
    /// Failures consumed by successive orders before orders succeed.
    pub order_errors: Mutex<VecDeque<String>>,
    pub calls: Mutex<Vec<ExchangeCall>>,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self {
            price: Some(dec!(65000)),
            klines_5m: Some(klines_from_closes(&rising_closes(30))),
            klines_1h: Some(klines_from_closes(&rising_closes(30))),
            balances: Some(HashMap::from([("USDT".to_string(), dec!(2500))])),
            order_book: Some(OrderBook {
                asks: vec![level(dec!(65001), dec!(1.5)), level(dec!(65002), dec!(2.5))],
                bids: vec![level(dec!(64999), dec!(3)), level(dec!(64998), dec!(1))],
            }),
            leverage_error: None,
            order_errors: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockExchange {
    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn orders(&self) -> Vec<ExchangeCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ExchangeCall::MarketOrder { .. }))
            .collect()
    }

    pub fn leverage_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ExchangeCall::SetLeverage { .. }))
            .count()
    }

    pub fn fail_next_order(&self, message: &str) {
        self.order_errors.lock().unwrap().push_back(message.to_string());
    }

    fn record(&self, call: ExchangeCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ExchangeClient for MockExchange {
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker> {
        self.record(ExchangeCall::Ticker);
        let last_price = self.price.ok_or_else(|| anyhow!("ticker down"))?;
        Ok(Ticker {
            symbol: symbol.to_string(),
            last_price,
        })
    }

    async fn get_klines(
        &self,
        _symbol: &str,
        interval: KlineInterval,
        limit: u32,
    ) -> Result<Vec<Kline>> {
        self.record(ExchangeCall::Klines(interval, limit));
        let klines = match interval {
            KlineInterval::FiveMinutes => &self.klines_5m,
            KlineInterval::OneHour => &self.klines_1h,
        };
        klines.clone().ok_or_else(|| anyhow!("klines down"))
    }

    async fn get_balance(&self, account_type: AccountType) -> Result<HashMap<String, Decimal>> {
        self.record(ExchangeCall::Balance(account_type));
        self.balances.clone().ok_or_else(|| anyhow!("wallet down"))
    }

    async fn get_order_book(&self, _symbol: &str, depth: u32) -> Result<OrderBook> {
        self.record(ExchangeCall::OrderBook(depth));
        self.order_book.clone().ok_or_else(|| anyhow!("order book down"))
    }

    async fn set_leverage(&self, _symbol: &str, buy: u32, sell: u32) -> Result<()> {
        self.record(ExchangeCall::SetLeverage { buy, sell });
        match &self.leverage_error {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }

    async fn place_market_order(
        &self,
        _symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderAck> {
        self.record(ExchangeCall::MarketOrder { side, quantity });
        if let Some(message) = self.order_errors.lock().unwrap().pop_front() {
            return Err(anyhow!("{message}"));
        }
        Ok(OrderAck {
            order_id: format!("order-{}", self.orders().len()),
        })
    }
}

/// Replies from a script, then HOLD once the script runs out. Keeps every prompt.
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DecisionOracle for ScriptedOracle {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!("{message}")),
            None => Ok(r#"{"action":"HOLD","confidence":0}"#.to_string()),
        }
    }
}

pub struct StaticNews(pub &'static str);

#[async_trait]
impl NewsSource for StaticNews {
    async fn fetch_latest(&self) -> String {
        self.0.to_string()
    }
}

pub const LONG_REPLY: &str = r#"{"action":"LONG","leverage":75,"sizePercentOfEquity":8,"reasoning":"momentum","confidence":85}"#;

pub fn level(price: Decimal, quantity: Decimal) -> OrderBookLevel {
    OrderBookLevel { price, quantity }
}

pub fn rising_closes(n: usize) -> Vec<Decimal> {
    (0..n).map(|i| dec!(64000) + Decimal::from(i * 10)).collect()
}

pub fn klines_from_closes(closes: &[Decimal]) -> Vec<Kline> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Kline {
            open_time: i as i64 * 300_000,
            open: close,
            high: close,
            low: close,
            close,
        })
        .collect()
}
