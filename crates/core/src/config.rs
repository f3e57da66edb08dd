use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bybit: BybitConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub trading: TradingConfig,
}

impl AppConfig {
    /// Checks required credentials and numeric sanity.
    ///
    /// # Errors
    /// Returns the first missing or invalid key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("bybit.api_key", &self.bybit.api_key),
            ("bybit.api_secret", &self.bybit.api_secret),
            ("oracle.model", &self.oracle.model),
            ("oracle.api_key", &self.oracle.api_key),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingKey(key));
            }
        }

        if self.trading.symbol.trim().is_empty() {
            return Err(ConfigError::MissingKey("trading.symbol"));
        }
        if self.trading.reference_equity <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                key: "trading.reference_equity",
                reason: "must be positive".to_string(),
            });
        }
        if self.trading.confidence_threshold > 100 {
            return Err(ConfigError::Invalid {
                key: "trading.confidence_threshold",
                reason: "must be between 0 and 100".to_string(),
            });
        }
        if self.bybit.requests_per_second == 0 {
            return Err(ConfigError::Invalid {
                key: "bybit.requests_per_second",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BybitConfig {
    #[serde(default, deserialize_with = "credential")]
    pub api_key: String,
    #[serde(default, deserialize_with = "credential")]
    pub api_secret: String,
    /// Trade against the demo environment instead of live
    #[serde(default = "default_true")]
    pub use_demo: bool,
    /// Overrides the environment's base URL
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    #[serde(default = "default_exchange_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

pub const BYBIT_LIVE_URL: &str = "https://api.bybit.com";
pub const BYBIT_DEMO_URL: &str = "https://api-demo.bybit.com";

impl BybitConfig {
    /// REST base URL for the configured environment.
    #[must_use]
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if self.use_demo => BYBIT_DEMO_URL.to_string(),
            None => BYBIT_LIVE_URL.to_string(),
        }
    }
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            use_demo: true,
            base_url: None,
            recv_window_ms: default_recv_window_ms(),
            request_timeout_secs: default_exchange_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

pub const DEFAULT_TRADER_INSTRUCTIONS: &str = "You are an aggressive expert trader of the BTCUSDT perpetual. \
Goal: grow the DEMO capital using 50x-100x leverage. Always respect risk management \
(max 8% risk per trade). Use only real data, liquidity and sentiment. ALWAYS return valid JSON.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "credential")]
    pub api_key: String,
    #[serde(default = "default_oracle_url")]
    pub base_url: String,
    #[serde(default = "default_oracle_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// System message sent with every prompt
    #[serde(default = "default_instructions")]
    pub instructions: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            api_key: String::new(),
            base_url: default_oracle_url(),
            timeout_secs: default_oracle_timeout_secs(),
            temperature: None,
            instructions: default_instructions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_url")]
    pub url: String,
    #[serde(default = "default_news_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            url: default_news_url(),
            timeout_secs: default_news_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Equity the sizer works from; independent of the live wallet balance
    #[serde(default = "default_reference_equity")]
    pub reference_equity: Decimal,
    #[serde(default = "default_max_risk_percent")]
    pub max_risk_percent: Decimal,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    #[serde(default = "default_error_cooldown_secs")]
    pub error_cooldown_secs: u64,
    #[serde(default = "default_kline_limit_5m")]
    pub kline_limit_5m: u32,
    #[serde(default = "default_kline_limit_1h")]
    pub kline_limit_1h: u32,
    #[serde(default = "default_order_book_depth")]
    pub order_book_depth: u32,
    #[serde(default = "default_quote_coin")]
    pub quote_coin: String,
    #[serde(default = "default_fallback_balance")]
    pub fallback_balance: Decimal,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            reference_equity: default_reference_equity(),
            max_risk_percent: default_max_risk_percent(),
            confidence_threshold: default_confidence_threshold(),
            cycle_interval_secs: default_cycle_interval_secs(),
            error_cooldown_secs: default_error_cooldown_secs(),
            kline_limit_5m: default_kline_limit_5m(),
            kline_limit_1h: default_kline_limit_1h(),
            order_book_depth: default_order_book_depth(),
            quote_coin: default_quote_coin(),
            fallback_balance: default_fallback_balance(),
        }
    }
}

/// Accepts a credential given as a string or as a bare number.
///
/// Environment values are parsed as typed values, so an all-digit key
/// arrives as an integer. Keys with leading zeros must be quoted to survive.
fn credential<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct CredentialVisitor;

    impl Visitor<'_> for CredentialVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(CredentialVisitor)
}

const fn default_true() -> bool {
    true
}

const fn default_recv_window_ms() -> u64 {
    5000
}

const fn default_exchange_timeout_secs() -> u64 {
    10
}

const fn default_requests_per_second() -> u32 {
    10
}

fn default_oracle_url() -> String {
    "https://api.openai.com/v1".to_string()
}

const fn default_oracle_timeout_secs() -> u64 {
    60
}

fn default_instructions() -> String {
    DEFAULT_TRADER_INSTRUCTIONS.to_string()
}

fn default_news_url() -> String {
    "https://cryptocurrency.cv/api/news?limit=5&category=bitcoin".to_string()
}

const fn default_news_timeout_secs() -> u64 {
    10
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

fn default_reference_equity() -> Decimal {
    Decimal::from(1000)
}

fn default_max_risk_percent() -> Decimal {
    Decimal::from(8)
}

const fn default_confidence_threshold() -> u8 {
    75
}

const fn default_cycle_interval_secs() -> u64 {
    45
}

const fn default_error_cooldown_secs() -> u64 {
    10
}

const fn default_kline_limit_5m() -> u32 {
    200
}

const fn default_kline_limit_1h() -> u32 {
    100
}

const fn default_order_book_depth() -> u32 {
    50
}

fn default_quote_coin() -> String {
    "USDT".to_string()
}

fn default_fallback_balance() -> Decimal {
    Decimal::from(1000)
}
