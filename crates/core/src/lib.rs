pub mod config;
pub mod config_loader;
pub mod decision;
pub mod error;
pub mod events;
pub mod gate;
pub mod indicators;
pub mod position_sizing;
pub mod risk;
pub mod traits;

pub use config::{AppConfig, BybitConfig, NewsConfig, OracleConfig, TradingConfig};
pub use config_loader::ConfigLoader;
pub use decision::{Action, TradingDecision};
pub use error::{ConfigError, DecisionParseError, ExecutionError};
pub use events::{
    AccountType, ExecutionRecord, Kline, KlineInterval, MarketState, Order, OrderAck, OrderBook,
    OrderBookLevel, OrderSide, Ticker,
};
pub use gate::DecisionGate;
pub use position_sizing::PositionSizer;
pub use risk::RiskValidator;
pub use traits::{DecisionOracle, ExchangeClient, NewsSource};
