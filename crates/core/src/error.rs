use thiserror::Error;

/// Startup configuration failures. Fatal: the daemon does not start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration key `{0}`")]
    MissingKey(&'static str),

    #[error("invalid configuration value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Oracle output that cannot be turned into a `TradingDecision`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecisionParseError {
    #[error("no JSON object found in oracle output")]
    NoJsonObject,

    #[error("oracle output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("field `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error("field `{field}` has the wrong type")]
    WrongType { field: &'static str },
}

/// Exchange-side rejection while executing a decision.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("leverage {leverage}x rejected for {symbol}: {message}")]
    LeverageRejected {
        symbol: String,
        leverage: u32,
        message: String,
    },

    #[error("order rejected for {symbol}: {message}")]
    OrderRejected { symbol: String, message: String },

    #[error("cannot size order: {0}")]
    Sizing(String),
}
