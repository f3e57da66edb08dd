//! Trading decisions produced by the oracle.
//!
//! Oracle output is untrusted text. [`TradingDecision::parse`] extracts the
//! JSON object, checks every field, and reports the first problem found.
//! [`TradingDecision::from_oracle_output`] never fails: anything that does not
//! validate collapses into [`TradingDecision::hold`].

use crate::error::DecisionParseError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Leverage assumed when the oracle omits the field.
pub const DEFAULT_LEVERAGE: u32 = 75;

/// Percent of equity assumed when the oracle omits the field.
pub const DEFAULT_SIZE_PERCENT: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Long,
    Short,
    Hold,
    CloseAll,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
            Self::Hold => "HOLD",
            Self::CloseAll => "CLOSE_ALL",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DecisionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(Self::Long),
            "SHORT" => Ok(Self::Short),
            "HOLD" => Ok(Self::Hold),
            "CLOSE_ALL" => Ok(Self::CloseAll),
            _ => Err(DecisionParseError::UnknownAction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingDecision {
    pub action: Action,
    pub leverage: u32,
    pub size_percent_of_equity: Decimal,
    pub reasoning: String,
    /// 0-100
    pub confidence: u8,
}

impl Default for TradingDecision {
    fn default() -> Self {
        Self::hold()
    }
}

impl TradingDecision {
    /// The single fallback decision: do nothing, zero confidence.
    #[must_use]
    pub fn hold() -> Self {
        Self {
            action: Action::Hold,
            leverage: DEFAULT_LEVERAGE,
            size_percent_of_equity: DEFAULT_SIZE_PERCENT,
            reasoning: String::new(),
            confidence: 0,
        }
    }

    /// Parses oracle output, falling back to [`TradingDecision::hold`] on any error.
    #[must_use]
    pub fn from_oracle_output(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed oracle decision, holding");
                Self::hold()
            }
        }
    }

    /// Parses and validates oracle output.
    ///
    /// Markdown code fences and prose around the JSON object are tolerated.
    /// `action` is required; the remaining fields fall back to their
    /// defaults when absent or null.
    ///
    /// # Errors
    /// Returns a [`DecisionParseError`] describing the first invalid field.
    pub fn parse(raw: &str) -> Result<Self, DecisionParseError> {
        let object = extract_object(raw)?;

        let action = match lookup(&object, &["action"]) {
            Some(Value::String(s)) => s.parse::<Action>()?,
            Some(_) => return Err(DecisionParseError::WrongType { field: "action" }),
            None => return Err(DecisionParseError::MissingField("action")),
        };

        let confidence = match lookup(&object, &["confidence"]) {
            Some(value) => {
                let n = integer_field(value, "confidence")?;
                n.to_u8()
                    .filter(|c| *c <= 100)
                    .ok_or_else(|| out_of_range("confidence", n))?
            }
            None => 0,
        };

        let leverage = match lookup(&object, &["leverage"]) {
            Some(value) => {
                let n = integer_field(value, "leverage")?;
                n.to_u32()
                    .filter(|l| *l >= 1)
                    .ok_or_else(|| out_of_range("leverage", n))?
            }
            None => DEFAULT_LEVERAGE,
        };

        let size_percent_of_equity =
            match lookup(&object, &["sizePercentOfEquity", "size_percent_of_equity"]) {
                Some(value) => {
                    let n = decimal_field(value, "sizePercentOfEquity")?;
                    if n.is_sign_negative() && !n.is_zero() {
                        return Err(out_of_range("sizePercentOfEquity", n));
                    }
                    n
                }
                None => DEFAULT_SIZE_PERCENT,
            };

        let reasoning = match lookup(&object, &["reasoning"]) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        Ok(Self {
            action,
            leverage,
            size_percent_of_equity,
            reasoning,
            confidence,
        })
    }
}

/// First JSON object in `raw`, read from the earliest `{` that starts one.
///
/// Only the object itself is consumed, so text after it may contain anything.
fn extract_object(raw: &str) -> Result<Map<String, Value>, DecisionParseError> {
    let mut first_error = None;

    for (start, _) in raw.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(map))) => return Ok(map),
            Some(Ok(_)) | None => {}
            Some(Err(e)) => {
                first_error.get_or_insert_with(|| DecisionParseError::InvalidJson(e.to_string()));
            }
        }
    }

    Err(first_error.unwrap_or(DecisionParseError::NoJsonObject))
}

/// First non-null value under any of `keys`.
fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find(|v| !v.is_null())
}

fn decimal_field(value: &Value, field: &'static str) -> Result<Decimal, DecisionParseError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(DecisionParseError::WrongType { field }),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| DecisionParseError::WrongType { field })
}

fn integer_field(value: &Value, field: &'static str) -> Result<Decimal, DecisionParseError> {
    let n = decimal_field(value, field)?;
    if n.fract().is_zero() {
        Ok(n)
    } else {
        Err(out_of_range(field, n))
    }
}

fn out_of_range(field: &'static str, value: Decimal) -> DecisionParseError {
    DecisionParseError::OutOfRange {
        field,
        value: value.to_string(),
    }
}
