//! Price source types and payload parsing

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while fetching a price
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Upstream answered with a non-success status
    #[error("Price API error: {status} - {body}")]
    Status { status: u16, body: String },
    /// Response body is not the expected JSON shape
    #[error("Malformed price payload: {0}")]
    Decode(#[from] serde_json::Error),
    /// Coin key absent from the response
    #[error("Coin '{0}' not found in API response")]
    SubjectMissing(String),
    /// Quote currency absent for the coin
    #[error("{currency} price not found for coin '{subject}'")]
    CurrencyMissing { subject: String, currency: String },
    /// Price is neither a number nor a string
    #[error("Unexpected type for price of '{subject}': {kind}")]
    UnexpectedType { subject: String, kind: &'static str },
    /// Price text could not be parsed as a decimal
    #[error("Cannot parse price '{0}'")]
    InvalidNumber(String),
}

/// A raw price as it appears in the upstream payload
#[derive(Debug, Clone, PartialEq)]
pub enum PriceValue {
    /// JSON number, e.g. `42500.12`
    Numeric(serde_json::Number),
    /// JSON string, e.g. `"42500.12"`
    Textual(String),
}

impl PriceValue {
    /// Classify a JSON value; anything other than a number or string is rejected
    pub fn classify(subject: &str, value: &Value) -> Result<Self, FetchError> {
        match value {
            Value::Number(n) => Ok(Self::Numeric(n.clone())),
            Value::String(s) => Ok(Self::Textual(s.clone())),
            other => Err(FetchError::UnexpectedType {
                subject: subject.to_string(),
                kind: json_kind(other),
            }),
        }
    }

    /// Convert to an exact decimal
    ///
    /// Numbers are parsed from their shortest decimal text rather than
    /// cast from `f64`.
    pub fn to_decimal(&self) -> Result<Decimal, FetchError> {
        let text = match self {
            Self::Numeric(n) => n.to_string(),
            Self::Textual(s) => s.trim().to_string(),
        };
        parse_decimal(&text).ok_or(FetchError::InvalidNumber(text))
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extract one coin's price from a `/simple/price` response body
///
/// Shape: `{"<coin>": {"<currency>": <number or string>}}`
pub fn parse_price_response(
    body: &str,
    subject: &str,
    currency: &str,
) -> Result<Decimal, FetchError> {
    let mut quotes: HashMap<String, HashMap<String, Value>> = serde_json::from_str(body)?;

    let coin = quotes
        .remove(subject)
        .ok_or_else(|| FetchError::SubjectMissing(subject.to_string()))?;

    let raw = coin
        .get(currency)
        .ok_or_else(|| FetchError::CurrencyMissing {
            subject: subject.to_string(),
            currency: currency.to_string(),
        })?;

    PriceValue::classify(subject, raw)?.to_decimal()
}
