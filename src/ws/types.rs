use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, UnknownEndpoint};

/// Market segments the streaming API serves, one WebSocket path each.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Endpoint {
    /// US trades
    #[strum(serialize = "us")]
    Us,
    /// US best bid/ask quotes
    #[strum(serialize = "us-quote")]
    UsQuote,
    #[strum(serialize = "forex")]
    Forex,
    #[strum(serialize = "crypto")]
    Crypto,
    #[strum(serialize = "index")]
    Index,
}

impl Endpoint {
    pub const ALL: [Self; 5] = [Self::Us, Self::UsQuote, Self::Forex, Self::Crypto, Self::Index];
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "us" => Ok(Self::Us),
            "us-quote" => Ok(Self::UsQuote),
            "forex" => Ok(Self::Forex),
            "crypto" => Ok(Self::Crypto),
            "index" => Ok(Self::Index),
            other => Err(UnknownEndpoint {
                endpoint: other.to_owned(),
            }
            .into()),
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Subscribe,
    Unsubscribe,
}

/// Outbound control frame, e.g. `{"action":"subscribe","symbols":"TSLA, MSFT"}`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlMessage {
    pub action: Action,
    pub symbols: String,
}

impl ControlMessage {
    #[must_use]
    pub fn new<S: AsRef<str>>(action: Action, symbols: &[S]) -> Self {
        let symbols = symbols
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");

        Self { action, symbols }
    }
}

/// One data message of a stream.
///
/// Every endpoint carries the symbol as `s` and the event time as `t` (milliseconds). The rest of
/// the payload differs per endpoint (`p`/`v` for trades, `a`/`b` for quotes, ...). The payload is
/// kept as sent, so a field of an unexpected type never fails the stream.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamMessage {
    pub fields: Map<String, Value>,
}

impl StreamMessage {
    /// The `s` field when it is a string.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.fields.get(SYMBOL).and_then(Value::as_str)
    }

    /// The `t` field when it is an integer or an integral string.
    #[must_use]
    pub fn timestamp(&self) -> Option<i64> {
        match self.fields.get(TIMESTAMP)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

const SYMBOL: &str = "s";
const TIMESTAMP: &str = "t";

impl fmt::Display for StreamMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol().unwrap_or("-"))?;
        if let Some(t) = self.fields.get(TIMESTAMP) {
            write!(f, "@{t}")?;
        }
        for (key, value) in &self.fields {
            if key != SYMBOL && key != TIMESTAMP {
                write!(f, " {key}={value}")?;
            }
        }
        Ok(())
    }
}
