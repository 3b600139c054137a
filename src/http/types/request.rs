#![allow(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

//! Parameter records of every endpoint.
//!
//! Fields marked `skip_serializing` are path segments, everything else becomes a query
//! parameter after renaming (`start` → `from`, `finish` → `to`, `extract` → `filter`, ...).

use bon::Builder;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use super::{BulkKind, CalendarKind, Comparison, Fmt, Interval, Order, Period, SentimentSource};

const DEFAULT_EXCHANGE: &str = "US";

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct SentimentRequest {
    #[serde(skip_serializing)]
    #[builder(default)]
    pub source: SentimentSource,
    /// Comma separated tickers, e.g. `btc-usd.cc,aapl`
    #[builder(into)]
    pub lookup: String,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct EconomicEventsRequest {
    /// ISO 3166 country code
    #[builder(into)]
    pub country: Option<String>,
    pub comparison: Option<Comparison>,
    #[builder(default = 50)]
    pub limit: u32,
    #[builder(default)]
    pub offset: u32,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct NewsRequest {
    #[builder(into)]
    pub symbol: Option<String>,
    #[builder(into)]
    pub tag: Option<String>,
    #[builder(default = 50)]
    pub limit: u32,
    #[builder(default)]
    pub offset: u32,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct MacroIndicatorRequest {
    /// Alpha-3 ISO country code
    #[serde(skip_serializing)]
    #[builder(into)]
    pub country: String,
    #[builder(into)]
    pub indicator: Option<String>,
    #[builder(default = Fmt::Json)]
    pub fmt: Fmt,
}

/// End-of-day bars, also used for macroeconomic and bond series.
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct EodRequest {
    /// `{symbol}.{exchange}`
    #[serde(skip_serializing)]
    #[builder(into)]
    pub ticker: String,
    #[builder(default)]
    pub period: Period,
    #[builder(default)]
    pub order: Order,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
    #[builder(into)]
    pub extract: Option<String>,
    #[builder(default)]
    pub fmt: Fmt,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct BulkEodRequest {
    #[serde(skip_serializing)]
    #[builder(default = DEFAULT_EXCHANGE.to_owned(), into)]
    pub exchange: String,
    pub kind: Option<BulkKind>,
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub symbols: Vec<String>,
    #[builder(into)]
    pub extract: Option<String>,
    #[builder(default)]
    pub fmt: Fmt,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct TickersRequest {
    #[serde(skip_serializing)]
    #[builder(default = DEFAULT_EXCHANGE.to_owned(), into)]
    pub exchange: String,
    /// `1` includes delisted tickers
    #[builder(default = 1)]
    pub delisted: u8,
    #[builder(default)]
    pub fmt: Fmt,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct ExchangeDetailsRequest {
    #[serde(skip_serializing)]
    #[builder(default = DEFAULT_EXCHANGE.to_owned(), into)]
    pub exchange: String,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Builder, Serialize)]
#[non_exhaustive]
pub struct SymbolChangeHistoryRequest {
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct ScreenerRequest {
    /// JSON encoded filter list, e.g. `[["market_capitalization",">",1000]]`
    #[builder(into)]
    pub filters: Option<String>,
    #[builder(into)]
    pub signals: Option<String>,
    /// `field_name.(asc|desc)`
    #[builder(into)]
    pub sort: Option<String>,
    #[builder(default = 50)]
    pub limit: u32,
    #[builder(default)]
    pub offset: u32,
    #[builder(default)]
    pub fmt: Fmt,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct SearchRequest {
    #[serde(skip_serializing)]
    #[builder(into)]
    pub query: String,
    #[builder(default = 15)]
    pub limit: u32,
    #[builder(default)]
    pub bonds_only: u8,
    #[builder(into)]
    pub exchange: Option<String>,
    /// Asset type: `stock`, `etf`, `fund`, `bonds`, `index`, `crypto`
    #[builder(into)]
    pub kind: Option<String>,
}

/// A request addressed by ticker alone.
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct TickerRequest {
    #[serde(skip_serializing)]
    #[builder(into)]
    pub ticker: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct FundamentalsRequest {
    #[serde(skip_serializing)]
    #[builder(into)]
    pub ticker: String,
    /// Section filter, e.g. `General` or `Financials::Balance_Sheet`
    #[builder(into)]
    pub extract: Option<String>,
}

/// Ticker plus an optional date range.
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct RangeRequest {
    #[serde(skip_serializing)]
    #[builder(into)]
    pub ticker: String,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct InsiderRequest {
    #[builder(into)]
    pub code: Option<String>,
    #[builder(default = 100)]
    pub limit: u32,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct BulkFundamentalsRequest {
    #[serde(skip_serializing)]
    #[builder(into)]
    pub exchange: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub symbols: Vec<String>,
    #[builder(default = 50)]
    pub limit: u32,
    #[builder(default)]
    pub offset: u32,
    #[builder(default)]
    pub fmt: Fmt,
}

/// Calendar query. Trends ignore the date range, IPOs and splits ignore `symbols`.
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct CalendarRequest {
    #[serde(skip_serializing)]
    pub kind: CalendarKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub symbols: Vec<String>,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
    #[builder(default)]
    pub fmt: Fmt,
}

#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct BondRequest {
    /// CUSIP or ISIN of the bond
    #[serde(skip_serializing)]
    #[builder(into)]
    pub code: String,
}

/// Delayed quotes. The first ticker is the path segment, the rest travel as `s`.
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct DelayedRequest {
    #[serde(skip_serializing)]
    pub tickers: Vec<String>,
    #[builder(into)]
    pub extract: Option<String>,
    #[builder(default)]
    pub fmt: Fmt,
}

/// Historical dividends or splits.
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct CorporateActionRequest {
    #[serde(skip_serializing)]
    #[builder(into)]
    pub ticker: String,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
    #[builder(default)]
    pub fmt: Fmt,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct IndicatorRequest {
    #[serde(skip_serializing)]
    #[builder(into)]
    pub ticker: String,
    /// Indicator function, e.g. `sma` or `stochastic`
    #[builder(into)]
    pub function: String,
    /// Function parameters, merged into the query as is
    #[serde(flatten)]
    #[builder(default)]
    pub params: Map<String, Value>,
    #[builder(default)]
    pub order: Order,
    #[builder(into)]
    pub splitadjusted_only: Option<String>,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
    #[builder(into)]
    pub extract: Option<String>,
    #[builder(default)]
    pub fmt: Fmt,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct IntradayRequest {
    #[serde(skip_serializing)]
    #[builder(into)]
    pub ticker: String,
    #[builder(default)]
    pub interval: Interval,
    /// UNIX seconds, UTC
    pub start: Option<i64>,
    /// UNIX seconds, UTC
    pub finish: Option<i64>,
    #[builder(default)]
    pub fmt: Fmt,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct OptionsRequest {
    #[serde(skip_serializing)]
    #[builder(into)]
    pub ticker: String,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
    #[builder(into)]
    pub contract: Option<String>,
    pub trade_date_start: Option<NaiveDate>,
    pub trade_date_finish: Option<NaiveDate>,
}
