//! Dispatcher and endpoint groups of the HTTP API.
//!
//! **Feature flag:** `http`
//!
//! A [`Client`] binds one backend from [`crate::transport`] to four stateless endpoint groups.
//! Every group method takes a typed request record and returns a [`Call`]: the target URL and
//! query are already built, the output shape and per-call options can still be changed. Sending
//! the call runs the backend and hands the response to [`crate::normalize::process`].
//!
//! | Group | Endpoints |
//! |-------|-----------|
//! | [`Client::alternative`] | `sentiments`, `tweets-sentiments`, `economic-events`, `news`, `macro-indicator/{country}`, `eod/{ticker}` |
//! | [`Client::exchange`] | `eod-bulk-last-day/{exchange}`, `exchanges-list/`, `exchange-symbol-list/{exchange}`, `exchange-details/{exchange}`, `symbol-change-history`, `screener`, `search/{query}` |
//! | [`Client::fundamental`] | `fundamentals/{ticker}`, `historical-market-cap/{ticker}`, `insider-transactions`, `bulk-fundamentals/{exchange}`, `calendar/{kind}`, `bond-fundamentals/{code}` |
//! | [`Client::market`] | `eod/{ticker}`, `real-time/{ticker}`, `div/{ticker}`, `splits/{ticker}`, `technical/{ticker}`, `intraday/{ticker}`, `options/{ticker}` |
//!
//! # Example
//!
//! ```no_run
//! use eodhd_client_sdk::http::{Client, Config};
//! use eodhd_client_sdk::http::types::request::EodRequest;
//! use eodhd_client_sdk::normalize::WriterOptions;
//!
//! # fn example() -> eodhd_client_sdk::Result<()> {
//! let client = Client::new("reqwest-blocking", Config::default())?;
//!
//! let request = EodRequest::builder().ticker("MCD.US").build();
//! let table = client
//!     .market()
//!     .historical(&request)?
//!     .output("tabular:mcd.csv".parse()?)
//!     .writer(WriterOptions::builder().reindex(vec!["Date".to_owned()]).build())
//!     .send_blocking()?;
//! # Ok(())
//! # }
//! ```

pub mod alternative;
pub mod client;
pub mod exchange;
pub mod fundamental;
pub mod market;
pub mod query;
pub mod types;

pub use self::client::{Call, Client, Config, DEFAULT_HOST, Mode};
