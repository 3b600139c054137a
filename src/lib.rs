#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod normalize;
pub mod transport;
pub mod types;
#[cfg(feature = "ws")]
pub mod ws;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// API key the service accepts for its sample tickers (`MCD.US`, `AAPL.US`, `TSLA`, ...).
pub const DEMO_KEY: &str = "demo";
