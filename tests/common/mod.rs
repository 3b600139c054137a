#![cfg(feature = "http")]
#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(
    unused,
    reason = "Deeply nested uses in sub-modules are falsely flagged as being unused"
)]

use std::time::Duration;

use eodhd_client_sdk::http::Config;
use eodhd_client_sdk::transport::RequestOptions;
use httpmock::MockServer;

pub const KEY: &str = "test-key";

pub const API_PREFIX: &str = "/api";

/// End-of-day bars as the service returns them with `fmt=csv`.
pub const EOD_CSV: &str = "Date,Open,High,Low,Close,Adjusted_close,Volume
2023-01-03,267.08,267.62,263.09,265.12,259.3,2161200
2023-01-04,265.5,268.21,264.17,267.58,261.71,2350700
";

#[must_use]
pub fn config(server: &MockServer) -> Config {
    Config::builder()
        .key(KEY)
        .host(server.url(API_PREFIX))
        .build()
}

#[must_use]
pub fn config_with_timeout(server: &MockServer, timeout: Duration) -> Config {
    Config::builder()
        .key(KEY)
        .host(server.url(API_PREFIX))
        .options(RequestOptions::builder().timeout(timeout).build())
        .build()
}

#[must_use]
pub fn path(endpoint: &str) -> String {
    format!("{API_PREFIX}/{endpoint}")
}
