//! Blocking historical request persisted as a re-keyed CSV table.
//!
//! Run with tracing enabled:
//! ```sh
//! RUST_LOG=debug,hyper_util=off,hyper=off,reqwest=off,rustls=off cargo run --example blocking --features tracing
//! ```
//!
//! Uses the `demo` key unless `EODHD_API_KEY` is set.

use eodhd_client_sdk::DEMO_KEY;
use eodhd_client_sdk::http::types::request::EodRequest;
use eodhd_client_sdk::http::{Client, Config};
use eodhd_client_sdk::normalize::WriterOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let key = std::env::var("EODHD_API_KEY").unwrap_or_else(|_| DEMO_KEY.to_owned());
    let client = Client::new("reqwest-blocking", Config::builder().key(key).build())?;

    let request = EodRequest::builder()
        .ticker("MCD.US")
        .start(chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default())
        .finish(chrono::NaiveDate::from_ymd_opt(2023, 1, 31).unwrap_or_default())
        .build();
    let writer = WriterOptions::builder()
        .rename_columns(vec![
            ("Date".to_owned(), "date".to_owned()),
            ("Adjusted_close".to_owned(), "close".to_owned()),
            ("Volume".to_owned(), "volume".to_owned()),
        ])
        .reorder_columns(true)
        .reindex(vec!["date".to_owned()])
        .build();

    let output = client
        .market()
        .historical(&request)?
        .output("tabular:mcd.csv".parse()?)
        .writer(writer)
        .send_blocking()?;

    if let Some(table) = output.as_table() {
        info!(rows = table.len(), columns = ?table.column_names(), "wrote mcd.csv");
        if let Some(close) = table.lookup(&["2023-01-03"], "close") {
            info!(%close, "close on 2023-01-03");
        }
    }

    Ok(())
}
