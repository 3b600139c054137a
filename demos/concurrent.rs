//! Two historical requests in flight at once on one suspending client.
//!
//! Run with tracing enabled:
//! ```sh
//! RUST_LOG=debug,hyper_util=off,hyper=off,reqwest=off,rustls=off cargo run --example concurrent --features tracing
//! ```

use std::time::Duration;

use eodhd_client_sdk::DEMO_KEY;
use eodhd_client_sdk::http::types::Fmt;
use eodhd_client_sdk::http::types::request::EodRequest;
use eodhd_client_sdk::http::{Client, Config};
use eodhd_client_sdk::transport::RequestOptions;
use futures::future::try_join;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let key = std::env::var("EODHD_API_KEY").unwrap_or_else(|_| DEMO_KEY.to_owned());
    let config = Config::builder()
        .key(key)
        .options(
            RequestOptions::builder()
                .timeout(Duration::from_secs(10))
                .build(),
        )
        .build();
    let mut client = Client::new("reqwest", config)?;

    let mcd = EodRequest::builder().ticker("MCD.US").fmt(Fmt::Json).build();
    let aapl = EodRequest::builder().ticker("AAPL.US").fmt(Fmt::Json).build();

    let result = try_join(
        client.market().historical(&mcd)?.send(),
        client.market().historical(&aapl)?.send(),
    )
    .await;

    match result {
        Ok((mcd, aapl)) => {
            for (ticker, output) in [("MCD.US", mcd), ("AAPL.US", aapl)] {
                let bars = output
                    .as_json()
                    .and_then(|value| value.as_array())
                    .map_or(0, Vec::len);
                info!(ticker, bars, "received");
            }
        }
        Err(e) => warn!(error = %e, kind = ?e.kind(), "request failed"),
    }

    client.destroy().await?;
    Ok(())
}
