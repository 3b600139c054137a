//! Live US trades until the message history is full.
//!
//! Run with tracing enabled:
//! ```sh
//! RUST_LOG=info,eodhd_client_sdk=debug cargo run --example streaming --features tracing
//! ```

use eodhd_client_sdk::DEMO_KEY;
use eodhd_client_sdk::ws::{Client, Config};
use futures::StreamExt as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

const HISTORY: usize = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let key = std::env::var("EODHD_API_KEY").unwrap_or_else(|_| DEMO_KEY.to_owned());
    let client = Client::new(Config::builder().key(key).history(HISTORY).build());

    let mut session = client.connect("us").await?;
    session.subscribe(&["TSLA", "AAPL"], true).await?;

    let activity = session.activity();
    let mut received = 0_usize;
    {
        let stream = session.receive();
        futures::pin_mut!(stream);

        while let Some(message) = stream.next().await {
            let message = message?;
            received += 1;
            info!(%message, "trade");

            if received >= HISTORY {
                activity.deactivate();
            }
        }
    }

    info!(received, kept = session.history().len(), "done");
    session.close().await?;
    Ok(())
}
