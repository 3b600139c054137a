use secrecy::ExposeSecret as _;
use tokio_tungstenite::connect_async_with_config;
use url::Url;

use super::config::Config;
use super::session::Session;
use super::types::Endpoint;
use crate::Result;

/// Entry point of the streaming API: opens one [`Session`] per endpoint.
///
/// ```no_run
/// use eodhd_client_sdk::ws::{Client, Config};
/// use futures::StreamExt as _;
///
/// # async fn example() -> eodhd_client_sdk::Result<()> {
/// let client = Client::new(Config::builder().history(100).build());
/// let mut session = client.connect("us").await?;
///
/// session.subscribe(&["TSLA", "MSFT"], true).await?;
/// let activity = session.activity();
///
/// let stream = session.receive();
/// futures::pin_mut!(stream);
/// while let Some(message) = stream.next().await {
///     println!("{}", message?);
///     activity.deactivate();
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Client {
    config: Config,
}

impl Client {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Socket URL of `endpoint`, carrying the API token.
    pub fn url(&self, endpoint: Endpoint) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{endpoint}",
            self.config.host.trim_end_matches('/')
        ))?;
        url.query_pairs_mut()
            .append_pair("api_token", self.config.key.expose_secret());

        Ok(url)
    }

    /// Open a session on the endpoint named `endpoint`.
    ///
    /// # Errors
    ///
    /// [`Kind::UnknownEndpoint`](crate::error::Kind::UnknownEndpoint) for names outside
    /// [`Endpoint`], [`Kind::WebSocket`](crate::error::Kind::WebSocket) when the handshake fails.
    pub async fn connect(&self, endpoint: &str) -> Result<Session> {
        self.open(endpoint.parse()?).await
    }

    /// Open a session on `endpoint`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(endpoint = %endpoint))
    )]
    pub async fn open(&self, endpoint: Endpoint) -> Result<Session> {
        let url = self.url(endpoint)?;
        let (socket, _) = connect_async_with_config(url.as_str(), self.config.websocket, false)
            .await
            .inspect_err(|e| {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "unable to connect");
                #[cfg(not(feature = "tracing"))]
                let _ = &e;
            })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(history = self.config.history, "connected");

        Ok(Session::new(endpoint, socket, self.config.history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_should_carry_endpoint_and_token() {
        let client = Client::new(Config::builder().key("secret").host("ws://localhost:9000/ws/").build());

        let url = client.url(Endpoint::UsQuote).unwrap();

        assert_eq!(url.as_str(), "ws://localhost:9000/ws/us-quote?api_token=secret");
    }

    #[tokio::test]
    async fn unknown_endpoint_should_fail_before_connecting() {
        let client = Client::new(Config::builder().host("ws://127.0.0.1:9").build());

        let err = client.connect("futures").await.unwrap_err();

        assert_eq!(err.kind(), crate::error::Kind::UnknownEndpoint);
    }
}
