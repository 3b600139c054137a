#![expect(
    clippy::module_name_repetitions,
    reason = "Configuration types intentionally mirror the module name for clarity"
)]

use bon::Builder;
use secrecy::SecretString;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;

/// Base URL of the streaming API. The endpoint name is appended as a path segment.
pub const DEFAULT_HOST: &str = "wss://ws.eodhistoricaldata.com/ws";

/// Configuration of a streaming [`Client`](super::Client).
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct Config {
    /// API token sent as `api_token`
    #[builder(default = SecretString::from(crate::DEMO_KEY), into)]
    pub key: SecretString,
    /// Base URL, without the endpoint segment
    #[builder(default = DEFAULT_HOST.to_owned(), into)]
    pub host: String,
    /// How many received messages each session keeps. `0` keeps none.
    #[builder(default)]
    pub history: usize,
    /// Protocol limits handed to the WebSocket handshake
    pub websocket: Option<WebSocketConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;

    #[test]
    fn default_should_disable_history() {
        let config = Config::default();
        assert_eq!(config.history, 0);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.key.expose_secret(), "demo");
        assert!(config.websocket.is_none());
    }
}
