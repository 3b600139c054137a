#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;

/// Socket level faults of a streaming session.
///
/// Faults reported by the server itself are [`crate::error::AuthError`] and
/// [`crate::error::ResponseError`], not this type.
#[non_exhaustive]
#[derive(Debug)]
pub enum WsError {
    /// Error connecting to or communicating with the WebSocket server
    Connection(tokio_tungstenite::tungstenite::Error),
    /// A text frame that is not valid JSON
    MessageParse(serde_json::Error),
    /// Received a frame that cannot be a stream message
    InvalidMessage(String),
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "WebSocket connection error: {e}"),
            Self::MessageParse(e) => write!(f, "Failed to parse WebSocket message: {e}"),
            Self::InvalidMessage(msg) => write!(f, "Invalid WebSocket message: {msg}"),
        }
    }
}

impl StdError for WsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) => Some(e),
            Self::MessageParse(e) => Some(e),
            Self::InvalidMessage(_) => None,
        }
    }
}

impl From<WsError> for crate::error::Error {
    fn from(e: WsError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for crate::error::Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, WsError::Connection(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Kind};

    #[test]
    fn socket_faults_should_map_to_websocket_kind() {
        let error: Error = tokio_tungstenite::tungstenite::Error::AlreadyClosed.into();

        assert_eq!(error.kind(), Kind::WebSocket);
        assert!(matches!(error.downcast_ref::<WsError>(), Some(WsError::Connection(_))));
    }

    #[test]
    fn invalid_message_should_have_no_source() {
        let error = WsError::InvalidMessage("binary frame is not UTF-8".to_owned());

        assert!(error.source().is_none());
        assert_eq!(error.to_string(), "Invalid WebSocket message: binary frame is not UTF-8");
    }
}
