use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_stream::try_stream;
use futures::{SinkExt as _, Stream, StreamExt as _};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as TungsteniteError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::error::WsError;
use super::history::History;
use super::types::{Action, ControlMessage, Endpoint, StreamMessage};
use crate::Result;
use crate::error::Error;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Shared handle on a session's activity flag.
///
/// [`Session::receive`] checks the flag before awaiting each message, so a handle taken with
/// [`Session::activity`] before receiving can stop the stream from another task.
#[derive(Debug, Clone, Default)]
pub struct Activity(Arc<AtomicBool>);

impl Activity {
    pub fn activate(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn deactivate(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set(&self, active: bool) {
        self.0.store(active, Ordering::SeqCst);
    }
}

/// One open connection to a streaming endpoint.
///
/// The socket is owned exclusively by the session and closed when it is dropped. Authorization
/// is checked lazily: [`Session::subscribe`], [`Session::unsubscribe`] and [`Session::receive`]
/// all read the server's greeting first if it was not read yet.
pub struct Session {
    endpoint: Endpoint,
    socket: WsStream,
    authorized: bool,
    activity: Activity,
    subscriptions: BTreeSet<String>,
    history: History,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("authorized", &self.authorized)
            .field("active", &self.activity.is_active())
            .field("subscriptions", &self.subscriptions)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(endpoint: Endpoint, socket: WsStream, history: usize) -> Self {
        Self {
            endpoint,
            socket,
            authorized: false,
            activity: Activity::default(),
            subscriptions: BTreeSet::new(),
            history: History::with_capacity(history),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.activity.is_active()
    }

    /// A handle on the activity flag that outlives borrows of the session.
    #[must_use]
    pub fn activity(&self) -> Activity {
        self.activity.clone()
    }

    pub fn activate(&self) {
        self.activity.activate();
    }

    pub fn deactivate(&self) {
        self.activity.deactivate();
    }

    /// Symbols currently subscribed, sorted.
    #[must_use]
    pub fn subscriptions(&self) -> &BTreeSet<String> {
        &self.subscriptions
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Read the server's authorization message, once.
    ///
    /// Succeeds when the message has `status_code` 200 or the message `Authorized`. Once
    /// authorized, later calls return immediately without touching the socket.
    pub async fn authorize(&mut self) -> Result<()> {
        if self.authorized {
            return Ok(());
        }

        let Some(text) = self.next_text().await? else {
            return Err(Error::websocket_auth(
                "connection closed before authorization",
            ));
        };
        let reply: Value = serde_json::from_str(&text).map_err(WsError::MessageParse)?;

        let status = reply.get("status_code").and_then(Value::as_i64);
        let message = reply.get("message").and_then(Value::as_str);

        if status != Some(200) && message != Some("Authorized") {
            #[cfg(feature = "tracing")]
            tracing::warn!(endpoint = %self.endpoint, ?status, "authorization rejected");

            return Err(Error::websocket_auth(message.unwrap_or(text.as_str())));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.endpoint, "session authorized");

        self.authorized = true;
        Ok(())
    }

    /// Subscribe to `symbols`. Symbols the server does not know are ignored by it.
    ///
    /// With `auto` the session becomes active iff at least one symbol is subscribed afterwards.
    /// Without it the activity flag is left alone.
    pub async fn subscribe<S: AsRef<str>>(&mut self, symbols: &[S], auto: bool) -> Result<()> {
        self.authorize().await?;
        self.send(&ControlMessage::new(Action::Subscribe, symbols))
            .await?;

        self.subscriptions
            .extend(symbols.iter().map(|s| s.as_ref().to_owned()));
        if auto {
            self.activity.set(!self.subscriptions.is_empty());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            endpoint = %self.endpoint,
            added = symbols.len(),
            total = self.subscriptions.len(),
            "subscribed"
        );

        Ok(())
    }

    /// Unsubscribe from `symbols`, with the same `auto` semantics as [`Session::subscribe`].
    pub async fn unsubscribe<S: AsRef<str>>(&mut self, symbols: &[S], auto: bool) -> Result<()> {
        self.authorize().await?;
        self.send(&ControlMessage::new(Action::Unsubscribe, symbols))
            .await?;

        for symbol in symbols {
            self.subscriptions.remove(symbol.as_ref());
        }
        if auto {
            self.activity.set(!self.subscriptions.is_empty());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            endpoint = %self.endpoint,
            removed = symbols.len(),
            total = self.subscriptions.len(),
            "unsubscribed"
        );

        Ok(())
    }

    /// Stream data messages while the session is active.
    ///
    /// A message carrying `status` or `status_code` is an error reported by the server and ends
    /// the stream with [`Kind::Response`](crate::error::Kind::Response). The stream also ends,
    /// without error, once the session is deactivated or the server closes the socket; closure
    /// deactivates the session. Deactivation is observed before the next read, a read already
    /// in progress is not interrupted.
    pub fn receive(&mut self) -> impl Stream<Item = Result<StreamMessage>> + '_ {
        try_stream! {
            self.authorize().await?;

            while self.activity.is_active() {
                let Some(text) = self.next_text().await? else {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(endpoint = %self.endpoint, "socket closed by server");

                    self.activity.deactivate();
                    break;
                };

                let payload: Value = serde_json::from_str(&text).map_err(WsError::MessageParse)?;
                if let Some(error) = server_error(&payload) {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(endpoint = %self.endpoint, error = %error, "server reported an error");

                    Err(error)?;
                }

                let message: StreamMessage =
                    serde_json::from_value(payload).map_err(WsError::MessageParse)?;

                #[cfg(feature = "tracing")]
                tracing::trace!(endpoint = %self.endpoint, %message, "received");

                self.history.push(message.clone());
                yield message;
            }
        }
    }

    /// Send a close frame and drop the socket.
    pub async fn close(mut self) -> Result<()> {
        self.activity.deactivate();

        match self.socket.close(None).await {
            Ok(()) | Err(TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn send(&mut self, message: &ControlMessage) -> Result<()> {
        let json = serde_json::to_string(message).map_err(WsError::MessageParse)?;
        self.socket.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Next text payload, or `None` once the server closed the socket.
    async fn next_text(&mut self) -> Result<Option<String>> {
        while let Some(frame) = self.socket.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(
                    TungsteniteError::ConnectionClosed
                    | TungsteniteError::AlreadyClosed
                    | TungsteniteError::Protocol(ProtocolError::ResetWithoutClosingHandshake),
                ) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            match frame {
                Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
                Message::Binary(bytes) => {
                    let text = String::from_utf8(bytes.to_vec())
                        .map_err(|e| WsError::InvalidMessage(e.to_string()))?;
                    return Ok(Some(text));
                }
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }

        Ok(None)
    }
}

/// The error a server message reports, if it is one.
fn server_error(payload: &Value) -> Option<Error> {
    let status_code = payload.get("status_code");
    let status = payload.get("status");
    if status_code.is_none() && status.is_none() {
        return None;
    }

    let code = status_code.or(status).and_then(|code| match code {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    });
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Some(Error::response(code, message))
}
