//! Live quotes over WebSocket.
//!
//! **Feature flag:** `ws`
//!
//! A [`Client`] opens one [`Session`] per market segment ([`Endpoint`]). The session owns its
//! socket and drives it directly: there is no background task, no reconnection and no retry.
//!
//! # Lifecycle
//!
//! 1. [`Client::connect`] validates the endpoint name and performs the handshake.
//! 2. The server greets with an authorization message, read lazily by the first
//!    [`Session::authorize`], [`Session::subscribe`], [`Session::unsubscribe`] or
//!    [`Session::receive`].
//! 3. Subscribing makes the session active (unless `auto` is off). [`Session::receive`] yields
//!    messages while it stays active.
//! 4. [`Activity::deactivate`] or the server closing the socket ends the stream. Dropping the
//!    session closes the socket.
//!
//! Received messages are kept in a bounded [`History`] when [`Config::history`] is non-zero.

pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod session;
pub mod types;

pub use client::Client;
pub use config::Config;
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
pub use history::History;
pub use session::{Activity, Session};
pub use types::{Endpoint, StreamMessage};
