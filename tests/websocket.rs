#![cfg(feature = "ws")]
#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests"
)]

use std::net::SocketAddr;
use std::time::Duration;

use eodhd_client_sdk::error::{AuthError, Kind, ResponseError};
use eodhd_client_sdk::ws::{Client, Config, Session};
use futures_util::{SinkExt as _, StreamExt as _, pin_mut};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// What the mock server does beyond the regular protocol.
#[derive(Debug, Clone, Default)]
struct Script {
    /// Sent right after the authorization reply
    after_auth: Vec<Value>,
    /// Close the socket after answering the first control message
    close_after_control: bool,
}

/// Mock streaming server.
///
/// The key `demo` is authorized, any other key is refused. A control message whose symbols do
/// not mention both `TSLA` and `MSFT` is answered with a `404` error, a valid subscription with a
/// single data message.
struct MockWsServer {
    addr: SocketAddr,
    /// Control messages received from clients
    control_rx: mpsc::UnboundedReceiver<String>,
}

impl MockWsServer {
    async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle(stream, script.clone(), control_tx.clone()));
            }
        });

        Self { addr, control_rx }
    }

    fn host(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn client(&self, key: &str, history: usize) -> Client {
        Client::new(
            Config::builder()
                .key(key)
                .host(self.host())
                .history(history)
                .build(),
        )
    }

    async fn recv_control(&mut self) -> Option<Value> {
        let text = timeout(Duration::from_secs(2), self.control_rx.recv())
            .await
            .ok()
            .flatten()?;
        serde_json::from_str(&text).ok()
    }
}

async fn handle(stream: TcpStream, script: Script, control_tx: mpsc::UnboundedSender<String>) {
    let mut token = None;
    let callback = |request: &Request, response: Response| {
        token = request.uri().query().and_then(|query| {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("api_token="))
                .map(ToOwned::to_owned)
        });
        Ok::<_, ErrorResponse>(response)
    };
    let Ok(mut socket) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
        return;
    };

    let greeting = if token.as_deref() == Some("demo") {
        json!({"status_code": 200, "message": "Authorized"})
    } else {
        json!({"status_code": 403, "message": "Forbidden"})
    };
    if socket.send(Message::Text(greeting.to_string().into())).await.is_err() {
        return;
    }
    for message in script.after_auth {
        if socket.send(Message::Text(message.to_string().into())).await.is_err() {
            return;
        }
    }

    while let Some(Ok(frame)) = socket.next().await {
        let Message::Text(text) = frame else {
            continue;
        };
        drop(control_tx.send(text.as_str().to_owned()));

        let Ok(control) = serde_json::from_str::<Value>(text.as_str()) else {
            continue;
        };
        let symbols = control["symbols"].as_str().unwrap_or_default();
        let reply = if !symbols.contains("TSLA") || !symbols.contains("MSFT") {
            Some(json!({"status_code": 404, "message": "Symbol error"}))
        } else if control["action"] == "subscribe" {
            Some(json!({"a": 100, "b": 200, "c": 300}))
        } else {
            None
        };

        if let Some(reply) = reply {
            if socket.send(Message::Text(reply.to_string().into())).await.is_err() {
                return;
            }
        }
        if script.close_after_control {
            drop(socket.close(None).await);
            return;
        }
    }
}

/// Collect every message `session` yields until its stream ends, deactivating after `stop_after`.
async fn drain(session: &mut Session, stop_after: usize) -> eodhd_client_sdk::Result<Vec<Value>> {
    let activity = session.activity();
    let stream = session.receive();
    pin_mut!(stream);

    let mut received = Vec::new();
    while let Some(message) = timeout(Duration::from_secs(2), stream.next()).await.unwrap() {
        received.push(serde_json::to_value(message?).unwrap());
        if received.len() >= stop_after {
            activity.deactivate();
        }
    }
    Ok(received)
}

#[tokio::test]
async fn unknown_endpoint_should_fail() {
    let server = MockWsServer::start(Script::default()).await;

    let err = server.client("demo", 0).connect("uk").await.unwrap_err();

    assert_eq!(err.kind(), Kind::UnknownEndpoint);
}

#[tokio::test]
async fn wrong_key_should_fail_authorization() -> anyhow::Result<()> {
    let server = MockWsServer::start(Script::default()).await;
    let mut session = server.client("demo1", 0).connect("us").await?;

    let err = session.subscribe(&["TSLA"], true).await.unwrap_err();

    assert_eq!(err.kind(), Kind::Auth);
    assert_eq!(err.downcast_ref::<AuthError>().unwrap().message, "Forbidden");
    assert!(!session.is_authorized());
    assert!(session.subscriptions().is_empty());
    Ok(())
}

#[tokio::test]
async fn server_error_should_fail_receive() -> anyhow::Result<()> {
    let server = MockWsServer::start(Script::default()).await;
    let mut session = server.client("demo", 0).connect("us").await?;

    session.subscribe(&["TSLA1"], true).await?;
    let err = drain(&mut session, 1).await.unwrap_err();

    assert_eq!(err.kind(), Kind::Response);
    let inner = err.downcast_ref::<ResponseError>().unwrap();
    assert_eq!(inner.code, Some(404));
    assert_eq!(inner.message, "Symbol error");
    Ok(())
}

#[tokio::test]
async fn flow_should_fill_history() -> anyhow::Result<()> {
    let mut server = MockWsServer::start(Script::default()).await;
    let mut session = server.client("demo", 10).connect("us").await?;

    session.activate();
    session.subscribe(&["TSLA", "MSFT"], true).await?;
    session.unsubscribe(&["MSFT"], true).await?;

    assert_eq!(
        server.recv_control().await,
        Some(json!({"action": "subscribe", "symbols": "TSLA, MSFT"}))
    );
    assert_eq!(
        server.recv_control().await,
        Some(json!({"action": "unsubscribe", "symbols": "MSFT"}))
    );
    assert!(session.is_active());
    assert_eq!(session.subscriptions().iter().collect::<Vec<_>>(), ["TSLA"]);

    let received = drain(&mut session, 1).await?;

    assert_eq!(received, [json!({"a": 100, "b": 200, "c": 300})]);
    assert!(!session.is_active());
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().iter().next().unwrap().get("a"), Some(&json!(100)));

    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn authorize_twice_should_read_once() -> anyhow::Result<()> {
    let script = Script {
        after_auth: vec![json!({"s": "TSLA", "t": 1_700_000_000_000_i64, "p": 251.2})],
        ..Script::default()
    };
    let server = MockWsServer::start(script).await;
    let mut session = server.client("demo", 0).connect("us").await?;

    session.authorize().await?;
    session.authorize().await?;
    assert!(session.is_authorized());

    session.activate();
    let received = drain(&mut session, 1).await?;

    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["s"], "TSLA");
    assert!(session.history().is_empty());
    Ok(())
}

#[tokio::test]
async fn server_close_should_end_stream() -> anyhow::Result<()> {
    let script = Script {
        close_after_control: true,
        ..Script::default()
    };
    let server = MockWsServer::start(script).await;
    let mut session = server.client("demo", 5).connect("crypto").await?;

    session.subscribe(&["TSLA", "MSFT"], true).await?;
    let received = drain(&mut session, usize::MAX).await?;

    assert_eq!(received.len(), 1);
    assert!(!session.is_active());
    assert_eq!(session.history().len(), 1);
    Ok(())
}

#[tokio::test]
async fn manual_activity_should_survive_subscribe() -> anyhow::Result<()> {
    let server = MockWsServer::start(Script::default()).await;
    let mut session = server.client("demo", 0).connect("us").await?;

    session.subscribe(&["TSLA", "MSFT"], false).await?;
    assert!(!session.is_active());
    assert_eq!(session.subscriptions().len(), 2);

    session.activate();
    session.unsubscribe(&["TSLA", "MSFT"], false).await?;
    assert!(session.is_active());
    assert!(session.subscriptions().is_empty());

    session.subscribe(&["TSLA", "MSFT"], true).await?;
    session.subscribe(&["TSLA"], true).await?;
    assert_eq!(session.subscriptions().len(), 2);
    assert!(session.is_active());
    Ok(())
}

#[tokio::test]
async fn inactive_session_should_yield_nothing() -> anyhow::Result<()> {
    let server = MockWsServer::start(Script::default()).await;
    let mut session = server.client("demo", 0).connect("index").await?;

    let received = drain(&mut session, 1).await?;

    assert!(received.is_empty());
    assert!(session.is_authorized());
    Ok(())
}
