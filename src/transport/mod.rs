//! Transport adapter contract and the built-in HTTP backends.
//!
//! Always compiled: the normalizer consumes [`TransportResponse`]. The blocking backend needs the
//! `blocking` feature.
//!
//! Every backend implements exactly one of two capability traits:
//!
//! - [`BlockingTransport`]: each request occupies the calling thread until it completes.
//! - [`SuspendingTransport`]: requests yield to the async scheduler while waiting on I/O, and the
//!   backend may hand out one reusable [`Connection`] that the dispatcher keeps for its lifetime.
//!
//! Whatever the backend, faults leave the adapter already translated into
//! [`Kind::ConnectionTimeout`], [`Kind::Connection`], [`Kind::Status`] or [`Kind::Transport`].
//!
//! ## Built-in backends
//!
//! | Name | Mode | Feature |
//! |------|------|---------|
//! | `reqwest` | suspending, pooled [`reqwest::Client`] as connection | `http` |
//! | `reqwest-blocking` | blocking, standalone connection per request | `blocking` |

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use url::Url;

use crate::Result;
use crate::error::{Error, Kind};

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod suspending;

/// Name of the suspending [`reqwest`] backend.
pub const REQWEST: &str = "reqwest";
/// Name of the blocking [`reqwest`] backend.
pub const REQWEST_BLOCKING: &str = "reqwest-blocking";

/// Raw result of one request: the media type and the untouched body.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    content_type: String,
    body: Vec<u8>,
}

impl TransportResponse {
    #[must_use]
    pub fn new<C: Into<String>, B: Into<Vec<u8>>>(content_type: C, body: B) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Media type without parameters, e.g. `application/json`.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Ordered query parameters. Keys may repeat, which is how list values are encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.push((key.into(), value.into()));
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Backend request options. The dispatcher holds defaults, each call may override them.
///
/// Timeouts are enforced by the backend only; the SDK itself never times out a request.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct RequestOptions {
    /// Total time allowed for one request
    pub timeout: Option<Duration>,
    /// Extra request headers
    #[builder(default)]
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Layers `overrides` on top of `self`: a set timeout wins and headers with the same name
    /// are replaced.
    #[must_use]
    pub fn merge(&self, overrides: &RequestOptions) -> RequestOptions {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(name, _)| {
                !overrides
                    .headers
                    .iter()
                    .any(|(other, _)| other.eq_ignore_ascii_case(name))
            })
            .cloned()
            .collect();
        headers.extend(overrides.headers.iter().cloned());

        RequestOptions {
            timeout: overrides.timeout.or(self.timeout),
            headers,
        }
    }
}

/// Reusable, backend specific connection object (e.g. a connection pool).
pub struct Connection(Box<dyn Any + Send + Sync>);

impl Connection {
    #[must_use]
    pub fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Self(Box::new(inner))
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// A backend whose requests block the calling thread.
pub trait BlockingTransport: Send + Sync + 'static {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Issue one `GET` request against `target`.
    fn request(
        &self,
        target: &Url,
        query: &Query,
        options: &RequestOptions,
    ) -> Result<TransportResponse>;
}

/// A backend whose requests suspend on I/O.
#[async_trait]
pub trait SuspendingTransport: Send + Sync + 'static {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Issue one `GET` request against `target`, reusing `connection` when given.
    async fn request(
        &self,
        connection: Option<&Connection>,
        target: &Url,
        query: &Query,
        options: &RequestOptions,
    ) -> Result<TransportResponse>;

    /// Connection factory. `None` means every request is a standalone connection.
    fn create_connection(&self) -> Option<Result<Connection>> {
        None
    }

    /// Release a connection produced by [`Self::create_connection`].
    async fn destroy_connection(&self, connection: Connection) -> Result<()> {
        drop(connection);
        Ok(())
    }
}

/// Tagged configuration value selecting the backend of a dispatcher.
#[non_exhaustive]
#[derive(Clone)]
pub enum Backend {
    /// One of the built-in backends, looked up by name
    Named(String),
    /// A caller supplied blocking backend
    Blocking(Arc<dyn BlockingTransport>),
    /// A caller supplied suspending backend
    Suspending(Arc<dyn SuspendingTransport>),
}

impl Backend {
    /// Resolve to a concrete [`Transport`].
    ///
    /// Fails with [`Kind::UnknownClient`] for names outside the built-in table and with
    /// [`Kind::ImproperClient`] for a built-in backend that was compiled out.
    pub fn resolve(self) -> Result<Transport> {
        match self {
            Backend::Named(name) => match name.as_str() {
                REQWEST => Ok(Transport::Suspending(Arc::new(
                    suspending::ReqwestTransport::default(),
                ))),
                #[cfg(feature = "blocking")]
                REQWEST_BLOCKING => Ok(Transport::Blocking(Arc::new(
                    blocking::ReqwestBlockingTransport::default(),
                ))),
                #[cfg(not(feature = "blocking"))]
                REQWEST_BLOCKING => Err(Error::improper_client(&name)),
                _ => Err(Error::unknown_client(&name)),
            },
            Backend::Blocking(transport) => Ok(Transport::Blocking(transport)),
            Backend::Suspending(transport) => Ok(Transport::Suspending(transport)),
        }
    }
}

impl From<&str> for Backend {
    fn from(name: &str) -> Self {
        Backend::Named(name.to_owned())
    }
}

impl From<String> for Backend {
    fn from(name: String) -> Self {
        Backend::Named(name)
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Backend::Blocking(t) => f.debug_tuple("Blocking").field(&t.name()).finish(),
            Backend::Suspending(t) => f.debug_tuple("Suspending").field(&t.name()).finish(),
        }
    }
}

/// A resolved backend together with its calling convention.
#[non_exhaustive]
#[derive(Clone)]
pub enum Transport {
    Blocking(Arc<dyn BlockingTransport>),
    Suspending(Arc<dyn SuspendingTransport>),
}

impl Transport {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Transport::Blocking(t) => t.name(),
            Transport::Suspending(t) => t.name(),
        }
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Blocking(t) => f.debug_tuple("Blocking").field(&t.name()).finish(),
            Transport::Suspending(t) => f.debug_tuple("Suspending").field(&t.name()).finish(),
        }
    }
}

/// Media type of a response, parameters stripped. A missing header yields an empty string.
pub(crate) fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_owned())
        .unwrap_or_default()
}

/// Maps a [`reqwest::Error`] onto the shared fault taxonomy.
///
/// Timeouts are checked before connect errors so a connect timeout counts as a timeout. The URL
/// carries the API key and is stripped from the error.
pub(crate) fn translate(error: reqwest::Error) -> Error {
    let path = error.url().map(|u| u.path().to_owned()).unwrap_or_default();
    let error = error.without_url();

    if let Some(status) = error.status() {
        let message = error.to_string();
        return Error::status(status, reqwest::Method::GET, path, message);
    }

    let kind = if error.is_timeout() {
        Kind::ConnectionTimeout
    } else if error.is_connect() {
        Kind::Connection
    } else {
        Kind::Transport
    };

    Error::with_source(kind, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_should_prefer_overrides() {
        let defaults = RequestOptions::builder()
            .timeout(Duration::from_secs(5))
            .headers(vec![
                ("Accept".to_owned(), "*/*".to_owned()),
                ("X-Trace".to_owned(), "a".to_owned()),
            ])
            .build();
        let overrides = RequestOptions::builder()
            .headers(vec![("x-trace".to_owned(), "b".to_owned())])
            .build();

        let merged = defaults.merge(&overrides);

        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            merged.headers,
            vec![
                ("Accept".to_owned(), "*/*".to_owned()),
                ("x-trace".to_owned(), "b".to_owned()),
            ]
        );
    }

    #[test]
    fn unknown_name_should_fail() {
        let err = Backend::from("urllib").resolve().unwrap_err();
        assert_eq!(err.kind(), Kind::UnknownClient);
    }

    #[test]
    fn reqwest_should_resolve_to_suspending() {
        let transport = Backend::from(REQWEST).resolve().unwrap();
        assert!(matches!(transport, Transport::Suspending(_)));
        assert_eq!(transport.name(), REQWEST);
    }

    #[cfg(feature = "blocking")]
    #[test]
    fn reqwest_blocking_should_resolve_to_blocking() {
        let transport = Backend::from(REQWEST_BLOCKING).resolve().unwrap();
        assert!(matches!(transport, Transport::Blocking(_)));
    }

    #[cfg(not(feature = "blocking"))]
    #[test]
    fn reqwest_blocking_without_feature_should_be_improper() {
        let err = Backend::from(REQWEST_BLOCKING).resolve().unwrap_err();
        assert_eq!(err.kind(), Kind::ImproperClient);
    }

    #[test]
    fn content_type_should_strip_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            "application/json; charset=utf-8".parse().unwrap(),
        );
        assert_eq!(content_type(&headers), "application/json");
        assert_eq!(content_type(&HeaderMap::new()), "");
    }

    #[test]
    fn query_should_keep_repeated_keys() {
        let mut query = Query::new();
        query.push("api_token", "demo");
        query.push("s", "AAPL.US");
        query.push("s", "TSLA.US");

        assert_eq!(query.get("s"), Some("AAPL.US"));
        assert_eq!(query.get_all("s").collect::<Vec<_>>(), ["AAPL.US", "TSLA.US"]);
        assert_eq!(query.len(), 3);
    }
}
