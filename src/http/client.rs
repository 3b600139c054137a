use bon::Builder;
use secrecy::SecretString;
use serde::Serialize;
use url::Url;

use super::alternative::Alternative;
use super::exchange::Exchange;
use super::fundamental::Fundamental;
use super::market::Market;
use super::query::prepare;
use crate::{DEMO_KEY, Result};
use crate::error::Error;
use crate::normalize::{Output, OutputSpec, WriterOptions, process};
use crate::transport::{Backend, Connection, Query, RequestOptions, Transport};

/// Base URL of the HTTP API.
pub const DEFAULT_HOST: &str = "https://eodhistoricaldata.com/api";

/// Settings shared by every call of one [`Client`].
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct Config {
    /// API token sent as `api_token`
    #[builder(default = SecretString::from(DEMO_KEY), into)]
    pub key: SecretString,
    /// Base URL every endpoint path is appended to
    #[builder(default = DEFAULT_HOST.to_owned(), into)]
    pub host: String,
    /// Default request options, per-call options are layered on top
    #[builder(default)]
    pub options: RequestOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Calling convention of the backend bound to a [`Client`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Drive calls with [`Call::send_blocking`]
    Blocking,
    /// Drive calls with [`Call::send`]
    Suspending,
}

/// Client dispatcher: one resolved backend bound to four endpoint groups.
///
/// A suspending backend with a connection factory gets one connection up front, shared by every
/// call until [`Client::destroy`].
///
/// ```no_run
/// use eodhd_client_sdk::http::{Client, Config};
/// use eodhd_client_sdk::http::types::request::EodRequest;
///
/// # async fn example() -> eodhd_client_sdk::Result<()> {
/// let mut client = Client::new("reqwest", Config::default())?;
///
/// let request = EodRequest::builder().ticker("MCD.US").build();
/// let output = client.market().historical(&request)?.send().await?;
/// println!("{:?}", output.as_text());
///
/// client.destroy().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    transport: Transport,
    connection: Option<Connection>,
    host: String,
    key: SecretString,
    options: RequestOptions,
}

impl Client {
    /// Resolve `backend` and bind it.
    ///
    /// # Errors
    ///
    /// [`Kind::UnknownClient`](crate::error::Kind::UnknownClient) or
    /// [`Kind::ImproperClient`](crate::error::Kind::ImproperClient) when the backend cannot be
    /// resolved, or the connection factory's own error.
    pub fn new<B: Into<Backend>>(backend: B, config: Config) -> Result<Self> {
        let transport = backend.into().resolve()?;

        let connection = match &transport {
            Transport::Suspending(t) => t.create_connection().transpose()?,
            Transport::Blocking(_) => None,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            backend = transport.name(),
            connection = connection.is_some(),
            "HTTP client created"
        );

        Ok(Self {
            transport,
            connection,
            host: config.host.trim_end_matches('/').to_owned(),
            key: config.key,
            options: config.options,
        })
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        match self.transport {
            Transport::Blocking(_) => Mode::Blocking,
            Transport::Suspending(_) => Mode::Suspending,
        }
    }

    /// Name of the bound backend.
    #[must_use]
    pub fn backend(&self) -> &str {
        self.transport.name()
    }

    /// The reusable connection, if the backend created one.
    #[must_use]
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Release the reusable connection. Without one this does nothing, so calling it twice is
    /// harmless.
    pub async fn destroy(&mut self) -> Result<()> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(backend = self.transport.name(), "releasing connection");

        match &self.transport {
            Transport::Suspending(t) => t.destroy_connection(connection).await,
            Transport::Blocking(_) => Ok(()),
        }
    }

    /// Alternative data: sentiment, news, economic events, macro indicators.
    #[must_use]
    pub fn alternative(&self) -> Alternative<'_> {
        Alternative::new(self)
    }

    /// Exchanges: tickers, details, bulk end-of-day, screener, search.
    #[must_use]
    pub fn exchange(&self) -> Exchange<'_> {
        Exchange::new(self)
    }

    /// Fundamentals: companies, crypto, bonds, calendars, insider transactions.
    #[must_use]
    pub fn fundamental(&self) -> Fundamental<'_> {
        Fundamental::new(self)
    }

    /// Market data: end-of-day, delayed, intraday, dividends, splits, indicators, options.
    #[must_use]
    pub fn market(&self) -> Market<'_> {
        Market::new(self)
    }

    /// Prepare a call to the path made of `segments` with the parameters of `record`.
    ///
    /// Segments are percent-encoded, so a ticker or search term can never alter the query.
    pub(crate) fn call<T: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        record: &T,
        exclude: &[&str],
    ) -> Result<Call<'_>> {
        let mut target = Url::parse(&self.host)?;
        target
            .path_segments_mut()
            .map_err(|()| Error::validation(format!("host '{}' cannot carry a path", self.host)))?
            .pop_if_empty()
            .extend(segments);
        let query = prepare(&self.key, record, exclude)?;

        Ok(Call {
            client: self,
            target,
            query,
            options: RequestOptions::default(),
            output: OutputSpec::default(),
            writer: WriterOptions::default(),
        })
    }
}

/// One prepared request, not yet sent.
///
/// Output defaults to `decoded`. Use [`Call::send`] on suspending clients and
/// [`Call::send_blocking`] on blocking ones.
#[must_use = "a call does nothing until it is sent"]
#[derive(Debug)]
pub struct Call<'client> {
    client: &'client Client,
    target: Url,
    query: Query,
    options: RequestOptions,
    output: OutputSpec,
    writer: WriterOptions,
}

impl Call<'_> {
    /// Per-call request options, layered over the client defaults.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Output shape and optional persistence path.
    pub fn output(mut self, output: OutputSpec) -> Self {
        self.output = output;
        self
    }

    /// Tabular directives and serializer options.
    pub fn writer(mut self, writer: WriterOptions) -> Self {
        self.writer = writer;
        self
    }

    #[must_use]
    pub fn target(&self) -> &Url {
        &self.target
    }

    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Send through a suspending backend and normalize the response.
    ///
    /// # Errors
    ///
    /// [`Kind::Validation`](crate::error::Kind::Validation) on a blocking client, otherwise any
    /// transport or normalization fault.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self),
            fields(path = self.target.path(), output = %self.output, content_type)
        )
    )]
    pub async fn send(self) -> Result<Output> {
        let Transport::Suspending(transport) = &self.client.transport else {
            return Err(Error::validation(format!(
                "backend '{}' is blocking, use send_blocking",
                self.client.backend()
            )));
        };

        let options = self.client.options.merge(&self.options);
        let response = transport
            .request(
                self.client.connection.as_ref(),
                &self.target,
                &self.query,
                &options,
            )
            .await;

        finish(response, &self.output, &self.writer)
    }

    /// Send through a blocking backend and normalize the response.
    ///
    /// # Errors
    ///
    /// [`Kind::Validation`](crate::error::Kind::Validation) on a suspending client, otherwise any
    /// transport or normalization fault.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self),
            fields(path = self.target.path(), output = %self.output, content_type)
        )
    )]
    pub fn send_blocking(self) -> Result<Output> {
        let Transport::Blocking(transport) = &self.client.transport else {
            return Err(Error::validation(format!(
                "backend '{}' suspends, use send",
                self.client.backend()
            )));
        };

        let options = self.client.options.merge(&self.options);
        let response = transport.request(&self.target, &self.query, &options);

        finish(response, &self.output, &self.writer)
    }
}

fn finish(
    response: Result<crate::transport::TransportResponse>,
    output: &OutputSpec,
    writer: &WriterOptions,
) -> Result<Output> {
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %e, "request failed");
            return Err(e);
        }
    };

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("content_type", response.content_type());

    process(response, output, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    #[test]
    fn config_should_default_to_demo_key() {
        use secrecy::ExposeSecret as _;

        let config = Config::default();
        assert_eq!(config.key.expose_secret(), DEMO_KEY);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.options, RequestOptions::default());
    }

    #[test]
    fn unknown_backend_should_fail() {
        let err = Client::new("httpx", Config::default()).unwrap_err();
        assert_eq!(err.kind(), Kind::UnknownClient);
    }

    #[test]
    fn suspending_backend_should_create_connection() {
        let client = Client::new("reqwest", Config::default()).unwrap();
        assert_eq!(client.mode(), Mode::Suspending);
        assert!(client.connection().is_some());
    }

    #[test]
    fn call_should_join_host_and_path() {
        let config = Config::builder().host("http://localhost:8080/api/").key("k").build();
        let client = Client::new("reqwest", config).unwrap();

        let call = client.call(&["eod", "MCD.US"], &(), &[]).unwrap();

        assert_eq!(call.target().as_str(), "http://localhost:8080/api/eod/MCD.US");
        assert_eq!(call.query().get("api_token"), Some("k"));
    }

    #[test]
    fn call_should_encode_path_segments() {
        let config = Config::builder().host("http://localhost:8080/api").key("k").build();
        let client = Client::new("reqwest", config).unwrap();

        let call = client.call(&["search", "AT&T?x=1#frag/a"], &(), &[]).unwrap();

        assert_eq!(call.target().path(), "/api/search/AT&T%3Fx=1%23frag%2Fa");
        assert!(call.target().query().is_none());
        assert!(call.target().fragment().is_none());

        let call = client.call(&["exchanges-list", ""], &(), &[]).unwrap();
        assert_eq!(call.target().as_str(), "http://localhost:8080/api/exchanges-list/");
    }

    #[tokio::test]
    async fn destroy_should_be_idempotent() {
        let mut client = Client::new("reqwest", Config::default()).unwrap();

        client.destroy().await.unwrap();
        assert!(client.connection().is_none());
        client.destroy().await.unwrap();
    }

    #[cfg(feature = "blocking")]
    #[tokio::test]
    async fn send_on_blocking_client_should_fail() {
        let client = Client::new("reqwest-blocking", Config::default()).unwrap();
        assert_eq!(client.mode(), Mode::Blocking);

        let err = client.call(&["eod", "MCD.US"], &(), &[]).unwrap().send().await.unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn send_blocking_on_suspending_client_should_fail() {
        let client = Client::new("reqwest", Config::default()).unwrap();

        let err = client.call(&["eod", "MCD.US"], &(), &[]).unwrap().send_blocking().unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }
}
