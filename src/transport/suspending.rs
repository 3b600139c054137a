use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method};
use url::Url;

use super::{
    Connection, Query, REQWEST, RequestOptions, SuspendingTransport, TransportResponse,
    content_type, translate,
};
use crate::Result;
use crate::error::Error;

const USER_AGENT: &str = concat!("eodhd-client-sdk/", env!("CARGO_PKG_VERSION"));

/// Suspending backend over [`reqwest::Client`].
///
/// The client doubles as the reusable [`Connection`]: the dispatcher creates one pool up front and
/// every call made through it shares the pool. Without a connection each request builds its own
/// client.
#[non_exhaustive]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport;

fn build_client() -> Result<ReqwestClient> {
    ReqwestClient::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(translate)
}

#[async_trait]
impl SuspendingTransport for ReqwestTransport {
    fn name(&self) -> &str {
        REQWEST
    }

    async fn request(
        &self,
        connection: Option<&Connection>,
        target: &Url,
        query: &Query,
        options: &RequestOptions,
    ) -> Result<TransportResponse> {
        let standalone;
        let client = match connection.and_then(Connection::downcast_ref::<ReqwestClient>) {
            Some(client) => client,
            None => {
                standalone = build_client()?;
                &standalone
            }
        };

        let mut request = client.get(target.clone()).query(query.pairs());
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(translate)?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::status(
                status,
                Method::GET,
                target.path().to_owned(),
                message,
            ));
        }

        let content_type = content_type(response.headers());
        let body = response.bytes().await.map_err(translate)?;

        Ok(TransportResponse::new(content_type, body.to_vec()))
    }

    fn create_connection(&self) -> Option<Result<Connection>> {
        Some(build_client().map(Connection::new))
    }

    async fn destroy_connection(&self, connection: Connection) -> Result<()> {
        // Dropping the last handle closes the idle sockets of the pool.
        drop(connection);
        Ok(())
    }
}
