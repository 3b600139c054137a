use reqwest::Method;
use reqwest::blocking::Client as BlockingClient;
use url::Url;

use super::{
    BlockingTransport, Query, REQWEST_BLOCKING, RequestOptions, TransportResponse, content_type,
    translate,
};
use crate::Result;
use crate::error::Error;

const USER_AGENT: &str = concat!("eodhd-client-sdk/", env!("CARGO_PKG_VERSION"));

/// Blocking backend over [`reqwest::blocking`].
///
/// Every request opens a standalone connection. Must not be driven from inside an async runtime.
#[non_exhaustive]
#[derive(Clone, Debug, Default)]
pub struct ReqwestBlockingTransport;

impl BlockingTransport for ReqwestBlockingTransport {
    fn name(&self) -> &str {
        REQWEST_BLOCKING
    }

    fn request(
        &self,
        target: &Url,
        query: &Query,
        options: &RequestOptions,
    ) -> Result<TransportResponse> {
        let client = BlockingClient::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(translate)?;

        let mut request = client.get(target.clone()).query(query.pairs());
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }

        let response = request.send().map_err(translate)?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(Error::status(
                status,
                Method::GET,
                target.path().to_owned(),
                message,
            ));
        }

        let content_type = content_type(response.headers());
        let body = response.bytes().map_err(translate)?;

        Ok(TransportResponse::new(content_type, body.to_vec()))
    }
}
