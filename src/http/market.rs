use serde::Serialize;

use super::client::{Call, Client};
use super::types::request::{
    CorporateActionRequest, DelayedRequest, EodRequest, IndicatorRequest, IntradayRequest,
    OptionsRequest,
};
use crate::Result;
use crate::error::Error;

/// Price, corporate action and derivatives endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Market<'client> {
    client: &'client Client,
}

/// Delayed request with every ticker after the first carried as `s`.
#[derive(Serialize)]
struct Delayed<'request> {
    s: &'request [String],
    #[serde(flatten)]
    request: &'request DelayedRequest,
}

impl<'client> Market<'client> {
    pub(crate) fn new(client: &'client Client) -> Self {
        Self { client }
    }

    /// End-of-day bars.
    pub fn historical(&self, request: &EodRequest) -> Result<Call<'client>> {
        self.client
            .call(&["eod", request.ticker.as_str()], request, &[])
    }

    /// Delayed live quotes of one or more tickers.
    pub fn delayed(&self, request: &DelayedRequest) -> Result<Call<'client>> {
        let Some((first, rest)) = request.tickers.split_first() else {
            return Err(Error::validation("delayed quotes need at least one ticker"));
        };

        self.client.call(
            &["real-time", first.as_str()],
            &Delayed { s: rest, request },
            &[],
        )
    }

    pub fn dividends(&self, request: &CorporateActionRequest) -> Result<Call<'client>> {
        self.client
            .call(&["div", request.ticker.as_str()], request, &[])
    }

    pub fn splits(&self, request: &CorporateActionRequest) -> Result<Call<'client>> {
        self.client
            .call(&["splits", request.ticker.as_str()], request, &[])
    }

    /// Technical indicator series. `params` entries are sent as their own query parameters.
    pub fn indicators(&self, request: &IndicatorRequest) -> Result<Call<'client>> {
        self.client
            .call(&["technical", request.ticker.as_str()], request, &[])
    }

    /// Intraday bars.
    pub fn intraday(&self, request: &IntradayRequest) -> Result<Call<'client>> {
        self.client
            .call(&["intraday", request.ticker.as_str()], request, &[])
    }

    /// Option chains.
    pub fn options(&self, request: &OptionsRequest) -> Result<Call<'client>> {
        self.client
            .call(&["options", request.ticker.as_str()], request, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Config;

    #[test]
    fn delayed_should_carry_remaining_tickers() {
        let client = Client::new("reqwest", Config::default()).unwrap();
        let request = DelayedRequest::builder()
            .tickers(vec!["MCD.US".to_owned(), "AAPL.US".to_owned(), "KO.US".to_owned()])
            .build();

        let call = client.market().delayed(&request).unwrap();

        assert!(call.target().path().ends_with("/real-time/MCD.US"));
        assert_eq!(call.query().get_all("s").collect::<Vec<_>>(), ["AAPL.US", "KO.US"]);
        assert_eq!(call.query().get("fmt"), Some("csv"));
    }

    #[test]
    fn delayed_without_tickers_should_fail() {
        let client = Client::new("reqwest", Config::default()).unwrap();
        let request = DelayedRequest::builder().tickers(Vec::new()).build();

        let err = client.market().delayed(&request).unwrap_err();
        assert_eq!(err.kind(), crate::error::Kind::Validation);
    }
}
