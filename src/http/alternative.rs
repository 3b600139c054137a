use super::client::{Call, Client};
use super::types::request::{
    EconomicEventsRequest, EodRequest, MacroIndicatorRequest, NewsRequest, SentimentRequest,
};
use crate::Result;

/// Alternative data endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Alternative<'client> {
    client: &'client Client,
}

impl<'client> Alternative<'client> {
    pub(crate) fn new(client: &'client Client) -> Self {
        Self { client }
    }

    /// Daily sentiment scores from news or tweets.
    pub fn sentiment(&self, request: &SentimentRequest) -> Result<Call<'client>> {
        self.client.call(&[request.source.path()], request, &[])
    }

    /// Economic events calendar.
    pub fn events(&self, request: &EconomicEventsRequest) -> Result<Call<'client>> {
        self.client.call(&["economic-events"], request, &[])
    }

    /// Financial news, by ticker (`s`) or topic tag (`t`).
    pub fn news(&self, request: &NewsRequest) -> Result<Call<'client>> {
        self.client.call(&["news"], request, &[])
    }

    /// Macro indicators of one country.
    pub fn macro_indicators(&self, request: &MacroIndicatorRequest) -> Result<Call<'client>> {
        self.client
            .call(&["macro-indicator", request.country.as_str()], request, &[])
    }

    /// Macroeconomic series such as government bond yields, e.g. `UK10Y.GBOND`.
    pub fn macroeconomic(&self, request: &EodRequest) -> Result<Call<'client>> {
        self.client
            .call(&["eod", request.ticker.as_str()], request, &[])
    }
}
