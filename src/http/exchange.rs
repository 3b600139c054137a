use super::client::{Call, Client};
use super::types::request::{
    BulkEodRequest, ExchangeDetailsRequest, ScreenerRequest, SearchRequest,
    SymbolChangeHistoryRequest, TickersRequest,
};
use crate::Result;

/// Exchange and ticker discovery endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'client> {
    client: &'client Client,
}

impl<'client> Exchange<'client> {
    pub(crate) fn new(client: &'client Client) -> Self {
        Self { client }
    }

    /// Last day (or `date`) end-of-day, splits or dividends of a whole exchange.
    pub fn bulk(&self, request: &BulkEodRequest) -> Result<Call<'client>> {
        self.client
            .call(&["eod-bulk-last-day", request.exchange.as_str()], request, &[])
    }

    /// Every supported exchange.
    pub fn exchanges(&self) -> Result<Call<'client>> {
        self.client.call(&["exchanges-list", ""], &(), &[])
    }

    /// Tickers listed on an exchange.
    pub fn tickers(&self, request: &TickersRequest) -> Result<Call<'client>> {
        self.client
            .call(&["exchange-symbol-list", request.exchange.as_str()], request, &[])
    }

    /// Trading hours and holidays of an exchange.
    pub fn details(&self, request: &ExchangeDetailsRequest) -> Result<Call<'client>> {
        self.client
            .call(&["exchange-details", request.exchange.as_str()], request, &[])
    }

    /// Ticker renames.
    pub fn history(&self, request: &SymbolChangeHistoryRequest) -> Result<Call<'client>> {
        self.client.call(&["symbol-change-history"], request, &[])
    }

    /// Stock screener.
    pub fn screener(&self, request: &ScreenerRequest) -> Result<Call<'client>> {
        self.client.call(&["screener"], request, &[])
    }

    /// Search stocks, ETFs, funds, indices and bonds.
    pub fn search(&self, request: &SearchRequest) -> Result<Call<'client>> {
        self.client
            .call(&["search", request.query.as_str()], request, &[])
    }
}
