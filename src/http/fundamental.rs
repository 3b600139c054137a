use super::client::{Call, Client};
use super::types::request::{
    BondRequest, BulkFundamentalsRequest, CalendarRequest, FundamentalsRequest, InsiderRequest,
    RangeRequest, TickerRequest,
};
use crate::Result;

/// Fundamental and economic data endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Fundamental<'client> {
    client: &'client Client,
}

impl<'client> Fundamental<'client> {
    pub(crate) fn new(client: &'client Client) -> Self {
        Self { client }
    }

    /// Fundamentals of a crypto currency, e.g. `BTC-USD.CC`.
    pub fn crypto(&self, request: &TickerRequest) -> Result<Call<'client>> {
        self.client
            .call(&["fundamentals", request.ticker.as_str()], request, &[])
    }

    /// Fundamentals of a stock, ETF, fund or index.
    pub fn fundamentals(&self, request: &FundamentalsRequest) -> Result<Call<'client>> {
        self.client
            .call(&["fundamentals", request.ticker.as_str()], request, &[])
    }

    /// Historical market capitalization.
    pub fn capitalization(&self, request: &RangeRequest) -> Result<Call<'client>> {
        self.client
            .call(&["historical-market-cap", request.ticker.as_str()], request, &[])
    }

    /// Insider transactions, optionally of one ticker.
    pub fn insider(&self, request: &InsiderRequest) -> Result<Call<'client>> {
        self.client.call(&["insider-transactions"], request, &[])
    }

    /// Fundamentals of every ticker on an exchange.
    pub fn bulk(&self, request: &BulkFundamentalsRequest) -> Result<Call<'client>> {
        self.client
            .call(&["bulk-fundamentals", request.exchange.as_str()], request, &[])
    }

    /// Earnings, trends, IPO or splits calendar. Fields the calendar type does not accept are
    /// left out of the query.
    pub fn calendar(&self, request: &CalendarRequest) -> Result<Call<'client>> {
        self.client.call(
            &["calendar", &request.kind.to_string()],
            request,
            request.kind.excluded(),
        )
    }

    /// Bond fundamentals. Bond prices come from `market().historical` with `{code}.BOND`.
    pub fn bonds(&self, request: &BondRequest) -> Result<Call<'client>> {
        self.client
            .call(&["bond-fundamentals", request.code.as_str()], request, &[])
    }
}
