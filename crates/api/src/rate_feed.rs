//! HTTP client for a live exchange rate feed.
//!
//! The feed is queried as `GET {base_url}/{date}?from=EUR&to=USD` and answers
//! `{"base": "EUR", "date": "2025-01-15", "rates": {"USD": 1.0348}}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerwise_core::currency::{CurrencyError, RateFeed};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct FeedResponse {
    rates: HashMap<String, Decimal>,
}

/// [`RateFeed`] backed by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpRateFeed {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateFeed {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn rate_from(body: FeedResponse, to: &str) -> Result<Decimal, CurrencyError> {
        match body.rates.get(to) {
            Some(rate) if *rate > Decimal::ZERO => Ok(*rate),
            Some(rate) => Err(CurrencyError::UpstreamUnavailable(format!("feed returned rate {rate} for {to}"))),
            None => Err(CurrencyError::UpstreamUnavailable(format!("feed has no rate for {to}"))),
        }
    }
}

#[async_trait]
impl RateFeed for HttpRateFeed {
    async fn fetch_rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<Decimal, CurrencyError> {
        let url = format!("{}/{date}", self.base_url);
        let unavailable = |e: reqwest::Error| CurrencyError::UpstreamUnavailable(e.to_string());

        let body: FeedResponse = self
            .client
            .get(&url)
            .query(&[("from", from), ("to", to)])
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        let rate = Self::rate_from(body, to)?;
        debug!(from = %from, to = %to, date = %date, rate = %rate, "Fetched live rate");
        Ok(rate)
    }
}
