//! Live exchange rate feed abstraction.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::CurrencyError;

/// A source of current exchange rates outside the company's own snapshots.
///
/// Implementations return [`CurrencyError::UpstreamUnavailable`] on any
/// transport or decoding failure.
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Fetches the rate for 1 `from` in `to` as of `date`.
    async fn fetch_rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<Decimal, CurrencyError>;
}
