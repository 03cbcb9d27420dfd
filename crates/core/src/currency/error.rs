//! Currency errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised by rate maintenance and live rate fetches.
///
/// Rate lookups themselves never fail on a missing rate; they fall back.
#[derive(Debug, Error)]
pub enum CurrencyError {
    /// Exchange rate must be positive.
    #[error("Exchange rate must be positive")]
    InvalidExchangeRate,

    /// Source and target currencies must be different.
    #[error("Source and target currencies must be different")]
    SameCurrencyExchange,

    /// Currency code is not three ASCII letters.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    /// The live rate feed could not be reached or returned garbage.
    #[error("Rate feed unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CurrencyError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidExchangeRate => "INVALID_EXCHANGE_RATE",
            Self::SameCurrencyExchange => "SAME_CURRENCY_EXCHANGE",
            Self::InvalidCurrencyCode(_) => "INVALID_CURRENCY",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidExchangeRate | Self::SameCurrencyExchange | Self::InvalidCurrencyCode(_) => {
                400
            }
            Self::UpstreamUnavailable(_) => 503,
            Self::Store(e) => e.http_status_code(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UpstreamUnavailable(_) => true,
            Self::Store(e) => e.is_retryable(),
            _ => false,
        }
    }
}

into_app_error!(CurrencyError);
