//! Multi-currency handling and exchange rates.

pub mod allocation;
pub mod error;
pub mod feed;
pub mod service;
pub mod types;

#[cfg(test)]
mod props;

pub use allocation::AllocationUtil;
pub use error::CurrencyError;
pub use feed::RateFeed;
pub use service::CurrencyService;
pub use types::{ExchangeRate, RateMethod, RateQuote};
