//! Currency service for conversion and exchange rate operations.
//!
//! This module provides the main service interface for currency operations,
//! including conversion with Banker's Rounding, rate lookup with inverse
//! fallback, and rate maintenance.

use chrono::NaiveDate;
use ledgerwise_shared::types::CompanyId;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use tracing::{debug, info, warn};

use super::error::CurrencyError;
use super::feed::RateFeed;
use super::types::{ExchangeRate, RateMethod, RateQuote};
use crate::store::ExchangeRateRepository;

/// Decimal places stored for derived inverse rates.
const INVERSE_RATE_DP: u32 = 10;

/// Currency service for conversion operations.
///
/// Provides methods for converting amounts between currencies using
/// Banker's Rounding (MidpointNearestEven) strategy.
pub struct CurrencyService;

impl CurrencyService {
    /// Convert amount using exchange rate with Banker's Rounding.
    ///
    /// Uses `RoundingStrategy::MidpointNearestEven` (Banker's Rounding) which:
    /// - Rounds 2.5 → 2 (to nearest even)
    /// - Rounds 3.5 → 4 (to nearest even)
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use ledgerwise_core::currency::CurrencyService;
    ///
    /// let result = CurrencyService::convert(dec!(100), dec!(1.5));
    /// assert_eq!(result, dec!(150.0000));
    /// ```
    #[must_use]
    pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
        (amount * rate).round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
    }

    /// Round a decimal value using Banker's Rounding.
    #[must_use]
    pub fn round(value: Decimal, decimal_places: u32) -> Decimal {
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
    }

    /// Normalizes and checks an ISO 4217 style code.
    pub fn normalize_code(code: &str) -> Result<String, CurrencyError> {
        let code = code.trim().to_ascii_uppercase();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(code)
        } else {
            Err(CurrencyError::InvalidCurrencyCode(code))
        }
    }

    /// Resolves the rate for `from` → `to` as of `as_of`.
    ///
    /// Lookup order: identity, latest direct snapshot on or before `as_of`,
    /// reciprocal of the latest inverse snapshot, then 1:1 with a warning.
    /// A missing rate never fails the call.
    pub async fn get_rate<R>(
        repo: &mut R,
        company_id: CompanyId,
        from: &str,
        to: &str,
        as_of: NaiveDate,
    ) -> Result<RateQuote, CurrencyError>
    where
        R: ExchangeRateRepository + Send + ?Sized,
    {
        let from = from.trim().to_ascii_uppercase();
        let to = to.trim().to_ascii_uppercase();

        if from == to {
            return Ok(RateQuote::identity(&from));
        }

        if let Some(direct) = repo.find_rate(company_id, &from, &to, as_of).await? {
            debug!(from = %from, to = %to, rate = %direct.rate, date = %direct.date, "Direct rate");
            return Ok(RateQuote {
                from_currency: from,
                to_currency: to,
                rate: direct.rate,
                method: RateMethod::Direct,
                effective_date: Some(direct.date),
            });
        }

        if let Some(inverse) = repo.find_rate(company_id, &to, &from, as_of).await? {
            if !inverse.rate.is_zero() {
                let rate = Self::round(Decimal::ONE / inverse.rate, INVERSE_RATE_DP);
                debug!(from = %from, to = %to, rate = %rate, date = %inverse.date, "Inverse rate");
                return Ok(RateQuote {
                    from_currency: from,
                    to_currency: to,
                    rate,
                    method: RateMethod::Inverse,
                    effective_date: Some(inverse.date),
                });
            }
        }

        warn!(
            company_id = %company_id,
            from = %from,
            to = %to,
            as_of = %as_of,
            "No exchange rate found, using 1:1"
        );
        Ok(RateQuote {
            from_currency: from,
            to_currency: to,
            rate: Decimal::ONE,
            method: RateMethod::Fallback,
            effective_date: None,
        })
    }

    /// Converts `amount` from one currency to another as of `as_of`.
    pub async fn convert_between<R>(
        repo: &mut R,
        company_id: CompanyId,
        amount: Decimal,
        from: &str,
        to: &str,
        as_of: NaiveDate,
    ) -> Result<Decimal, CurrencyError>
    where
        R: ExchangeRateRepository + Send + ?Sized,
    {
        let quote = Self::get_rate(repo, company_id, from, to, as_of).await?;
        Ok(Self::convert(amount, quote.rate))
    }

    /// Stores a rate snapshot, replacing any snapshot for the same key and date.
    pub async fn upsert_rate<R>(repo: &mut R, rate: ExchangeRate) -> Result<ExchangeRate, CurrencyError>
    where
        R: ExchangeRateRepository + Send + ?Sized,
    {
        if rate.rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidExchangeRate);
        }
        let from = Self::normalize_code(&rate.from_currency)?;
        let to = Self::normalize_code(&rate.to_currency)?;
        if from == to {
            return Err(CurrencyError::SameCurrencyExchange);
        }

        let rate = ExchangeRate {
            from_currency: from,
            to_currency: to,
            ..rate
        };
        repo.upsert_rate(&rate).await?;
        info!(
            company_id = %rate.company_id,
            from = %rate.from_currency,
            to = %rate.to_currency,
            rate = %rate.rate,
            date = %rate.date,
            "Exchange rate stored"
        );
        Ok(rate)
    }

    /// Lists stored snapshots, optionally filtered by pair.
    pub async fn list_rates<R>(
        repo: &mut R,
        company_id: CompanyId,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<ExchangeRate>, CurrencyError>
    where
        R: ExchangeRateRepository + Send + ?Sized,
    {
        let from = from.map(|c| c.trim().to_ascii_uppercase());
        let to = to.map(|c| c.trim().to_ascii_uppercase());
        Ok(repo.list_rates(company_id, from.as_deref(), to.as_deref()).await?)
    }

    /// Fetches a live rate and stores it.
    ///
    /// When the feed is unavailable the stored rate (or 1:1) is returned with a
    /// warning instead of an error.
    pub async fn refresh_rate<R, F>(
        repo: &mut R,
        feed: &F,
        company_id: CompanyId,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<RateQuote, CurrencyError>
    where
        R: ExchangeRateRepository + Send + ?Sized,
        F: RateFeed + ?Sized,
    {
        let from = Self::normalize_code(from)?;
        let to = Self::normalize_code(to)?;
        if from == to {
            return Ok(RateQuote::identity(&from));
        }

        match feed.fetch_rate(&from, &to, date).await {
            Ok(rate) => {
                let stored = Self::upsert_rate(
                    repo,
                    ExchangeRate {
                        company_id,
                        from_currency: from,
                        to_currency: to,
                        rate,
                        date,
                    },
                )
                .await?;
                Ok(RateQuote {
                    from_currency: stored.from_currency,
                    to_currency: stored.to_currency,
                    rate: stored.rate,
                    method: RateMethod::Direct,
                    effective_date: Some(stored.date),
                })
            }
            Err(CurrencyError::UpstreamUnavailable(reason)) => {
                warn!(from = %from, to = %to, reason = %reason, "Rate feed unavailable, using stored rate");
                Self::get_rate(repo, company_id, &from, &to, date).await
            }
            Err(e) => Err(e),
        }
    }
}
