//! Exchange rate types.

use chrono::NaiveDate;
use ledgerwise_shared::types::CompanyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A directional rate snapshot: 1 `from_currency` = `rate` `to_currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Owning company.
    pub company_id: CompanyId,
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Rate, always positive.
    pub rate: Decimal,
    /// Date the rate is effective from.
    pub date: NaiveDate,
}

/// How a quoted rate was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateMethod {
    /// Same currency.
    Identity,
    /// Stored snapshot in the requested direction.
    Direct,
    /// Reciprocal of a snapshot in the opposite direction.
    Inverse,
    /// Nothing found; 1:1 assumed.
    Fallback,
}

/// Result of a rate lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Resolved rate.
    pub rate: Decimal,
    /// Resolution method.
    pub method: RateMethod,
    /// Date of the snapshot used, if any.
    pub effective_date: Option<NaiveDate>,
}

impl RateQuote {
    pub(crate) fn identity(currency: &str) -> Self {
        Self {
            from_currency: currency.to_string(),
            to_currency: currency.to_string(),
            rate: Decimal::ONE,
            method: RateMethod::Identity,
            effective_date: None,
        }
    }
}
