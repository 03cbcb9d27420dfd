//! Per-company accounting settings.

use chrono::{Datelike, NaiveDate};
use ledgerwise_shared::types::{AccountId, CompanyId};
use serde::{Deserialize, Serialize};

/// Default chart-of-accounts mapping used by business postings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultAccounts {
    /// Accounts receivable.
    pub receivable: Option<AccountId>,
    /// Accounts payable.
    pub payable: Option<AccountId>,
    /// Sales revenue.
    pub revenue: Option<AccountId>,
    /// Operating expense.
    pub expense: Option<AccountId>,
    /// Cash / bank.
    pub cash: Option<AccountId>,
    /// Recoverable tax on purchases.
    pub input_tax: Option<AccountId>,
    /// Tax payable on sales.
    pub output_tax: Option<AccountId>,
}

/// Company settings consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySettings {
    /// Company identifier.
    pub company_id: CompanyId,
    /// Reporting currency (ISO 4217).
    pub base_currency: String,
    /// Month (1-12) the fiscal year starts in.
    pub fiscal_year_start_month: u32,
    /// Default account mapping.
    pub accounts: DefaultAccounts,
}

impl CompanySettings {
    /// Fiscal year a date falls in.
    ///
    /// A fiscal year is named after the calendar year it starts in, so with a
    /// July start 2025-03-10 belongs to fiscal year 2024.
    #[must_use]
    pub fn fiscal_year(&self, date: NaiveDate) -> i32 {
        fiscal_year_for(date, self.fiscal_year_start_month)
    }
}

/// Fiscal year for `date` given a start month. Out-of-range months behave as January.
#[must_use]
pub fn fiscal_year_for(date: NaiveDate, start_month: u32) -> i32 {
    let start_month = if (1..=12).contains(&start_month) {
        start_month
    } else {
        1
    };
    if date.month() < start_month {
        date.year() - 1
    } else {
        date.year()
    }
}
