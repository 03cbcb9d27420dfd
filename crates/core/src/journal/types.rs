//! Journal domain types.
//!
//! A journal is one balanced accounting event. Lines are never edited after
//! creation; corrections go through reversal.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerwise_shared::types::{AccountId, CompanyId, JournalId, JournalLineId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business event that produced a journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Hand-entered journal.
    Manual,
    /// Sales invoice posting.
    Invoice,
    /// Purchase bill posting.
    Bill,
    /// Customer receipt.
    Receipt,
    /// Vendor payment.
    Payment,
    /// Reversal of another journal.
    Reversal,
    /// Landed cost voucher.
    LandedCost,
}

string_enum!(SourceType {
    Manual => "manual",
    Invoice => "invoice",
    Bill => "bill",
    Receipt => "receipt",
    Payment => "payment",
    Reversal => "reversal",
    LandedCost => "landed_cost",
});

/// One requested account movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Account to move.
    pub account_id: AccountId,
    /// Debit amount, non-negative.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount, non-negative.
    #[serde(default)]
    pub credit: Decimal,
    /// Line description; defaults to the journal description.
    #[serde(default)]
    pub description: Option<String>,
}

impl JournalLineInput {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: Some(description.into()),
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: Some(description.into()),
        }
    }
}

/// Request to create a journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJournalInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Originating event.
    pub source_type: SourceType,
    /// Originating record, if any.
    pub source_id: Option<Uuid>,
    /// Journal description.
    pub description: String,
    /// Transaction currency; defaults to the company base currency.
    pub currency: Option<String>,
    /// Rate to the base currency; resolved from stored rates when omitted.
    pub fx_rate: Option<Decimal>,
    /// Lines, at least one.
    pub lines: Vec<JournalLineInput>,
    /// Acting user.
    pub created_by: Option<UserId>,
}

/// A persisted journal header with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Journal identifier.
    pub id: JournalId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Sequence-issued number, e.g. `JE-2025-00012`.
    pub number: String,
    /// Accounting date.
    pub date: NaiveDate,
    /// Originating event.
    pub source_type: SourceType,
    /// Originating record.
    pub source_id: Option<Uuid>,
    /// Description.
    pub description: String,
    /// Transaction currency.
    pub currency: String,
    /// Rate to the base currency.
    pub fx_rate: Decimal,
    /// Sum of line debits in transaction currency.
    pub total_amount: Decimal,
    /// Acting user.
    pub created_by: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Lines in line-number order.
    pub lines: Vec<JournalLine>,
}

/// A persisted journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Line identifier.
    pub id: JournalLineId,
    /// Parent journal.
    pub journal_id: JournalId,
    /// 1-based position.
    pub line_number: i32,
    /// Account moved.
    pub account_id: AccountId,
    /// Line description.
    pub description: String,
    /// Debit in transaction currency.
    pub debit: Decimal,
    /// Credit in transaction currency.
    pub credit: Decimal,
    /// Transaction currency.
    pub currency: String,
    /// Rate to the base currency.
    pub fx_rate: Decimal,
    /// `debit × fx_rate`.
    pub base_debit: Decimal,
    /// `credit × fx_rate`.
    pub base_credit: Decimal,
}

/// Result of a business posting that may be skipped for missing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PostingOutcome {
    /// A journal was written.
    Posted {
        /// The new journal.
        journal: Journal,
    },
    /// No journal was written; the business document stands without one.
    Skipped {
        /// Why posting was skipped.
        warning: String,
    },
}

impl PostingOutcome {
    /// The posted journal, if any.
    #[must_use]
    pub fn journal(&self) -> Option<&Journal> {
        match self {
            Self::Posted { journal } => Some(journal),
            Self::Skipped { .. } => None,
        }
    }
}
