//! Journal error types.

use ledgerwise_shared::types::{AccountId, CompanyId, JournalId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::currency::CurrencyError;
use crate::sequence::SequenceError;
use crate::store::StoreError;

/// Errors that can occur while creating or reversing journals.
#[derive(Debug, Error)]
pub enum JournalError {
    // ========== Validation Errors ==========
    /// Journal must have at least one line.
    #[error("Journal must have at least one line")]
    NoLines,

    /// A line carries a negative amount.
    #[error("Line {line} has a negative amount")]
    NegativeAmount {
        /// 1-based line number.
        line: usize,
    },

    /// Debits and credits differ by more than the tolerance.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debits.
        debit: Decimal,
        /// Total credits.
        credit: Decimal,
    },

    /// Exchange rate must be positive.
    #[error("Exchange rate must be positive")]
    InvalidFxRate,

    // ========== Lookup Errors ==========
    /// A line references an account the company does not have.
    #[error("Account not found: {0}")]
    MissingAccount(AccountId),

    /// Journal not found.
    #[error("Journal not found: {0}")]
    NotFound(JournalId),

    /// No settings exist for the company.
    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    // ========== State Errors ==========
    /// The journal already has a reversal.
    #[error("Journal {journal_id} was already reversed by {reversal_id}")]
    AlreadyReversed {
        /// Journal being reversed.
        journal_id: JournalId,
        /// Existing reversal.
        reversal_id: JournalId,
    },

    // ========== Collaborator Errors ==========
    /// Numbering failed.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Rate lookup failed.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl JournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINES",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::Unbalanced { .. } => "UNBALANCED",
            Self::InvalidFxRate => "INVALID_EXCHANGE_RATE",
            Self::MissingAccount(_) => "MISSING_ACCOUNT",
            Self::NotFound(_) | Self::CompanyNotFound(_) => "NOT_FOUND",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
            Self::Sequence(e) => e.error_code(),
            Self::Currency(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::NoLines | Self::NegativeAmount { .. } | Self::Unbalanced { .. } | Self::InvalidFxRate => 400,

            // 404 Not Found
            Self::NotFound(_) | Self::CompanyNotFound(_) => 404,

            // 409 Conflict
            Self::AlreadyReversed { .. } => 409,

            // 422 Unprocessable - chart of accounts is missing something
            Self::MissingAccount(_) => 422,

            Self::Sequence(e) => e.http_status_code(),
            Self::Currency(e) => e.http_status_code(),
            Self::Store(e) => e.http_status_code(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::Currency(e) => e.is_retryable(),
            _ => false,
        }
    }
}

into_app_error!(JournalError);
