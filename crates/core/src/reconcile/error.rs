//! Matching error types.

use ledgerwise_shared::types::{BankLineId, PaymentId};
use thiserror::Error;

use crate::allocation::{AllocationError, PaymentKind};
use crate::store::StoreError;

/// Errors raised by the reconciliation matcher.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Bank line not found.
    #[error("Bank line not found: {0}")]
    BankLineNotFound(BankLineId),

    /// Receipt or payment not found.
    #[error("{0} not found: {1}")]
    PaymentNotFound(PaymentKind, PaymentId),

    /// Zero-amount lines cannot be matched.
    #[error("Bank line {0} has a zero amount")]
    ZeroAmountLine(BankLineId),

    /// The line is already matched.
    #[error("Bank line {0} is already matched")]
    LineAlreadyMatched(BankLineId),

    /// The movement is already reconciled.
    #[error("{0} {1} is already reconciled")]
    AlreadyReconciled(PaymentKind, PaymentId),

    /// The movement went through a different bank account.
    #[error("{0} {1} belongs to a different bank account")]
    BankAccountMismatch(PaymentKind, PaymentId),

    /// Allocation failure while planning.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MatchError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BankLineNotFound(_) | Self::PaymentNotFound(..) => "NOT_FOUND",
            Self::ZeroAmountLine(_) => "INVALID_AMOUNT",
            Self::LineAlreadyMatched(_) => "ALREADY_MATCHED",
            Self::AlreadyReconciled(..) => "ALREADY_RECONCILED",
            Self::BankAccountMismatch(..) => "BANK_ACCOUNT_MISMATCH",
            Self::Allocation(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BankLineNotFound(_) | Self::PaymentNotFound(..) => 404,
            Self::ZeroAmountLine(_) | Self::BankAccountMismatch(..) => 400,
            Self::LineAlreadyMatched(_) | Self::AlreadyReconciled(..) => 409,
            Self::Allocation(e) => e.http_status_code(),
            Self::Store(e) => e.http_status_code(),
        }
    }
}

into_app_error!(MatchError);
