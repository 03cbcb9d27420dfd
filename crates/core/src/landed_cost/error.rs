//! Landed cost error types.

use ledgerwise_shared::types::{DocumentId, StockMovementId, VoucherId};
use thiserror::Error;

use crate::journal::JournalError;
use crate::store::StoreError;

/// Errors raised by the landed cost allocator.
#[derive(Debug, Error)]
pub enum LandedCostError {
    /// Voucher not found.
    #[error("Landed cost voucher not found: {0}")]
    VoucherNotFound(VoucherId),

    /// Posting is one-way.
    #[error("Landed cost voucher {0} is already posted")]
    AlreadyPosted(VoucherId),

    /// The voucher carries no cost to distribute.
    #[error("Landed cost voucher {0} has no bill amounts to allocate")]
    NoCosts(VoucherId),

    /// No item has a stock movement to receive cost.
    #[error("Landed cost voucher {0} has no stock items")]
    NoItems(VoucherId),

    /// Σ quantity or Σ original cost is zero.
    #[error("Allocation base is zero")]
    ZeroBase,

    /// Stock movement without an inventory account.
    #[error("Stock movement {0} has no inventory account")]
    MissingInventoryAccount(StockMovementId),

    /// A cost bill has no expense account to credit.
    #[error("Landed cost bill {0} has no expense account to credit")]
    MissingExpenseAccount(DocumentId),

    /// Journal posting failed.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LandedCostError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::VoucherNotFound(_) => "NOT_FOUND",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::NoCosts(_) => "NO_COSTS",
            Self::NoItems(_) => "NO_ITEMS",
            Self::ZeroBase => "ZERO_ALLOCATION_BASE",
            Self::MissingInventoryAccount(_) | Self::MissingExpenseAccount(_) => "MISSING_ACCOUNT",
            Self::Journal(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::VoucherNotFound(_) => 404,
            Self::AlreadyPosted(_) => 409,
            Self::NoCosts(_) | Self::NoItems(_) | Self::ZeroBase => 400,
            Self::MissingInventoryAccount(_) | Self::MissingExpenseAccount(_) => 422,
            Self::Journal(e) => e.http_status_code(),
            Self::Store(e) => e.http_status_code(),
        }
    }
}

into_app_error!(LandedCostError);
