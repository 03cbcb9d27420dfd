//! Allocation error types.

use ledgerwise_shared::types::{AllocationId, DocumentId, PaymentId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{DocumentKind, PaymentKind};
use crate::store::StoreError;

/// Errors raised by the allocation ledger.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Amount must be positive.
    #[error("Allocation amount must be positive")]
    InvalidAmount,

    /// Receipts settle invoices and payments settle bills.
    #[error("A {payment_kind} cannot settle a {document_kind}")]
    KindMismatch {
        /// Movement kind.
        payment_kind: PaymentKind,
        /// Document kind.
        document_kind: DocumentKind,
    },

    /// Payment or receipt not found.
    #[error("{0} not found: {1}")]
    PaymentNotFound(PaymentKind, PaymentId),

    /// Invoice or bill not found.
    #[error("{0} not found: {1}")]
    DocumentNotFound(DocumentKind, DocumentId),

    /// Allocation not found.
    #[error("Allocation not found: {0}")]
    AllocationNotFound(AllocationId),

    /// Void documents cannot be settled.
    #[error("Document {0} is void")]
    DocumentVoid(DocumentId),

    /// Either the movement is fully allocated or the document fully paid.
    #[error("Nothing left to allocate")]
    NothingToAllocate,

    /// Requested more than `min(unallocated, outstanding)`.
    #[error("Allocation of {requested} exceeds the available {available}")]
    ExceedsOutstanding {
        /// Requested amount.
        requested: Decimal,
        /// Largest amount that could be allocated.
        available: Decimal,
    },

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AllocationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::KindMismatch { .. } => "KIND_MISMATCH",
            Self::PaymentNotFound(..) | Self::DocumentNotFound(..) | Self::AllocationNotFound(_) => "NOT_FOUND",
            Self::DocumentVoid(_) => "DOCUMENT_VOID",
            Self::NothingToAllocate => "NOTHING_TO_ALLOCATE",
            Self::ExceedsOutstanding { .. } => "EXCEEDS_OUTSTANDING",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount
            | Self::KindMismatch { .. }
            | Self::DocumentVoid(_)
            | Self::NothingToAllocate
            | Self::ExceedsOutstanding { .. } => 400,
            Self::PaymentNotFound(..) | Self::DocumentNotFound(..) | Self::AllocationNotFound(_) => 404,
            Self::Store(e) => e.http_status_code(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_retryable())
    }
}

into_app_error!(AllocationError);
