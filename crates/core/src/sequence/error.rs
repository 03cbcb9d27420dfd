//! Sequencer errors.

use ledgerwise_shared::types::CompanyId;
use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while issuing document numbers.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// No settings exist for the company.
    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    /// A custom prefix was empty or contained whitespace.
    #[error("Invalid document prefix: {0:?}")]
    InvalidPrefix(String),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SequenceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CompanyNotFound(_) => "NOT_FOUND",
            Self::InvalidPrefix(_) => "INVALID_PREFIX",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::CompanyNotFound(_) => 404,
            Self::InvalidPrefix(_) => 400,
            Self::Store(e) => e.http_status_code(),
        }
    }
}

into_app_error!(SequenceError);
