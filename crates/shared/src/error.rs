//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Component errors in `ledgerwise-core` convert into this taxonomy before
/// they reach the HTTP layer. The `code` field carries the component's stable
/// error code (`UNBALANCED`, `EXCEEDS_OUTSTANDING`, ...).
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected by a business rule.
    #[error("Validation error: {message}")]
    Validation {
        /// Stable error code.
        code: &'static str,
        /// Human readable detail.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// State conflict (already posted, already reversed, already matched).
    #[error("Conflict: {message}")]
    Conflict {
        /// Stable error code.
        code: &'static str,
        /// Human readable detail.
        message: String,
    },

    /// Required company configuration is missing.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Stable error code.
        code: &'static str,
        /// Human readable detail.
        message: String,
    },

    /// An upstream service (live rate feed) could not be reached.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a validation error.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a conflict error.
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    /// Builds an error from a component's HTTP status and stable code.
    pub fn from_status(status: u16, code: &'static str, message: String) -> Self {
        match status {
            400 => Self::Validation { code, message },
            404 => Self::NotFound(message),
            409 => Self::Conflict { code, message },
            422 => Self::Configuration { code, message },
            503 => Self::UpstreamUnavailable(message),
            _ => Self::Database(message),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Conflict { .. } => 409,
            Self::Configuration { .. } => 422,
            Self::UpstreamUnavailable(_) => 503,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. }
            | Self::Conflict { code, .. }
            | Self::Configuration { code, .. } => code,
            Self::NotFound(_) => "NOT_FOUND",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::validation("UNBALANCED", "").status_code(), 400);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::conflict("ALREADY_POSTED", "").status_code(), 409);
        assert_eq!(
            AppError::Configuration {
                code: "MISSING_ACCOUNT",
                message: String::new()
            }
            .status_code(),
            422
        );
        assert_eq!(
            AppError::UpstreamUnavailable(String::new()).status_code(),
            503
        );
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::validation("EXCEEDS_OUTSTANDING", "").error_code(),
            "EXCEEDS_OUTSTANDING"
        );
        assert_eq!(
            AppError::conflict("ALREADY_REVERSED", "").error_code(),
            "ALREADY_REVERSED"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::UpstreamUnavailable(String::new()).error_code(),
            "UPSTREAM_UNAVAILABLE"
        );
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[rstest]
    #[case(400, "EXCEEDS_OUTSTANDING")]
    #[case(409, "ALREADY_REVERSED")]
    #[case(422, "MISSING_ACCOUNT")]
    #[case(404, "NOT_FOUND")]
    #[case(503, "UPSTREAM_UNAVAILABLE")]
    #[case(500, "DATABASE_ERROR")]
    fn test_from_status_keeps_code(#[case] status: u16, #[case] code: &'static str) {
        let err = AppError::from_status(status, code, "detail".into());
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::validation("UNBALANCED", "debits 10 != credits 9").to_string(),
            "Validation error: debits 10 != credits 9"
        );
        assert_eq!(
            AppError::NotFound("journal".into()).to_string(),
            "Not found: journal"
        );
        assert_eq!(
            AppError::conflict("ALREADY_POSTED", "voucher").to_string(),
            "Conflict: voucher"
        );
        assert_eq!(
            AppError::UpstreamUnavailable("timeout".into()).to_string(),
            "Upstream unavailable: timeout"
        );
    }
}
