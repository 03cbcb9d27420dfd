//! Document number issuing.

use chrono::NaiveDate;
use ledgerwise_shared::types::CompanyId;
use tracing::{debug, info};

use super::error::SequenceError;
use super::types::{DocumentSequence, DocumentType, IssuedNumber};
use crate::store::{CompanyRepository, SequenceRepository};

/// Width numbers are zero-padded to.
pub const NUMBER_WIDTH: usize = 5;

/// Issues per-company, per-fiscal-year document numbers.
pub struct DocumentSequencer;

impl DocumentSequencer {
    /// Formats a number as `{prefix}-{fiscal_year}-{number}`.
    ///
    /// ```
    /// use ledgerwise_core::sequence::DocumentSequencer;
    ///
    /// assert_eq!(DocumentSequencer::format("INV", 2025, 7), "INV-2025-00007");
    /// ```
    #[must_use]
    pub fn format(prefix: &str, fiscal_year: i32, number: i64) -> String {
        format!("{prefix}-{fiscal_year}-{number:0width$}", width = NUMBER_WIDTH)
    }

    /// Issues the next number for `document_type` as of `today`.
    ///
    /// The counter row is created on first use and seeded so that the first
    /// number issued is 1. The increment is a single atomic store operation, so
    /// concurrent callers never receive the same number. `custom_prefix` is
    /// only recorded when the counter row is created.
    pub async fn next<R>(
        repo: &mut R,
        company_id: CompanyId,
        document_type: DocumentType,
        today: NaiveDate,
        custom_prefix: Option<&str>,
    ) -> Result<IssuedNumber, SequenceError>
    where
        R: CompanyRepository + SequenceRepository + Send + ?Sized,
    {
        let prefix = match custom_prefix {
            Some(p) if p.is_empty() || p.chars().any(char::is_whitespace) => {
                return Err(SequenceError::InvalidPrefix(p.to_string()));
            }
            Some(p) => p,
            None => document_type.default_prefix(),
        };

        let settings = repo
            .company_settings(company_id)
            .await?
            .ok_or(SequenceError::CompanyNotFound(company_id))?;
        let fiscal_year = settings.fiscal_year(today);

        let (number, stored_prefix) = repo
            .next_sequence_number(company_id, document_type, fiscal_year, prefix)
            .await?;

        if number == 1 {
            info!(
                company_id = %company_id,
                document_type = %document_type,
                fiscal_year,
                prefix = %stored_prefix,
                "Seeded document sequence"
            );
        }
        debug!(company_id = %company_id, document_type = %document_type, number, "Issued document number");

        Ok(IssuedNumber {
            formatted: Self::format(&stored_prefix, fiscal_year, number),
            number,
            fiscal_year,
        })
    }

    /// Lists every counter the company has.
    pub async fn list<R>(
        repo: &mut R,
        company_id: CompanyId,
    ) -> Result<Vec<DocumentSequence>, SequenceError>
    where
        R: SequenceRepository + Send + ?Sized,
    {
        Ok(repo.list_sequences(company_id).await?)
    }
}
