//! Journal creation, lookup and reversal.

use chrono::{NaiveDate, Utc};
use ledgerwise_shared::types::{CompanyId, JournalId, JournalLineId, UserId};
use rust_decimal::Decimal;
use tracing::info;

use super::error::JournalError;
use super::types::{CreateJournalInput, Journal, JournalLine, JournalLineInput, SourceType};
use super::validation::validate_lines;
use crate::currency::CurrencyService;
use crate::sequence::{DocumentSequencer, DocumentType};
use crate::store::StoreTx;

/// Creates and reverses balanced journals.
pub struct JournalEngine;

impl JournalEngine {
    /// Validates and writes a journal with its lines.
    ///
    /// The number comes from the `journal` sequence of the fiscal year the
    /// journal date falls in. Base amounts are `amount × fx_rate` rounded to 4
    /// places; the rate is 1 for base-currency journals and is resolved from
    /// stored rates when a foreign-currency journal omits it.
    pub async fn create<T: StoreTx>(tx: &mut T, input: CreateJournalInput) -> Result<Journal, JournalError> {
        let totals = validate_lines(&input.lines)?;

        let settings = tx
            .company_settings(input.company_id)
            .await?
            .ok_or(JournalError::CompanyNotFound(input.company_id))?;

        for line in &input.lines {
            if !tx.account_exists(input.company_id, line.account_id).await? {
                return Err(JournalError::MissingAccount(line.account_id));
            }
        }

        let currency = input
            .currency
            .as_deref()
            .map_or_else(|| settings.base_currency.clone(), |c| c.trim().to_ascii_uppercase());
        let fx_rate = match input.fx_rate {
            Some(rate) if rate <= Decimal::ZERO => return Err(JournalError::InvalidFxRate),
            Some(rate) => rate,
            None if currency == settings.base_currency => Decimal::ONE,
            None => {
                CurrencyService::get_rate(tx, input.company_id, &currency, &settings.base_currency, input.date)
                    .await?
                    .rate
            }
        };

        let number = DocumentSequencer::next(tx, input.company_id, DocumentType::Journal, input.date, None).await?;

        let journal_id = JournalId::new();
        let lines = input
            .lines
            .iter()
            .enumerate()
            .map(|(idx, line)| JournalLine {
                id: JournalLineId::new(),
                journal_id,
                line_number: i32::try_from(idx + 1).unwrap_or(i32::MAX),
                account_id: line.account_id,
                description: line
                    .description
                    .clone()
                    .unwrap_or_else(|| input.description.clone()),
                debit: line.debit,
                credit: line.credit,
                currency: currency.clone(),
                fx_rate,
                base_debit: CurrencyService::convert(line.debit, fx_rate),
                base_credit: CurrencyService::convert(line.credit, fx_rate),
            })
            .collect();

        let journal = Journal {
            id: journal_id,
            company_id: input.company_id,
            number: number.formatted,
            date: input.date,
            source_type: input.source_type,
            source_id: input.source_id,
            description: input.description,
            currency,
            fx_rate,
            total_amount: totals.debit,
            created_by: input.created_by,
            created_at: Utc::now(),
            lines,
        };

        tx.insert_journal(&journal).await?;

        info!(
            company_id = %journal.company_id,
            journal_id = %journal.id,
            number = %journal.number,
            source_type = %journal.source_type,
            total = %journal.total_amount,
            "Journal posted"
        );

        Ok(journal)
    }

    /// Fetches a journal with its lines.
    pub async fn get<T: StoreTx>(tx: &mut T, company_id: CompanyId, journal_id: JournalId) -> Result<Journal, JournalError> {
        tx.get_journal(company_id, journal_id)
            .await?
            .ok_or(JournalError::NotFound(journal_id))
    }

    /// Writes the mirror image of a journal.
    ///
    /// Every line has debit and credit swapped; currency and rate are kept so
    /// base amounts cancel exactly. The original is untouched. A journal can
    /// be reversed once.
    pub async fn reverse<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        journal_id: JournalId,
        date: NaiveDate,
        reason: &str,
        user_id: Option<UserId>,
    ) -> Result<Journal, JournalError> {
        let original = tx
            .lock_journal(company_id, journal_id)
            .await?
            .ok_or(JournalError::NotFound(journal_id))?;

        if let Some(reversal_id) = tx.find_reversal(company_id, journal_id).await? {
            return Err(JournalError::AlreadyReversed {
                journal_id,
                reversal_id,
            });
        }

        let lines = original
            .lines
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                debit: line.credit,
                credit: line.debit,
                description: Some(format!("Reversal: {}", line.description)),
            })
            .collect();

        let reversal = Self::create(
            tx,
            CreateJournalInput {
                company_id,
                date,
                source_type: SourceType::Reversal,
                source_id: Some(original.id.into_inner()),
                description: format!("Reversal of {}: {reason}", original.number),
                currency: Some(original.currency.clone()),
                fx_rate: Some(original.fx_rate),
                lines,
                created_by: user_id,
            },
        )
        .await?;

        info!(
            company_id = %company_id,
            original = %original.number,
            reversal = %reversal.number,
            "Journal reversed"
        );

        Ok(reversal)
    }
}
