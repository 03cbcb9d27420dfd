//! Line validation for journal creation.

use rust_decimal::Decimal;

use super::error::JournalError;
use super::types::JournalLineInput;
use crate::EPSILON;

/// Debit and credit totals of a validated line set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    /// Σ debit.
    pub debit: Decimal,
    /// Σ credit.
    pub credit: Decimal,
}

/// Validates lines and returns their totals.
///
/// Rules: at least one line, no negative amounts, and
/// `|Σ debit − Σ credit| ≤ 0.01`.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<LineTotals, JournalError> {
    if lines.is_empty() {
        return Err(JournalError::NoLines);
    }

    let mut totals = LineTotals {
        debit: Decimal::ZERO,
        credit: Decimal::ZERO,
    };
    for (idx, line) in lines.iter().enumerate() {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(JournalError::NegativeAmount { line: idx + 1 });
        }
        totals.debit += line.debit;
        totals.credit += line.credit;
    }

    if (totals.debit - totals.credit).abs() > EPSILON {
        return Err(JournalError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}
