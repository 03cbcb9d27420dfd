//! Bank statement line matching.

use ledgerwise_shared::types::{BankLineId, CompanyId, PaymentId, UserId};
use ledgerwise_shared::MatchingConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::error::MatchError;
use super::scoring::{amount_score, confidence, date_score, text_score, MatchOverrides, MatchParams};
use super::types::{BankLine, CashCandidate};
use crate::allocation::{CashTransaction, PaymentKind};
use crate::audit::{AuditAction, AuditEntry};
use crate::store::StoreTx;

/// Entity name used in the audit log.
pub const AUDIT_ENTITY: &str = "bank_statement_line";

/// A confirmed line-to-movement match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankMatch {
    /// Statement line.
    pub bank_line_id: BankLineId,
    /// Receipt or payment.
    pub payment_kind: PaymentKind,
    /// Movement now reconciled.
    pub payment_id: PaymentId,
}

/// Matches imported statement lines to recorded receipts and payments.
pub struct BankMatcher;

impl BankMatcher {
    /// Movement kind a signed line amount corresponds to.
    #[must_use]
    pub fn kind_for(amount: Decimal) -> Option<PaymentKind> {
        if amount > Decimal::ZERO {
            Some(PaymentKind::Receipt)
        } else if amount < Decimal::ZERO {
            Some(PaymentKind::Payment)
        } else {
            None
        }
    }

    /// Scores one movement against a line.
    #[must_use]
    pub fn score(params: &MatchParams, line: &BankLine, cash: &CashTransaction) -> Option<CashCandidate> {
        let (amount_score, exact_amount) = amount_score(params, cash.amount, line.amount.abs())?;
        let days_apart = (line.date - cash.date).num_days();
        let date_score = date_score(params.max_days, days_apart);
        let text_score = text_score(
            params.text_weight,
            &[Some(line.description.as_str()), line.reference.as_deref()],
            &cash.number,
        );
        Some(CashCandidate {
            payment_kind: cash.kind,
            payment_id: cash.id,
            number: cash.number.clone(),
            date: cash.date,
            amount: cash.amount,
            amount_score,
            date_score,
            text_score,
            score: amount_score.saturating_add(date_score).saturating_add(text_score),
            days_apart: days_apart.abs(),
            exact_amount,
            confidence: confidence(exact_amount, days_apart, params.max_days),
        })
    }

    /// Ranked unreconciled receipts (money in) or payments (money out) on the
    /// line's bank account. A matched line has no suggestions.
    pub async fn suggest_for_line<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        line_id: BankLineId,
        overrides: &MatchOverrides,
        config: &MatchingConfig,
    ) -> Result<Vec<CashCandidate>, MatchError> {
        let line = tx
            .lock_bank_line(company_id, line_id)
            .await?
            .ok_or(MatchError::BankLineNotFound(line_id))?;
        if line.matched {
            return Ok(Vec::new());
        }
        let kind = Self::kind_for(line.amount).ok_or(MatchError::ZeroAmountLine(line_id))?;
        let params = MatchParams::resolve(config, overrides);

        let mut candidates: Vec<_> = tx
            .unreconciled_cash(company_id, kind, line.bank_account_id)
            .await?
            .iter()
            .filter_map(|cash| Self::score(&params, &line, cash))
            .filter(|c| c.score >= params.min_score)
            .collect();
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.truncate(params.max_candidates);
        Ok(candidates)
    }

    /// Marks the line matched and the movement reconciled.
    pub async fn match_line<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        line_id: BankLineId,
        payment_id: PaymentId,
        user_id: Option<UserId>,
    ) -> Result<BankMatch, MatchError> {
        let line = tx
            .lock_bank_line(company_id, line_id)
            .await?
            .ok_or(MatchError::BankLineNotFound(line_id))?;
        if line.matched {
            return Err(MatchError::LineAlreadyMatched(line_id));
        }
        let kind = Self::kind_for(line.amount).ok_or(MatchError::ZeroAmountLine(line_id))?;

        let cash = tx
            .lock_cash(company_id, kind, payment_id)
            .await?
            .ok_or(MatchError::PaymentNotFound(kind, payment_id))?;
        if cash.reconciled {
            return Err(MatchError::AlreadyReconciled(kind, payment_id));
        }
        if cash.bank_account_id.is_some_and(|account| account != line.bank_account_id) {
            return Err(MatchError::BankAccountMismatch(kind, payment_id));
        }

        tx.mark_bank_line_matched(company_id, line_id, kind, payment_id).await?;
        tx.set_reconciled(company_id, kind, payment_id, true).await?;
        tx.record_audit(&AuditEntry::new(
            company_id,
            user_id,
            AUDIT_ENTITY,
            line_id.into_inner(),
            AuditAction::Match,
            json!({
                "payment_type": kind,
                "payment_id": payment_id,
                "payment_number": cash.number,
                "amount": line.amount,
            }),
        ))
        .await?;

        info!(
            company_id = %company_id,
            bank_line_id = %line_id,
            payment = %cash.number,
            "Bank line matched"
        );

        Ok(BankMatch {
            bank_line_id: line_id,
            payment_kind: kind,
            payment_id,
        })
    }
}
