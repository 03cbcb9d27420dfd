//! Candidate generation for receipts and payments.

use chrono::NaiveDate;
use ledgerwise_shared::types::{CompanyId, CounterpartyId};
use ledgerwise_shared::MatchingConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::MatchError;
use super::scoring::{amount_score, confidence, date_score, text_score, MatchOverrides, MatchParams};
use super::types::{CashFilter, DocumentCandidate, MatchSide, PaymentSuggestions};
use crate::allocation::ledger::DUST;
use crate::allocation::{CashTransaction, Document};
use crate::store::StoreTx;

/// Largest per-side cap on movements considered.
pub const MAX_PER_SIDE: usize = 1000;

/// Which movements to look at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementScope {
    /// Receipts, payments, or both.
    #[serde(rename = "type")]
    pub side: MatchSide,
    /// Earliest value date.
    pub from: Option<NaiveDate>,
    /// Latest value date.
    pub to: Option<NaiveDate>,
    /// Only this customer or vendor.
    pub counterparty_id: Option<CounterpartyId>,
    /// Most recent movements per side, at most this many.
    pub max: Option<usize>,
}

impl MovementScope {
    pub(crate) fn filter(&self) -> CashFilter {
        CashFilter {
            from: self.from,
            to: self.to,
            counterparty_id: self.counterparty_id,
            limit: self.max.map(|m| m.clamp(1, MAX_PER_SIDE)),
        }
    }
}

/// Suggestion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// Movements considered.
    #[serde(flatten)]
    pub scope: MovementScope,
    /// Parameter overrides.
    #[serde(flatten)]
    pub overrides: MatchOverrides,
}

/// Scores open documents against receipts and payments.
pub struct ReconciliationMatcher;

impl ReconciliationMatcher {
    /// Scores every document that passes the amount factor, unfiltered and
    /// in input order.
    #[must_use]
    pub fn score_documents(
        params: &MatchParams,
        payment: &CashTransaction,
        remaining: Decimal,
        documents: &[Document],
    ) -> Vec<DocumentCandidate> {
        let reference = [payment.reference.as_deref(), payment.description.as_deref()];
        documents
            .iter()
            .filter(|doc| doc.outstanding() > Decimal::ZERO)
            .filter_map(|doc| {
                let outstanding = doc.outstanding();
                let (amount_score, exact_amount) = amount_score(params, outstanding, remaining)?;
                let days_apart = (payment.date - doc.issue_date).num_days();
                let date_score = date_score(params.max_days, days_apart);
                let text_score = text_score(params.text_weight, &reference, &doc.number);
                Some(DocumentCandidate {
                    document_kind: doc.kind,
                    document_id: doc.id,
                    number: doc.number.clone(),
                    counterparty_id: doc.counterparty_id,
                    issue_date: doc.issue_date,
                    due_date: doc.due_date,
                    total: doc.total,
                    outstanding,
                    currency: doc.currency.clone(),
                    currency_mismatch: doc.currency != payment.currency,
                    amount_score,
                    date_score,
                    text_score,
                    score: amount_score.saturating_add(date_score).saturating_add(text_score),
                    days_apart: days_apart.abs(),
                    exact_amount,
                    confidence: confidence(exact_amount, days_apart, params.max_days),
                })
            })
            .collect()
    }

    /// Filters by minimum score and currency, ranks by score, and keeps the
    /// top `max_candidates`.
    #[must_use]
    pub fn rank(params: &MatchParams, mut candidates: Vec<DocumentCandidate>) -> Vec<DocumentCandidate> {
        candidates.retain(|c| c.score >= params.min_score && !(params.currency_strict && c.currency_mismatch));
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.truncate(params.max_candidates);
        candidates
    }

    /// Ranked candidates for every movement in scope with money left to
    /// allocate. Receipts come first.
    pub async fn suggest<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        request: &SuggestionRequest,
        config: &MatchingConfig,
    ) -> Result<Vec<PaymentSuggestions>, MatchError> {
        let params = MatchParams::resolve(config, &request.overrides);
        let filter = request.scope.filter();
        let mut suggestions = Vec::new();

        for &kind in request.scope.side.kinds() {
            for payment in tx.list_cash(company_id, kind, &filter).await? {
                let remaining = Self::remaining(tx, &payment).await?;
                if remaining <= DUST {
                    continue;
                }
                let documents = Self::open_documents_for(tx, &payment).await?;
                let scored = Self::score_documents(&params, &payment, remaining, &documents);
                let candidates = Self::rank(&params, scored);
                suggestions.push(PaymentSuggestions {
                    payment_kind: payment.kind,
                    payment_id: payment.id,
                    number: payment.number,
                    date: payment.date,
                    amount: payment.amount,
                    unallocated: remaining,
                    currency: payment.currency,
                    candidates,
                });
            }
        }

        debug!(company_id = %company_id, movements = suggestions.len(), "Built match suggestions");
        Ok(suggestions)
    }

    pub(crate) async fn remaining<T: StoreTx>(tx: &mut T, payment: &CashTransaction) -> Result<Decimal, MatchError> {
        let allocated = tx.total_for_payment(payment.company_id, payment.kind, payment.id).await?;
        Ok((payment.amount - allocated).max(Decimal::ZERO))
    }

    /// Open documents of the movement's counterparty. A movement without a
    /// counterparty has no candidates.
    pub(crate) async fn open_documents_for<T: StoreTx>(
        tx: &mut T,
        payment: &CashTransaction,
    ) -> Result<Vec<Document>, MatchError> {
        let Some(counterparty_id) = payment.counterparty_id else {
            return Ok(Vec::new());
        };
        Ok(tx
            .open_documents(payment.company_id, payment.kind.settles(), Some(counterparty_id))
            .await?)
    }
}
