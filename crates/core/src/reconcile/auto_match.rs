//! Two-phase auto-match: plan unique exact matches, then optionally commit
//! them one unit of work at a time.

use chrono::NaiveDate;
use ledgerwise_shared::types::{CompanyId, DocumentId, PaymentId, UserId};
use ledgerwise_shared::MatchingConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::MatchError;
use super::matcher::{MovementScope, ReconciliationMatcher};
use super::scoring::{date_score, MatchOverrides, MatchParams, EXACT_AMOUNT_SCORE};
use crate::allocation::ledger::DUST;
use crate::allocation::{AllocateInput, AllocationLedger, DocumentKind, PaymentKind};
use crate::store::{Store, StoreTx};

/// Reason given when more than one document matches exactly.
pub const REASON_MULTIPLE: &str = "multiple exact matches";

/// Reason given when the caller left a pair out of `selected`.
pub const REASON_NOT_SELECTED: &str = "not selected";

const fn default_dry_run() -> bool {
    true
}

/// A payment/document pair the caller approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPair {
    /// Receipt or payment.
    pub payment_id: PaymentId,
    /// Invoice or bill.
    pub document_id: DocumentId,
}

/// Auto-match request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoMatchRequest {
    /// Plan only.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    /// When present, only these pairs are committed.
    #[serde(default)]
    pub selected: Option<Vec<SelectedPair>>,
    /// Movements considered.
    #[serde(flatten)]
    pub scope: MovementScope,
    /// Parameter overrides.
    #[serde(flatten)]
    pub overrides: MatchOverrides,
}

impl Default for AutoMatchRequest {
    fn default() -> Self {
        Self {
            dry_run: true,
            selected: None,
            scope: MovementScope::default(),
            overrides: MatchOverrides::default(),
        }
    }
}

/// Per-action outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionStatus {
    /// Planned, not yet committed.
    WouldAllocate,
    /// Committed.
    Allocated,
    /// Not attempted.
    Skipped,
    /// Attempted and rejected.
    Failed,
}

/// One planned or executed allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAction {
    /// Receipt or payment.
    pub payment_kind: PaymentKind,
    /// Movement.
    pub payment_id: PaymentId,
    /// Movement number.
    pub payment_number: String,
    /// Invoice or bill.
    pub document_kind: DocumentKind,
    /// Matched document, or the first of several for a skip.
    pub document_id: DocumentId,
    /// Document number.
    pub document_number: String,
    /// Amount to allocate.
    pub amount: Decimal,
    /// Outcome.
    pub status: ActionStatus,
    /// Why the action was skipped or failed.
    pub reason: Option<String>,
    /// Days between movement date and document issue date.
    pub days_apart: i64,
    /// Currencies differ.
    pub currency_mismatch: bool,
    /// Amount plus date score.
    pub score: u32,
}

/// Counts per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoMatchSummary {
    /// Actions planned.
    pub total_candidates: usize,
    /// Still planned (dry run).
    pub would_allocate: usize,
    /// Committed.
    pub allocated: usize,
    /// Not attempted.
    pub skipped: usize,
    /// Rejected.
    pub failed: usize,
}

impl AutoMatchSummary {
    fn tally(actions: &[MatchAction]) -> Self {
        let mut summary = Self {
            total_candidates: actions.len(),
            ..Self::default()
        };
        for action in actions {
            match action.status {
                ActionStatus::WouldAllocate => summary.would_allocate += 1,
                ActionStatus::Allocated => summary.allocated += 1,
                ActionStatus::Skipped => summary.skipped += 1,
                ActionStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

/// Auto-match result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoMatchReport {
    /// Whether anything was committed.
    pub dry_run: bool,
    /// Actions in plan order.
    pub actions: Vec<MatchAction>,
    /// Counts.
    pub summary: AutoMatchSummary,
}

/// Auto-match runner.
pub struct AutoMatcher;

impl AutoMatcher {
    /// Plans one action per movement whose remaining amount matches exactly
    /// one open document, and commits the planned actions unless `dry_run`.
    ///
    /// Each commit runs in its own unit of work; a failure is recorded on the
    /// action and the batch carries on.
    pub async fn run<S: Store>(
        store: &S,
        company_id: CompanyId,
        request: &AutoMatchRequest,
        config: &MatchingConfig,
        user_id: Option<UserId>,
        today: NaiveDate,
    ) -> Result<AutoMatchReport, MatchError> {
        let params = MatchParams::resolve(config, &request.overrides);

        let mut actions = {
            let mut tx = store.begin().await?;
            Self::plan(&mut tx, company_id, &request.scope, &params).await?
        };

        if let Some(pairs) = &request.selected {
            for action in actions.iter_mut().filter(|a| a.status == ActionStatus::WouldAllocate) {
                let selected = pairs
                    .iter()
                    .any(|p| p.payment_id == action.payment_id && p.document_id == action.document_id);
                if !selected {
                    action.status = ActionStatus::Skipped;
                    action.reason = Some(REASON_NOT_SELECTED.to_string());
                }
            }
        }

        if !request.dry_run {
            for action in actions.iter_mut().filter(|a| a.status == ActionStatus::WouldAllocate) {
                Self::execute(store, company_id, action, user_id, today).await;
            }
        }

        let summary = AutoMatchSummary::tally(&actions);
        info!(
            company_id = %company_id,
            dry_run = request.dry_run,
            planned = summary.total_candidates,
            allocated = summary.allocated,
            failed = summary.failed,
            "Auto-match finished"
        );

        Ok(AutoMatchReport {
            dry_run: request.dry_run,
            actions,
            summary,
        })
    }

    /// Builds the plan, capped at `max_actions`. Receipts are planned first.
    pub async fn plan<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        scope: &MovementScope,
        params: &MatchParams,
    ) -> Result<Vec<MatchAction>, MatchError> {
        let filter = scope.filter();
        let mut actions = Vec::new();

        'kinds: for &kind in scope.side.kinds() {
            for payment in tx.list_cash(company_id, kind, &filter).await? {
                if actions.len() >= params.max_actions {
                    break 'kinds;
                }
                let remaining = ReconciliationMatcher::remaining(tx, &payment).await?;
                if remaining <= DUST {
                    continue;
                }
                let documents = ReconciliationMatcher::open_documents_for(tx, &payment).await?;
                let exacts: Vec<_> = documents
                    .iter()
                    .filter(|doc| doc.outstanding() > Decimal::ZERO)
                    .filter(|doc| params.is_exact(doc.outstanding(), remaining))
                    .filter(|doc| !params.currency_strict || doc.currency == payment.currency)
                    .collect();

                let Some(first) = exacts.first() else {
                    continue;
                };
                let days_apart = (payment.date - first.issue_date).num_days().abs();
                let unique = exacts.len() == 1;
                actions.push(MatchAction {
                    payment_kind: payment.kind,
                    payment_id: payment.id,
                    payment_number: payment.number.clone(),
                    document_kind: first.kind,
                    document_id: first.id,
                    document_number: first.number.clone(),
                    amount: if unique { remaining.min(first.outstanding()) } else { remaining },
                    status: if unique { ActionStatus::WouldAllocate } else { ActionStatus::Skipped },
                    reason: (!unique).then(|| REASON_MULTIPLE.to_string()),
                    days_apart,
                    currency_mismatch: first.currency != payment.currency,
                    score: EXACT_AMOUNT_SCORE + date_score(params.max_days, days_apart),
                });
            }
        }

        Ok(actions)
    }

    async fn execute<S: Store>(
        store: &S,
        company_id: CompanyId,
        action: &mut MatchAction,
        user_id: Option<UserId>,
        today: NaiveDate,
    ) {
        let input = AllocateInput {
            company_id,
            payment_kind: action.payment_kind,
            payment_id: action.payment_id,
            document_kind: action.document_kind,
            document_id: action.document_id,
            amount: action.amount,
            allocation_date: None,
            user_id,
        };

        let result = async {
            let mut tx = store.begin().await?;
            AllocationLedger::allocate(&mut tx, input, today).await?;
            tx.commit().await?;
            Ok::<_, MatchError>(())
        }
        .await;

        match result {
            Ok(()) => action.status = ActionStatus::Allocated,
            Err(e) => {
                warn!(
                    payment_id = %action.payment_id,
                    document_id = %action.document_id,
                    error = %e,
                    "Auto-match allocation failed"
                );
                action.status = ActionStatus::Failed;
                action.reason = Some(e.error_code().to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::fixtures::{bill, invoice, payment, receipt};
    use crate::store::memory::{test_company, InMemoryStore};
    use ledgerwise_shared::types::CounterpartyId;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    struct Fixture {
        company: CompanyId,
        unique_receipt: PaymentId,
        unique_invoice: DocumentId,
        ambiguous_payment: PaymentId,
    }

    async fn fixture(store: &InMemoryStore) -> Fixture {
        let company = test_company(store).await;
        let customer = CounterpartyId::new();
        let vendor = CounterpartyId::new();

        let mut rcpt = receipt(company, dec!(500));
        rcpt.counterparty_id = Some(customer);
        let mut inv = invoice(company, dec!(500));
        inv.counterparty_id = customer;

        let mut pay = payment(company, dec!(200));
        pay.counterparty_id = Some(vendor);
        let mut bill_a = bill(company, dec!(200));
        bill_a.counterparty_id = vendor;
        let mut bill_b = bill(company, dec!(200));
        bill_b.counterparty_id = vendor;
        bill_b.number = "BILL-2025-00002".to_string();

        let f = Fixture {
            company,
            unique_receipt: rcpt.id,
            unique_invoice: inv.id,
            ambiguous_payment: pay.id,
        };
        store
            .seed(move |s| {
                s.add_cash(rcpt);
                s.add_cash(pay);
                s.add_document(inv);
                s.add_document(bill_a);
                s.add_document(bill_b);
            })
            .await;
        f
    }

    #[tokio::test]
    async fn test_dry_run_plans_without_writing() {
        let store = InMemoryStore::new();
        let f = fixture(&store).await;

        let report = AutoMatcher::run(
            &store,
            f.company,
            &AutoMatchRequest::default(),
            &MatchingConfig::default(),
            None,
            today(),
        )
        .await
        .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.actions.len(), 2);
        assert_eq!(report.actions[0].payment_id, f.unique_receipt);
        assert_eq!(report.actions[0].status, ActionStatus::WouldAllocate);
        assert_eq!(report.actions[0].amount, dec!(500));
        assert_eq!(report.actions[1].payment_id, f.ambiguous_payment);
        assert_eq!(report.actions[1].status, ActionStatus::Skipped);
        assert_eq!(report.actions[1].reason.as_deref(), Some(REASON_MULTIPLE));
        assert_eq!(report.summary.would_allocate, 1);
        assert_eq!(report.summary.skipped, 1);

        assert!(store.read(|s| s.allocations.is_empty()).await);
    }

    #[tokio::test]
    async fn test_commit_allocates_unique_matches() {
        let store = InMemoryStore::new();
        let f = fixture(&store).await;

        let request = AutoMatchRequest {
            dry_run: false,
            ..AutoMatchRequest::default()
        };
        let report = AutoMatcher::run(&store, f.company, &request, &MatchingConfig::default(), None, today())
            .await
            .unwrap();

        assert_eq!(report.summary.allocated, 1);
        assert_eq!(report.summary.skipped, 1);
        let (paid, audits) = store
            .read(|s| (s.documents[&f.unique_invoice].paid_amount, s.audit_log.len()))
            .await;
        assert_eq!(paid, dec!(500));
        assert_eq!(audits, 1);
    }

    #[tokio::test]
    async fn test_unselected_pairs_are_skipped() {
        let store = InMemoryStore::new();
        let f = fixture(&store).await;

        let request = AutoMatchRequest {
            dry_run: false,
            selected: Some(Vec::new()),
            ..AutoMatchRequest::default()
        };
        let report = AutoMatcher::run(&store, f.company, &request, &MatchingConfig::default(), None, today())
            .await
            .unwrap();

        assert_eq!(report.summary.allocated, 0);
        assert_eq!(report.actions[0].reason.as_deref(), Some(REASON_NOT_SELECTED));
        assert!(store.read(|s| s.allocations.is_empty()).await);
    }

    #[tokio::test]
    async fn test_dry_run_applies_selection() {
        let store = InMemoryStore::new();
        let f = fixture(&store).await;

        let request = AutoMatchRequest {
            selected: Some(Vec::new()),
            ..AutoMatchRequest::default()
        };
        let report = AutoMatcher::run(&store, f.company, &request, &MatchingConfig::default(), None, today())
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.actions[0].payment_id, f.unique_receipt);
        assert_eq!(report.actions[0].status, ActionStatus::Skipped);
        assert_eq!(report.actions[0].reason.as_deref(), Some(REASON_NOT_SELECTED));
        assert_eq!(report.summary.would_allocate, 0);
        assert_eq!(report.summary.skipped, 2);

        let request = AutoMatchRequest {
            selected: Some(vec![SelectedPair {
                payment_id: f.unique_receipt,
                document_id: f.unique_invoice,
            }]),
            ..AutoMatchRequest::default()
        };
        let report = AutoMatcher::run(&store, f.company, &request, &MatchingConfig::default(), None, today())
            .await
            .unwrap();
        assert_eq!(report.actions[0].status, ActionStatus::WouldAllocate);
        assert!(store.read(|s| s.allocations.is_empty()).await);
    }

    #[tokio::test]
    async fn test_second_claim_on_same_document_fails_alone() {
        let store = InMemoryStore::new();
        let f = fixture(&store).await;
        let customer = store.read(|s| s.documents[&f.unique_invoice].counterparty_id).await;
        let mut twin = receipt(f.company, dec!(500));
        twin.counterparty_id = Some(customer);
        twin.date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        store.seed(move |s| s.add_cash(twin)).await;

        let request = AutoMatchRequest {
            dry_run: false,
            ..AutoMatchRequest::default()
        };
        let report = AutoMatcher::run(&store, f.company, &request, &MatchingConfig::default(), None, today())
            .await
            .unwrap();

        assert_eq!(report.summary.allocated, 1);
        assert_eq!(report.summary.failed, 1);
        let failed = report.actions.iter().find(|a| a.status == ActionStatus::Failed).unwrap();
        assert_eq!(failed.reason.as_deref(), Some("NOTHING_TO_ALLOCATE"));
    }

    #[tokio::test]
    async fn test_max_actions_caps_the_plan() {
        let store = InMemoryStore::new();
        let f = fixture(&store).await;

        let request = AutoMatchRequest {
            overrides: MatchOverrides {
                max_actions: Some(1),
                ..MatchOverrides::default()
            },
            ..AutoMatchRequest::default()
        };
        let report = AutoMatcher::run(&store, f.company, &request, &MatchingConfig::default(), None, today())
            .await
            .unwrap();
        assert_eq!(report.actions.len(), 1);
    }
}
