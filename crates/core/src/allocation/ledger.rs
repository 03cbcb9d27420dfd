//! The payment allocation ledger.
//!
//! Every change runs inside the caller's unit of work: the movement and the
//! document are row-locked before the aggregates are read, so concurrent
//! allocations against the same document serialize and the recomputed status
//! always reflects every committed allocation.

use chrono::{NaiveDate, Utc};
use ledgerwise_shared::types::{AllocationId, CompanyId, DocumentId, PaymentId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::error::AllocationError;
use super::status::{derive_status, settled_amount};
use super::types::{AllocateInput, Allocation, DocumentKind, Lifecycle, PaymentKind, Settlement};
use crate::audit::{AuditAction, AuditEntry};
use crate::store::{Store, StoreError, StoreTx};
use crate::EPSILON;

/// Entity name used in the audit log.
pub const AUDIT_ENTITY: &str = "payment_allocation";

/// Below this, a movement or document counts as fully settled.
pub const DUST: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Result of a successful allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// The allocation written.
    pub allocation: Allocation,
    /// Document settlement after the allocation.
    pub settlement: Settlement,
    /// Movement amount still unallocated.
    pub unallocated: Decimal,
}

/// Per-id result of a batch undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoOutcome {
    /// Allocation targeted.
    pub allocation_id: AllocationId,
    /// Whether it was removed.
    pub deleted: bool,
    /// Document settlement after removal.
    pub settlement: Option<Settlement>,
    /// Error code when not removed.
    pub error: Option<String>,
}

/// Records and removes allocations and keeps document status in step.
pub struct AllocationLedger;

impl AllocationLedger {
    /// Applies part of a receipt or payment to an invoice or bill.
    ///
    /// The amount may not exceed `min(unallocated, outstanding)` by more than
    /// 0.01; an amount within that tolerance is trimmed to the maximum.
    pub async fn allocate<T: StoreTx>(
        tx: &mut T,
        input: AllocateInput,
        today: NaiveDate,
    ) -> Result<AllocationResult, AllocationError> {
        if input.amount <= Decimal::ZERO {
            return Err(AllocationError::InvalidAmount);
        }
        if input.payment_kind.settles() != input.document_kind {
            return Err(AllocationError::KindMismatch {
                payment_kind: input.payment_kind,
                document_kind: input.document_kind,
            });
        }

        let company_id = input.company_id;
        let payment = tx
            .lock_cash(company_id, input.payment_kind, input.payment_id)
            .await?
            .ok_or(AllocationError::PaymentNotFound(input.payment_kind, input.payment_id))?;
        let document = tx
            .lock_document(company_id, input.document_kind, input.document_id)
            .await?
            .ok_or(AllocationError::DocumentNotFound(input.document_kind, input.document_id))?;
        if document.lifecycle == Lifecycle::Void {
            return Err(AllocationError::DocumentVoid(document.id));
        }

        let unallocated = Self::remaining(
            payment.amount,
            tx.total_for_payment(company_id, payment.kind, payment.id).await?,
        );
        let outstanding = Self::remaining(
            document.total,
            tx.total_for_document(company_id, document.kind, document.id).await?,
        );
        let available = unallocated.min(outstanding);
        if available <= DUST {
            return Err(AllocationError::NothingToAllocate);
        }
        if input.amount - available > EPSILON {
            return Err(AllocationError::ExceedsOutstanding {
                requested: input.amount,
                available,
            });
        }
        let amount = input.amount.min(available);

        let allocation = Allocation {
            id: AllocationId::new(),
            company_id,
            payment_kind: payment.kind,
            payment_id: payment.id,
            document_kind: document.kind,
            document_id: document.id,
            amount,
            allocation_date: input.allocation_date.unwrap_or(today),
            created_by: input.user_id,
            created_at: Utc::now(),
        };
        tx.insert_allocation(&allocation).await?;

        let settlement = Self::recompute(tx, company_id, document.kind, document.id, today).await?;

        tx.record_audit(&AuditEntry::new(
            company_id,
            input.user_id,
            AUDIT_ENTITY,
            allocation.id.into_inner(),
            AuditAction::Create,
            json!({
                "payment_type": payment.kind,
                "payment_id": payment.id,
                "payment_number": payment.number,
                "document_type": document.kind,
                "document_id": document.id,
                "document_number": document.number,
                "amount": amount,
            }),
        ))
        .await?;

        info!(
            company_id = %company_id,
            allocation_id = %allocation.id,
            payment = %payment.number,
            document = %document.number,
            amount = %amount,
            status = %settlement.status,
            "Payment allocated"
        );

        Ok(AllocationResult {
            allocation,
            settlement,
            unallocated: unallocated - amount,
        })
    }

    /// Removes an allocation and re-derives the document's status.
    pub async fn delete<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        allocation_id: AllocationId,
        user_id: Option<UserId>,
        today: NaiveDate,
    ) -> Result<Settlement, AllocationError> {
        let allocation = tx
            .get_allocation(company_id, allocation_id)
            .await?
            .ok_or(AllocationError::AllocationNotFound(allocation_id))?;

        // Take the document lock before touching the aggregate.
        tx.lock_document(company_id, allocation.document_kind, allocation.document_id)
            .await?
            .ok_or(AllocationError::DocumentNotFound(allocation.document_kind, allocation.document_id))?;

        if !tx.delete_allocation(company_id, allocation_id).await? {
            return Err(AllocationError::AllocationNotFound(allocation_id));
        }

        let settlement =
            Self::recompute(tx, company_id, allocation.document_kind, allocation.document_id, today).await?;

        tx.record_audit(&AuditEntry::new(
            company_id,
            user_id,
            AUDIT_ENTITY,
            allocation_id.into_inner(),
            AuditAction::Delete,
            json!({
                "payment_type": allocation.payment_kind,
                "payment_id": allocation.payment_id,
                "document_type": allocation.document_kind,
                "document_id": allocation.document_id,
                "amount": allocation.amount,
            }),
        ))
        .await?;

        info!(
            company_id = %company_id,
            allocation_id = %allocation_id,
            amount = %allocation.amount,
            status = %settlement.status,
            "Allocation deleted"
        );

        Ok(settlement)
    }

    /// Recomputes and stores a document's paid amount and status.
    ///
    /// The paid amount is clamped to the document total so an upstream error
    /// can never report a document as more than fully paid.
    pub async fn recompute<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
        today: NaiveDate,
    ) -> Result<Settlement, AllocationError> {
        let document = tx
            .lock_document(company_id, kind, document_id)
            .await?
            .ok_or(AllocationError::DocumentNotFound(kind, document_id))?;
        let allocated = tx.total_for_document(company_id, kind, document_id).await?;
        if allocated > document.total {
            warn!(
                company_id = %company_id,
                document_id = %document_id,
                allocated = %allocated,
                total = %document.total,
                "Allocations exceed document total, clamping"
            );
        }

        let paid_amount = settled_amount(document.total, allocated);
        let status = derive_status(
            kind,
            document.lifecycle,
            document.total,
            paid_amount,
            document.due_date,
            today,
        );
        tx.update_settlement(company_id, kind, document_id, paid_amount, status)
            .await?;

        Ok(Settlement {
            document_kind: kind,
            document_id,
            paid_amount,
            status,
        })
    }

    /// Σ allocations against a document.
    pub async fn total_allocated<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Decimal, AllocationError> {
        Ok(tx.total_for_document(company_id, kind, document_id).await?)
    }

    /// Movement amount not yet allocated.
    pub async fn unallocated_amount<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Decimal, AllocationError> {
        let payment = tx
            .get_cash(company_id, kind, payment_id)
            .await?
            .ok_or(AllocationError::PaymentNotFound(kind, payment_id))?;
        let allocated = tx.total_for_payment(company_id, kind, payment_id).await?;
        Ok(Self::remaining(payment.amount, allocated))
    }

    /// Allocations against a document, oldest first.
    pub async fn list_for_document<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Vec<Allocation>, AllocationError> {
        tx.get_document(company_id, kind, document_id)
            .await?
            .ok_or(AllocationError::DocumentNotFound(kind, document_id))?;
        Ok(tx.list_for_document(company_id, kind, document_id).await?)
    }

    /// Most recent allocations of a company.
    pub async fn recent<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        limit: usize,
    ) -> Result<Vec<Allocation>, AllocationError> {
        Ok(tx.recent_allocations(company_id, limit).await?)
    }

    /// Deletes each allocation in its own unit of work.
    ///
    /// A failure on one id does not stop the rest.
    pub async fn undo_batch<S: Store>(
        store: &S,
        company_id: CompanyId,
        allocation_ids: &[AllocationId],
        user_id: Option<UserId>,
        today: NaiveDate,
    ) -> Result<Vec<UndoOutcome>, StoreError> {
        let mut outcomes = Vec::with_capacity(allocation_ids.len());
        for &allocation_id in allocation_ids {
            let mut tx = store.begin().await?;
            let outcome = match Self::delete(&mut tx, company_id, allocation_id, user_id, today).await {
                Ok(settlement) => match tx.commit().await {
                    Ok(()) => UndoOutcome {
                        allocation_id,
                        deleted: true,
                        settlement: Some(settlement),
                        error: None,
                    },
                    Err(e) => UndoOutcome {
                        allocation_id,
                        deleted: false,
                        settlement: None,
                        error: Some(e.error_code().to_string()),
                    },
                },
                Err(e) => {
                    warn!(allocation_id = %allocation_id, error = %e, "Undo failed");
                    UndoOutcome {
                        allocation_id,
                        deleted: false,
                        settlement: None,
                        error: Some(e.error_code().to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn remaining(amount: Decimal, used: Decimal) -> Decimal {
        (amount - used).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::fixtures::{bill, date, invoice, payment, receipt};
    use crate::allocation::types::{Document, DocumentStatus};
    use crate::store::memory::{test_company, InMemoryStore};
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        date(2025, 3, 15)
    }

    async fn seeded(store: &InMemoryStore, total: Decimal, cash: Decimal) -> (CompanyId, Document, PaymentId) {
        let company = test_company(store).await;
        let doc = invoice(company, total);
        let rcpt = receipt(company, cash);
        let (seed_doc, receipt_id) = (doc.clone(), rcpt.id);
        store
            .seed(move |s| {
                s.add_document(seed_doc);
                s.add_cash(rcpt);
            })
            .await;
        (company, doc, receipt_id)
    }

    fn input(company: CompanyId, receipt_id: PaymentId, doc: &Document, amount: Decimal) -> AllocateInput {
        AllocateInput {
            company_id: company,
            payment_kind: PaymentKind::Receipt,
            payment_id: receipt_id,
            document_kind: doc.kind,
            document_id: doc.id,
            amount,
            allocation_date: None,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_partial_then_full_settlement() {
        let store = InMemoryStore::new();
        let (company, doc, receipt_id) = seeded(&store, dec!(1000), dec!(1000)).await;

        let mut tx = store.begin().await.unwrap();
        let first = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(400)), today())
            .await
            .unwrap();
        assert_eq!(first.settlement.paid_amount, dec!(400));
        assert_eq!(first.settlement.status, DocumentStatus::PartiallyPaid);
        assert_eq!(first.unallocated, dec!(600));
        assert_eq!(first.allocation.allocation_date, today());

        let second = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(600)), today())
            .await
            .unwrap();
        assert_eq!(second.settlement.status, DocumentStatus::Paid);
        assert_eq!(second.unallocated, Decimal::ZERO);
        tx.commit().await.unwrap();

        let (paid, audits) = store
            .read(|s| (s.documents[&doc.id].paid_amount, s.audit_log.len()))
            .await;
        assert_eq!(paid, dec!(1000));
        assert_eq!(audits, 2);
    }

    #[tokio::test]
    async fn test_over_allocation_rejected_with_available() {
        let store = InMemoryStore::new();
        let (company, doc, receipt_id) = seeded(&store, dec!(1000), dec!(400)).await;

        let mut tx = store.begin().await.unwrap();
        let err = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(500)), today())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AllocationError::ExceedsOutstanding { requested, available }
                if requested == dec!(500) && available == dec!(400)
        ));
    }

    #[tokio::test]
    async fn test_amount_within_tolerance_is_trimmed() {
        let store = InMemoryStore::new();
        let (company, doc, receipt_id) = seeded(&store, dec!(100), dec!(100)).await;

        let mut tx = store.begin().await.unwrap();
        let result = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(100.005)), today())
            .await
            .unwrap();
        assert_eq!(result.allocation.amount, dec!(100));
        assert_eq!(result.settlement.status, DocumentStatus::Paid);
    }

    #[tokio::test]
    async fn test_fully_allocated_receipt_has_nothing_left() {
        let store = InMemoryStore::new();
        let (company, doc, receipt_id) = seeded(&store, dec!(1000), dec!(200)).await;

        let mut tx = store.begin().await.unwrap();
        AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(200)), today())
            .await
            .unwrap();
        let err = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(1)), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::NothingToAllocate));
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let store = InMemoryStore::new();
        let (company, doc, receipt_id) = seeded(&store, dec!(1000), dec!(1000)).await;
        let mut tx = store.begin().await.unwrap();

        let err = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, Decimal::ZERO), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::InvalidAmount));

        let mut wrong_kind = input(company, receipt_id, &doc, dec!(10));
        wrong_kind.document_kind = DocumentKind::Bill;
        let err = AllocationLedger::allocate(&mut tx, wrong_kind, today()).await.unwrap_err();
        assert_eq!(err.error_code(), "KIND_MISMATCH");

        let mut missing = input(company, receipt_id, &doc, dec!(10));
        missing.document_id = DocumentId::new();
        let err = AllocationLedger::allocate(&mut tx, missing, today()).await.unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_void_document_rejected() {
        let store = InMemoryStore::new();
        let (company, doc, receipt_id) = seeded(&store, dec!(1000), dec!(1000)).await;
        let doc_id = doc.id;
        store
            .seed(move |s| {
                if let Some(d) = s.documents.get_mut(&doc_id) {
                    d.lifecycle = Lifecycle::Void;
                }
            })
            .await;

        let mut tx = store.begin().await.unwrap();
        let err = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(10)), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::DocumentVoid(id) if id == doc_id));
    }

    #[tokio::test]
    async fn test_delete_restores_open_status() {
        let store = InMemoryStore::new();
        let (company, doc, receipt_id) = seeded(&store, dec!(1000), dec!(1000)).await;

        let mut tx = store.begin().await.unwrap();
        let result = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(1000)), today())
            .await
            .unwrap();
        let settlement = AllocationLedger::delete(&mut tx, company, result.allocation.id, None, today())
            .await
            .unwrap();
        assert_eq!(settlement.paid_amount, Decimal::ZERO);
        assert_eq!(settlement.status, DocumentStatus::Sent);

        let unallocated = AllocationLedger::unallocated_amount(&mut tx, company, PaymentKind::Receipt, receipt_id)
            .await
            .unwrap();
        assert_eq!(unallocated, dec!(1000));

        let err = AllocationLedger::delete(&mut tx, company, result.allocation.id, None, today())
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::AllocationNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_first_of_two_leaves_partial() {
        let store = InMemoryStore::new();
        let (company, doc, receipt_id) = seeded(&store, dec!(1000), dec!(1000)).await;

        let mut tx = store.begin().await.unwrap();
        let first = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(400)), today())
            .await
            .unwrap();
        assert_eq!(first.settlement.status, DocumentStatus::PartiallyPaid);
        let second = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(600)), today())
            .await
            .unwrap();
        assert_eq!(second.settlement.paid_amount, dec!(1000));
        assert_eq!(second.settlement.status, DocumentStatus::Paid);

        let settlement = AllocationLedger::delete(&mut tx, company, first.allocation.id, None, today())
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(settlement.paid_amount, dec!(600));
        assert_eq!(settlement.status, DocumentStatus::PartiallyPaid);

        let (paid, status) = store
            .read(|s| {
                let stored = &s.documents[&doc.id];
                (stored.paid_amount, stored.status)
            })
            .await;
        assert_eq!(paid, dec!(600));
        assert_eq!(status, DocumentStatus::PartiallyPaid);
    }

    #[tokio::test]
    async fn test_overdue_after_delete_past_due() {
        let store = InMemoryStore::new();
        let company = test_company(&store).await;
        let mut doc = bill(company, dec!(300));
        doc.due_date = date(2025, 2, 1);
        let pay = payment(company, dec!(300));
        let (doc_id, pay_id) = (doc.id, pay.id);
        store
            .seed(move |s| {
                s.add_document(doc);
                s.add_cash(pay);
            })
            .await;

        let mut tx = store.begin().await.unwrap();
        let result = AllocationLedger::allocate(
            &mut tx,
            AllocateInput {
                company_id: company,
                payment_kind: PaymentKind::Payment,
                payment_id: pay_id,
                document_kind: DocumentKind::Bill,
                document_id: doc_id,
                amount: dec!(100),
                allocation_date: Some(date(2025, 3, 1)),
                user_id: None,
            },
            today(),
        )
        .await
        .unwrap();
        assert_eq!(result.settlement.status, DocumentStatus::PartiallyPaid);

        let settlement = AllocationLedger::delete(&mut tx, company, result.allocation.id, None, today())
            .await
            .unwrap();
        assert_eq!(settlement.status, DocumentStatus::Overdue);
    }

    #[tokio::test]
    async fn test_undo_batch_reports_each_id() {
        let store = InMemoryStore::new();
        let (company, doc, receipt_id) = seeded(&store, dec!(1000), dec!(1000)).await;

        let mut tx = store.begin().await.unwrap();
        let a = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(300)), today())
            .await
            .unwrap();
        let b = AllocationLedger::allocate(&mut tx, input(company, receipt_id, &doc, dec!(200)), today())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let missing = AllocationId::new();
        let outcomes = AllocationLedger::undo_batch(
            &store,
            company,
            &[a.allocation.id, missing, b.allocation.id],
            None,
            today(),
        )
        .await
        .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].deleted);
        assert!(!outcomes[1].deleted);
        assert_eq!(outcomes[1].error.as_deref(), Some("NOT_FOUND"));
        assert!(outcomes[2].deleted);

        let (paid, remaining) = store
            .read(|s| (s.documents[&doc.id].paid_amount, s.allocations.len()))
            .await;
        assert_eq!(paid, Decimal::ZERO);
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_never_exceed_total() {
        let store = InMemoryStore::new();
        let company = test_company(&store).await;
        let doc = invoice(company, dec!(1000));
        let receipts: Vec<_> = (0..4).map(|_| receipt(company, dec!(400))).collect();
        let doc_id = doc.id;
        let ids: Vec<PaymentId> = receipts.iter().map(|r| r.id).collect();
        store
            .seed(move |s| {
                s.add_document(doc);
                for r in receipts {
                    s.add_cash(r);
                }
            })
            .await;

        let tasks = ids.into_iter().map(|receipt_id| {
            let store = store.clone();
            async move {
                let mut tx = store.begin().await?;
                let result = AllocationLedger::allocate(
                    &mut tx,
                    AllocateInput {
                        company_id: company,
                        payment_kind: PaymentKind::Receipt,
                        payment_id: receipt_id,
                        document_kind: DocumentKind::Invoice,
                        document_id: doc_id,
                        amount: dec!(400),
                        allocation_date: None,
                        user_id: None,
                    },
                    today(),
                )
                .await;
                if result.is_ok() {
                    tx.commit().await?;
                }
                Ok::<_, AllocationError>(result.is_ok())
            }
        });
        let results = futures::future::join_all(tasks).await;
        let accepted = results.into_iter().filter(|r| matches!(r, Ok(true))).count();

        assert_eq!(accepted, 2);
        let paid = store.read(|s| s.documents[&doc_id].paid_amount).await;
        assert_eq!(paid, dec!(800));
    }
}
