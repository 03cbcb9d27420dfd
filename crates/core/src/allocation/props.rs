//! Property-based tests for settlement bounds.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::fixtures::{date, invoice, receipt};
use super::ledger::AllocationLedger;
use super::types::{AllocateInput, DocumentKind, PaymentKind};
use crate::store::memory::{test_company, InMemoryStore};
use crate::store::{Store, StoreTx};
use crate::EPSILON;

fn cents(range: std::ops::Range<i64>) -> impl Strategy<Value = Decimal> {
    range.prop_map(|c| Decimal::new(c, 2))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Whatever sequence of requests arrives, the settled amount never
    /// exceeds the document total and matches the sum of allocations.
    #[test]
    fn prop_paid_never_exceeds_total(
        total in cents(100..1_000_000),
        requests in prop::collection::vec(cents(1..500_000), 1..8),
    ) {
        let rt = runtime();
        let (paid, sum, doc_total) = rt.block_on(async {
            let store = InMemoryStore::new();
            let company = test_company(&store).await;
            let doc = invoice(company, total);
            let doc_id = doc.id;
            let receipts: Vec<_> = requests.iter().map(|amount| receipt(company, *amount)).collect();
            let plan: Vec<_> = receipts.iter().map(|r| (r.id, r.amount)).collect();
            store.seed(move |s| {
                s.add_document(doc);
                for r in receipts {
                    s.add_cash(r);
                }
            }).await;

            for (payment_id, amount) in plan {
                let mut tx = store.begin().await.unwrap();
                let result = AllocationLedger::allocate(&mut tx, AllocateInput {
                    company_id: company,
                    payment_kind: PaymentKind::Receipt,
                    payment_id,
                    document_kind: DocumentKind::Invoice,
                    document_id: doc_id,
                    amount,
                    allocation_date: None,
                    user_id: None,
                }, date(2025, 3, 1)).await;
                if result.is_ok() {
                    tx.commit().await.unwrap();
                }
            }

            store.read(|s| {
                let sum: Decimal = s.allocations.iter().map(|a| a.amount).sum();
                (s.documents[&doc_id].paid_amount, sum, s.documents[&doc_id].total)
            }).await
        });

        prop_assert!(paid <= doc_total);
        prop_assert!(sum <= doc_total + EPSILON);
        prop_assert_eq!(paid, sum.min(doc_total));
    }
}
