//! Statement-to-book reconciliation summary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::EPSILON;

/// Kind of reconciling item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilingItemKind {
    /// Deposit booked but not yet on the statement.
    OutstandingReceipt,
    /// Cheque or transfer booked but not yet cleared.
    OutstandingPayment,
    /// Interest credited by the bank.
    Interest,
    /// Fees charged by the bank.
    BankCharge,
    /// Signed manual adjustment.
    Adjustment,
}

/// One reconciling item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilingItem {
    /// Kind.
    pub kind: ReconcilingItemKind,
    /// Amount; positive except for adjustments.
    pub amount: Decimal,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Summary request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    /// Closing balance on the bank statement.
    pub statement_balance: Decimal,
    /// Balance of the bank account in the books.
    pub book_balance: Decimal,
    /// Reconciling items.
    #[serde(default)]
    pub items: Vec<ReconcilingItem>,
}

/// Reconciliation summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Closing balance on the bank statement.
    pub statement_balance: Decimal,
    /// Σ outstanding receipts.
    pub outstanding_receipts: Decimal,
    /// Σ outstanding payments.
    pub outstanding_payments: Decimal,
    /// Σ interest.
    pub interest: Decimal,
    /// Σ bank charges.
    pub charges: Decimal,
    /// Σ adjustments.
    pub adjustments: Decimal,
    /// Book balance implied by the statement and the items.
    pub expected_book_balance: Decimal,
    /// Balance in the books.
    pub book_balance: Decimal,
    /// |expected − book|.
    pub difference: Decimal,
    /// Difference below 0.01.
    pub balanced: bool,
}

impl ReconciliationSummary {
    /// expected = statement + receipts − payments + interest − charges + adjustments.
    #[must_use]
    pub fn compute(request: &SummaryRequest) -> Self {
        let sum = |kind: ReconcilingItemKind| -> Decimal {
            request
                .items
                .iter()
                .filter(|i| i.kind == kind)
                .map(|i| i.amount)
                .sum()
        };
        let outstanding_receipts = sum(ReconcilingItemKind::OutstandingReceipt);
        let outstanding_payments = sum(ReconcilingItemKind::OutstandingPayment);
        let interest = sum(ReconcilingItemKind::Interest);
        let charges = sum(ReconcilingItemKind::BankCharge);
        let adjustments = sum(ReconcilingItemKind::Adjustment);

        let expected_book_balance = request.statement_balance + outstanding_receipts - outstanding_payments + interest
            - charges
            + adjustments;
        let difference = (expected_book_balance - request.book_balance).abs();

        Self {
            statement_balance: request.statement_balance,
            outstanding_receipts,
            outstanding_payments,
            interest,
            charges,
            adjustments,
            expected_book_balance,
            book_balance: request.book_balance,
            difference,
            balanced: difference < EPSILON,
        }
    }
}
