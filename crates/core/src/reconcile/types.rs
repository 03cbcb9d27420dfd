//! Reconciliation types.

use chrono::NaiveDate;
use ledgerwise_shared::types::{BankAccountId, BankLineId, CompanyId, CounterpartyId, DocumentId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::{DocumentKind, PaymentKind};

/// One imported bank statement transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankLine {
    /// Identifier.
    pub id: BankLineId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Statement account.
    pub bank_account_id: BankAccountId,
    /// Booking date.
    pub date: NaiveDate,
    /// Signed amount; positive is money in.
    pub amount: Decimal,
    /// Statement text.
    pub description: String,
    /// Bank reference.
    pub reference: Option<String>,
    /// Matched to a cash movement.
    pub matched: bool,
    /// Kind of the matched movement.
    pub matched_kind: Option<PaymentKind>,
    /// Matched movement.
    pub matched_payment_id: Option<PaymentId>,
}

/// How sure the matcher is about a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Weak evidence.
    Low,
    /// Exact amount or close date.
    Medium,
    /// Exact amount and close date.
    High,
}

/// A scored document candidate for a receipt or payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCandidate {
    /// Invoice or bill.
    pub document_kind: DocumentKind,
    /// Document.
    pub document_id: DocumentId,
    /// Document number.
    pub number: String,
    /// Counterparty.
    pub counterparty_id: CounterpartyId,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Document total.
    pub total: Decimal,
    /// Amount still open.
    pub outstanding: Decimal,
    /// Document currency.
    pub currency: String,
    /// Currency differs from the payment's.
    pub currency_mismatch: bool,
    /// Amount factor.
    pub amount_score: u32,
    /// Date factor.
    pub date_score: u32,
    /// Reference text factor.
    pub text_score: u32,
    /// Sum of the factors.
    pub score: u32,
    /// Days between the payment date and the document issue date.
    pub days_apart: i64,
    /// Outstanding equals remaining within tolerance.
    pub exact_amount: bool,
    /// Confidence band.
    pub confidence: Confidence,
}

/// Suggestions for one receipt or payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSuggestions {
    /// Receipt or payment.
    pub payment_kind: PaymentKind,
    /// Movement.
    pub payment_id: PaymentId,
    /// Movement number.
    pub number: String,
    /// Value date.
    pub date: NaiveDate,
    /// Movement amount.
    pub amount: Decimal,
    /// Amount not yet allocated.
    pub unallocated: Decimal,
    /// Currency.
    pub currency: String,
    /// Ranked candidates.
    pub candidates: Vec<DocumentCandidate>,
}

/// A scored cash movement candidate for a bank line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashCandidate {
    /// Receipt or payment.
    pub payment_kind: PaymentKind,
    /// Movement.
    pub payment_id: PaymentId,
    /// Movement number.
    pub number: String,
    /// Value date.
    pub date: NaiveDate,
    /// Movement amount.
    pub amount: Decimal,
    /// Amount factor.
    pub amount_score: u32,
    /// Date factor.
    pub date_score: u32,
    /// Reference text factor.
    pub text_score: u32,
    /// Sum of the factors.
    pub score: u32,
    /// Days between the line and the movement.
    pub days_apart: i64,
    /// Amounts equal within tolerance.
    pub exact_amount: bool,
    /// Confidence band.
    pub confidence: Confidence,
}

/// Which movements a suggestion or auto-match run covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSide {
    /// Receipts against invoices.
    Receipts,
    /// Payments against bills.
    Payments,
    /// Both.
    #[default]
    Both,
}

impl MatchSide {
    /// Movement kinds covered, receipts first.
    #[must_use]
    pub fn kinds(&self) -> &'static [PaymentKind] {
        match self {
            Self::Receipts => &[PaymentKind::Receipt],
            Self::Payments => &[PaymentKind::Payment],
            Self::Both => &[PaymentKind::Receipt, PaymentKind::Payment],
        }
    }
}

/// Filter for listing cash movements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFilter {
    /// Earliest value date.
    pub from: Option<NaiveDate>,
    /// Latest value date.
    pub to: Option<NaiveDate>,
    /// Counterparty.
    pub counterparty_id: Option<CounterpartyId>,
    /// Most recent first, at most this many.
    pub limit: Option<usize>,
}
