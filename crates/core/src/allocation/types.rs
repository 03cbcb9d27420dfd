//! Settlement domain types: documents, cash movements, allocations.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerwise_shared::types::{
    AllocationId, BankAccountId, CompanyId, CounterpartyId, DocumentId, PaymentId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the ledger a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Sales invoice, settled by receipts.
    Invoice,
    /// Purchase bill, settled by payments.
    Bill,
}

string_enum!(DocumentKind {
    Invoice => "invoice",
    Bill => "bill",
});

impl DocumentKind {
    /// Status of an issued, unpaid, not yet due document.
    #[must_use]
    pub const fn open_status(&self) -> DocumentStatus {
        match self {
            Self::Invoice => DocumentStatus::Sent,
            Self::Bill => DocumentStatus::Pending,
        }
    }

    /// Cash movement kind that settles this document kind.
    #[must_use]
    pub const fn settled_by(&self) -> PaymentKind {
        match self {
            Self::Invoice => PaymentKind::Receipt,
            Self::Bill => PaymentKind::Payment,
        }
    }
}

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Money in from a customer.
    Receipt,
    /// Money out to a vendor.
    Payment,
}

string_enum!(PaymentKind {
    Receipt => "receipt",
    Payment => "payment",
});

impl PaymentKind {
    /// Document kind this movement settles.
    #[must_use]
    pub const fn settles(&self) -> DocumentKind {
        match self {
            Self::Receipt => DocumentKind::Invoice,
            Self::Payment => DocumentKind::Bill,
        }
    }
}

/// Lifecycle flag owned by the CRUD layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Not yet issued.
    Draft,
    /// Issued to the counterparty.
    Issued,
    /// Cancelled.
    Void,
}

string_enum!(Lifecycle {
    Draft => "draft",
    Issued => "issued",
    Void => "void",
});

/// Derived settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Draft document.
    Draft,
    /// Issued invoice awaiting payment.
    Sent,
    /// Issued bill awaiting payment.
    Pending,
    /// Part of the total settled.
    PartiallyPaid,
    /// Fully settled.
    Paid,
    /// Unpaid past its due date.
    Overdue,
    /// Cancelled.
    Void,
}

string_enum!(DocumentStatus {
    Draft => "draft",
    Sent => "sent",
    Pending => "pending",
    PartiallyPaid => "partially_paid",
    Paid => "paid",
    Overdue => "overdue",
    Void => "void",
});

/// An invoice or bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub id: DocumentId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Invoice or bill.
    pub kind: DocumentKind,
    /// Document number.
    pub number: String,
    /// Customer or vendor.
    pub counterparty_id: CounterpartyId,
    /// Document currency.
    pub currency: String,
    /// Rate to the base currency.
    pub fx_rate: Decimal,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Total before tax.
    pub subtotal: Decimal,
    /// Tax total.
    pub tax_amount: Decimal,
    /// Grand total.
    pub total: Decimal,
    /// Settled amount, written only by the allocation ledger.
    pub paid_amount: Decimal,
    /// Lifecycle flag.
    pub lifecycle: Lifecycle,
    /// Derived status.
    pub status: DocumentStatus,
}

impl Document {
    /// `total − paid_amount`, never negative.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        (self.total - self.paid_amount).max(Decimal::ZERO)
    }
}

/// A payment (money out) or receipt (money in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashTransaction {
    /// Identifier.
    pub id: PaymentId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Receipt or payment.
    pub kind: PaymentKind,
    /// Number, e.g. `RCPT-2025-00003`.
    pub number: String,
    /// Customer or vendor, when known.
    pub counterparty_id: Option<CounterpartyId>,
    /// Bank account the money moved through.
    pub bank_account_id: Option<BankAccountId>,
    /// Value date.
    pub date: NaiveDate,
    /// Amount, always positive.
    pub amount: Decimal,
    /// Currency.
    pub currency: String,
    /// Rate to the base currency.
    pub fx_rate: Decimal,
    /// Free-form reference (cheque number, remittance text).
    pub reference: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Matched to a bank statement line.
    pub reconciled: bool,
}

/// Link settling part of a document against a cash movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Identifier.
    pub id: AllocationId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Receipt or payment.
    pub payment_kind: PaymentKind,
    /// Cash movement.
    pub payment_id: PaymentId,
    /// Invoice or bill.
    pub document_kind: DocumentKind,
    /// Document.
    pub document_id: DocumentId,
    /// Amount applied, always positive.
    pub amount: Decimal,
    /// Allocation date.
    pub allocation_date: NaiveDate,
    /// Acting user.
    pub created_by: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Request to apply part of a cash movement to a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// Receipt or payment.
    pub payment_kind: PaymentKind,
    /// Cash movement.
    pub payment_id: PaymentId,
    /// Invoice or bill.
    pub document_kind: DocumentKind,
    /// Document.
    pub document_id: DocumentId,
    /// Amount to apply.
    pub amount: Decimal,
    /// Allocation date; defaults to today.
    pub allocation_date: Option<NaiveDate>,
    /// Acting user.
    pub user_id: Option<UserId>,
}

/// Document settlement after a recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Document kind.
    pub document_kind: DocumentKind,
    /// Document.
    pub document_id: DocumentId,
    /// New paid amount.
    pub paid_amount: Decimal,
    /// New status.
    pub status: DocumentStatus,
}
