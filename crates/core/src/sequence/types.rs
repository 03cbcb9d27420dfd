//! Document sequence types.

use ledgerwise_shared::types::CompanyId;
use serde::{Deserialize, Serialize};

/// Kinds of documents that carry a sequence-issued number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Sales invoice.
    Invoice,
    /// Purchase bill.
    Bill,
    /// Sales quote.
    Quote,
    /// Sales order.
    Order,
    /// Outgoing payment.
    Payment,
    /// Incoming receipt.
    Receipt,
    /// Expense claim.
    Expense,
    /// Credit note.
    CreditNote,
    /// Debit note.
    DebitNote,
    /// Journal entry.
    Journal,
}

string_enum!(DocumentType {
    Invoice => "invoice",
    Bill => "bill",
    Quote => "quote",
    Order => "order",
    Payment => "payment",
    Receipt => "receipt",
    Expense => "expense",
    CreditNote => "credit_note",
    DebitNote => "debit_note",
    Journal => "journal",
});

impl DocumentType {
    /// Prefix used when the caller does not supply one.
    #[must_use]
    pub const fn default_prefix(&self) -> &'static str {
        match self {
            Self::Invoice => "INV",
            Self::Bill => "BILL",
            Self::Quote => "QT",
            Self::Order => "SO",
            Self::Payment => "PAY",
            Self::Receipt => "RCPT",
            Self::Expense => "EXP",
            Self::CreditNote => "CN",
            Self::DebitNote => "DN",
            Self::Journal => "JE",
        }
    }
}

/// Counter row for one (company, document type, fiscal year) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSequence {
    /// Owning company.
    pub company_id: CompanyId,
    /// Document type.
    pub document_type: DocumentType,
    /// Fiscal year the counter belongs to.
    pub fiscal_year: i32,
    /// Prefix stored when the counter was created.
    pub prefix: String,
    /// Number the next call will issue.
    pub next_number: i64,
}

/// A freshly issued number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedNumber {
    /// Formatted number, e.g. `INV-2025-00042`.
    pub formatted: String,
    /// Raw counter value.
    pub number: i64,
    /// Fiscal year the number was issued in.
    pub fiscal_year: i32,
}
