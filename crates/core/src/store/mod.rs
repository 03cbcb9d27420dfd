//! Repository traits and the unit of work.
//!
//! Every public operation runs inside one [`StoreTx`] obtained from
//! [`Store::begin`]. Writes become visible on [`StoreTx::commit`]; dropping a
//! transaction without committing discards them. `lock_*` methods take a row
//! lock (SQL `SELECT … FOR UPDATE`) that is held until the transaction ends,
//! which serializes concurrent settlement of the same document or movement.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerwise_shared::AppError;
use ledgerwise_shared::types::{
    AccountId, AllocationId, BankAccountId, BankLineId, CompanyId, CounterpartyId, DocumentId, JournalId, PaymentId,
    StockMovementId, VoucherId,
};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::allocation::{Allocation, CashTransaction, Document, DocumentKind, DocumentStatus, PaymentKind};
use crate::audit::AuditEntry;
use crate::company::CompanySettings;
use crate::currency::ExchangeRate;
use crate::journal::Journal;
use crate::landed_cost::{LandedCostBill, LandedCostItem, LandedCostVoucher, StockMovement, VoucherStatus};
use crate::reconcile::{BankLine, CashFilter};
use crate::sequence::{DocumentSequence, DocumentType};

pub use memory::InMemoryStore;

/// Persistence failures.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Backend error.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization failure or lock timeout; the operation may be retried.
    #[error("Concurrent modification detected, please retry")]
    Conflict,

    /// A stored row could not be mapped to a domain value.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) | Self::Corrupt(_) => "DATABASE_ERROR",
            Self::Conflict => "CONCURRENT_MODIFICATION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Database(_) | Self::Corrupt(_) => 500,
            Self::Conflict => 409,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

impl From<crate::ParseEnumError> for StoreError {
    fn from(e: crate::ParseEnumError) -> Self {
        Self::Corrupt(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => AppError::conflict(e.error_code(), e.to_string()),
            StoreError::Database(msg) | StoreError::Corrupt(msg) => AppError::Database(msg),
        }
    }
}

/// Company settings.
#[async_trait]
pub trait CompanyRepository {
    /// Settings for a company.
    async fn company_settings(&mut self, company_id: CompanyId) -> Result<Option<CompanySettings>, StoreError>;
}

/// Chart of accounts.
#[async_trait]
pub trait AccountRepository {
    /// Whether the company has the account.
    async fn account_exists(&mut self, company_id: CompanyId, account_id: AccountId) -> Result<bool, StoreError>;
}

/// Document numbering counters.
#[async_trait]
pub trait SequenceRepository {
    /// Atomically issues the next number for the key, creating the counter
    /// with `prefix` when absent. Returns the issued number and the stored prefix.
    async fn next_sequence_number(
        &mut self,
        company_id: CompanyId,
        document_type: DocumentType,
        fiscal_year: i32,
        prefix: &str,
    ) -> Result<(i64, String), StoreError>;

    /// All counters of a company.
    async fn list_sequences(&mut self, company_id: CompanyId) -> Result<Vec<DocumentSequence>, StoreError>;
}

/// Exchange rate snapshots.
#[async_trait]
pub trait ExchangeRateRepository {
    /// Latest snapshot for the direction dated on or before `as_of`.
    async fn find_rate(
        &mut self,
        company_id: CompanyId,
        from: &str,
        to: &str,
        as_of: NaiveDate,
    ) -> Result<Option<ExchangeRate>, StoreError>;

    /// Inserts or replaces the snapshot for (company, from, to, date).
    async fn upsert_rate(&mut self, rate: &ExchangeRate) -> Result<(), StoreError>;

    /// Snapshots, newest first.
    async fn list_rates(
        &mut self,
        company_id: CompanyId,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<ExchangeRate>, StoreError>;
}

/// Journals and lines.
#[async_trait]
pub trait JournalRepository {
    /// Writes header and lines.
    async fn insert_journal(&mut self, journal: &Journal) -> Result<(), StoreError>;

    /// Header and lines.
    async fn get_journal(&mut self, company_id: CompanyId, journal_id: JournalId) -> Result<Option<Journal>, StoreError>;

    /// Header and lines, row-locked.
    async fn lock_journal(&mut self, company_id: CompanyId, journal_id: JournalId) -> Result<Option<Journal>, StoreError>;

    /// Reversal journal pointing at `journal_id`, if one exists.
    async fn find_reversal(&mut self, company_id: CompanyId, journal_id: JournalId) -> Result<Option<JournalId>, StoreError>;
}

/// Invoices and bills.
#[async_trait]
pub trait DocumentRepository {
    /// A document.
    async fn get_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Option<Document>, StoreError>;

    /// A document, row-locked.
    async fn lock_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Option<Document>, StoreError>;

    /// Writes paid amount and status.
    async fn update_settlement(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
        paid_amount: Decimal,
        status: DocumentStatus,
    ) -> Result<(), StoreError>;

    /// Issued documents with an outstanding balance, oldest due first.
    async fn open_documents(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        counterparty_id: Option<CounterpartyId>,
    ) -> Result<Vec<Document>, StoreError>;
}

/// Receipts and payments.
#[async_trait]
pub trait CashRepository {
    /// A movement.
    async fn get_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Option<CashTransaction>, StoreError>;

    /// A movement, row-locked.
    async fn lock_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Option<CashTransaction>, StoreError>;

    /// Movements matching the filter, newest first.
    async fn list_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        filter: &CashFilter,
    ) -> Result<Vec<CashTransaction>, StoreError>;

    /// Unreconciled movements through a bank account.
    async fn unreconciled_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<CashTransaction>, StoreError>;

    /// Sets the reconciled flag.
    async fn set_reconciled(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
        reconciled: bool,
    ) -> Result<(), StoreError>;
}

/// Payment allocations.
#[async_trait]
pub trait AllocationRepository {
    /// Writes an allocation.
    async fn insert_allocation(&mut self, allocation: &Allocation) -> Result<(), StoreError>;

    /// An allocation.
    async fn get_allocation(
        &mut self,
        company_id: CompanyId,
        allocation_id: AllocationId,
    ) -> Result<Option<Allocation>, StoreError>;

    /// Removes an allocation, returning whether it existed.
    async fn delete_allocation(&mut self, company_id: CompanyId, allocation_id: AllocationId) -> Result<bool, StoreError>;

    /// Σ allocations against a document.
    async fn total_for_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Decimal, StoreError>;

    /// Σ allocations from a movement.
    async fn total_for_payment(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Decimal, StoreError>;

    /// Allocations against a document, oldest first.
    async fn list_for_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Vec<Allocation>, StoreError>;

    /// Most recent allocations of a company.
    async fn recent_allocations(&mut self, company_id: CompanyId, limit: usize) -> Result<Vec<Allocation>, StoreError>;
}

/// Bank statement lines.
#[async_trait]
pub trait BankLineRepository {
    /// A line, row-locked.
    async fn lock_bank_line(&mut self, company_id: CompanyId, line_id: BankLineId) -> Result<Option<BankLine>, StoreError>;

    /// Marks the line matched to a movement.
    async fn mark_bank_line_matched(
        &mut self,
        company_id: CompanyId,
        line_id: BankLineId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<(), StoreError>;
}

/// Landed cost vouchers and the stock they touch.
#[async_trait]
pub trait LandedCostRepository {
    /// A voucher, row-locked.
    async fn lock_voucher(&mut self, company_id: CompanyId, voucher_id: VoucherId) -> Result<Option<LandedCostVoucher>, StoreError>;

    /// Bills attached to the voucher.
    async fn voucher_bills(&mut self, voucher_id: VoucherId) -> Result<Vec<LandedCostBill>, StoreError>;

    /// Items of the voucher.
    async fn voucher_items(&mut self, voucher_id: VoucherId) -> Result<Vec<LandedCostItem>, StoreError>;

    /// Writes computed item figures.
    async fn update_voucher_item(&mut self, item: &LandedCostItem) -> Result<(), StoreError>;

    /// Sets state and posted journal.
    async fn set_voucher_status(
        &mut self,
        company_id: CompanyId,
        voucher_id: VoucherId,
        status: VoucherStatus,
        journal_id: Option<JournalId>,
    ) -> Result<(), StoreError>;

    /// A stock movement, row-locked.
    async fn lock_stock_movement(
        &mut self,
        company_id: CompanyId,
        movement_id: StockMovementId,
    ) -> Result<Option<StockMovement>, StoreError>;

    /// Writes new unit and total cost.
    async fn update_stock_cost(
        &mut self,
        company_id: CompanyId,
        movement_id: StockMovementId,
        unit_cost: Decimal,
        total_cost: Decimal,
    ) -> Result<(), StoreError>;
}

/// Audit trail.
#[async_trait]
pub trait AuditRepository {
    /// Appends an entry.
    async fn record_audit(&mut self, entry: &AuditEntry) -> Result<(), StoreError>;
}

/// One unit of work over every repository.
#[async_trait]
pub trait StoreTx:
    CompanyRepository
    + AccountRepository
    + SequenceRepository
    + ExchangeRateRepository
    + JournalRepository
    + DocumentRepository
    + CashRepository
    + AllocationRepository
    + BankLineRepository
    + LandedCostRepository
    + AuditRepository
    + Send
{
    /// Makes the transaction's writes durable.
    async fn commit(self) -> Result<(), StoreError>;
}

/// Factory for units of work.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Transaction type.
    type Tx: StoreTx + 'static;

    /// Starts a transaction.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}
