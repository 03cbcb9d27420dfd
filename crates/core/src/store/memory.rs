//! In-memory store.
//!
//! A single async mutex guards the whole state. `begin` takes the lock and
//! works on a copy; `commit` writes the copy back. Transactions are therefore
//! fully serialized, which also makes every `lock_*` call trivially correct.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerwise_shared::types::{
    AccountId, AllocationId, BankAccountId, BankLineId, CompanyId, CounterpartyId, DocumentId, JournalId,
    PaymentId, StockMovementId, VoucherId,
};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    AccountRepository, AllocationRepository, AuditRepository, BankLineRepository, CashRepository,
    CompanyRepository, DocumentRepository, ExchangeRateRepository, JournalRepository, LandedCostRepository,
    SequenceRepository, Store, StoreError, StoreTx,
};
use crate::allocation::{Allocation, CashTransaction, Document, DocumentKind, DocumentStatus, Lifecycle, PaymentKind};
use crate::audit::AuditEntry;
use crate::company::CompanySettings;
use crate::currency::ExchangeRate;
use crate::journal::{Journal, SourceType};
use crate::landed_cost::{LandedCostBill, LandedCostItem, LandedCostVoucher, StockMovement, VoucherStatus};
use crate::reconcile::{BankLine, CashFilter};
use crate::sequence::{DocumentSequence, DocumentType};

/// Everything the in-memory store holds.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    /// Company settings.
    pub companies: HashMap<CompanyId, CompanySettings>,
    /// Chart of accounts.
    pub accounts: HashSet<(CompanyId, AccountId)>,
    /// Numbering counters.
    pub sequences: Vec<DocumentSequence>,
    /// Rate snapshots.
    pub rates: Vec<ExchangeRate>,
    /// Journals in insertion order.
    pub journals: Vec<Journal>,
    /// Invoices and bills.
    pub documents: HashMap<DocumentId, Document>,
    /// Receipts and payments.
    pub cash: HashMap<PaymentId, CashTransaction>,
    /// Allocations in insertion order.
    pub allocations: Vec<Allocation>,
    /// Bank statement lines.
    pub bank_lines: HashMap<BankLineId, BankLine>,
    /// Landed cost vouchers.
    pub vouchers: HashMap<VoucherId, LandedCostVoucher>,
    /// Voucher bills.
    pub voucher_bills: Vec<LandedCostBill>,
    /// Voucher items.
    pub voucher_items: Vec<LandedCostItem>,
    /// Stock receipts.
    pub stock_movements: HashMap<StockMovementId, StockMovement>,
    /// Audit trail.
    pub audit_log: Vec<AuditEntry>,
}

impl MemoryState {
    /// Registers a company.
    pub fn add_company(&mut self, settings: CompanySettings) {
        self.companies.insert(settings.company_id, settings);
    }

    /// Registers an account.
    pub fn add_account(&mut self, company_id: CompanyId, account_id: AccountId) {
        self.accounts.insert((company_id, account_id));
    }

    /// Registers a document.
    pub fn add_document(&mut self, document: Document) {
        self.documents.insert(document.id, document);
    }

    /// Registers a receipt or payment.
    pub fn add_cash(&mut self, cash: CashTransaction) {
        self.cash.insert(cash.id, cash);
    }
}

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutates committed state directly, outside any transaction.
    pub async fn seed<F>(&self, f: F)
    where
        F: FnOnce(&mut MemoryState),
    {
        let mut state = self.state.lock().await;
        f(&mut state);
    }

    /// Reads committed state.
    pub async fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&MemoryState) -> T,
    {
        let state = self.state.lock().await;
        f(&state)
    }
}

/// Transaction over an [`InMemoryStore`].
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

#[async_trait]
impl Store for InMemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(MemoryTx { guard, work })
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn commit(self) -> Result<(), StoreError> {
        let Self { mut guard, work } = self;
        *guard = work;
        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for MemoryTx {
    async fn company_settings(&mut self, company_id: CompanyId) -> Result<Option<CompanySettings>, StoreError> {
        Ok(self.work.companies.get(&company_id).cloned())
    }
}

#[async_trait]
impl AccountRepository for MemoryTx {
    async fn account_exists(&mut self, company_id: CompanyId, account_id: AccountId) -> Result<bool, StoreError> {
        Ok(self.work.accounts.contains(&(company_id, account_id)))
    }
}

#[async_trait]
impl SequenceRepository for MemoryTx {
    async fn next_sequence_number(
        &mut self,
        company_id: CompanyId,
        document_type: DocumentType,
        fiscal_year: i32,
        prefix: &str,
    ) -> Result<(i64, String), StoreError> {
        let existing = self.work.sequences.iter_mut().find(|s| {
            s.company_id == company_id && s.document_type == document_type && s.fiscal_year == fiscal_year
        });
        if let Some(seq) = existing {
            let issued = seq.next_number;
            seq.next_number += 1;
            return Ok((issued, seq.prefix.clone()));
        }
        self.work.sequences.push(DocumentSequence {
            company_id,
            document_type,
            fiscal_year,
            prefix: prefix.to_string(),
            next_number: 2,
        });
        Ok((1, prefix.to_string()))
    }

    async fn list_sequences(&mut self, company_id: CompanyId) -> Result<Vec<DocumentSequence>, StoreError> {
        let mut out: Vec<DocumentSequence> = self
            .work
            .sequences
            .iter()
            .filter(|s| s.company_id == company_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.fiscal_year
                .cmp(&a.fiscal_year)
                .then_with(|| a.document_type.as_str().cmp(b.document_type.as_str()))
        });
        Ok(out)
    }
}

#[async_trait]
impl ExchangeRateRepository for MemoryTx {
    async fn find_rate(
        &mut self,
        company_id: CompanyId,
        from: &str,
        to: &str,
        as_of: NaiveDate,
    ) -> Result<Option<ExchangeRate>, StoreError> {
        Ok(self
            .work
            .rates
            .iter()
            .filter(|r| r.company_id == company_id && r.from_currency == from && r.to_currency == to && r.date <= as_of)
            .max_by_key(|r| r.date)
            .cloned())
    }

    async fn upsert_rate(&mut self, rate: &ExchangeRate) -> Result<(), StoreError> {
        self.work.rates.retain(|r| {
            !(r.company_id == rate.company_id
                && r.from_currency == rate.from_currency
                && r.to_currency == rate.to_currency
                && r.date == rate.date)
        });
        self.work.rates.push(rate.clone());
        Ok(())
    }

    async fn list_rates(
        &mut self,
        company_id: CompanyId,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<ExchangeRate>, StoreError> {
        let mut out: Vec<ExchangeRate> = self
            .work
            .rates
            .iter()
            .filter(|r| {
                r.company_id == company_id
                    && from.is_none_or(|f| r.from_currency == f)
                    && to.is_none_or(|t| r.to_currency == t)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(out)
    }
}

#[async_trait]
impl JournalRepository for MemoryTx {
    async fn insert_journal(&mut self, journal: &Journal) -> Result<(), StoreError> {
        self.work.journals.push(journal.clone());
        Ok(())
    }

    async fn get_journal(&mut self, company_id: CompanyId, journal_id: JournalId) -> Result<Option<Journal>, StoreError> {
        Ok(self
            .work
            .journals
            .iter()
            .find(|j| j.company_id == company_id && j.id == journal_id)
            .cloned())
    }

    async fn lock_journal(&mut self, company_id: CompanyId, journal_id: JournalId) -> Result<Option<Journal>, StoreError> {
        self.get_journal(company_id, journal_id).await
    }

    async fn find_reversal(&mut self, company_id: CompanyId, journal_id: JournalId) -> Result<Option<JournalId>, StoreError> {
        Ok(self
            .work
            .journals
            .iter()
            .find(|j| {
                j.company_id == company_id
                    && j.source_type == SourceType::Reversal
                    && j.source_id == Some(journal_id.into_inner())
            })
            .map(|j| j.id))
    }
}

#[async_trait]
impl DocumentRepository for MemoryTx {
    async fn get_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .work
            .documents
            .get(&document_id)
            .filter(|d| d.company_id == company_id && d.kind == kind)
            .cloned())
    }

    async fn lock_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        self.get_document(company_id, kind, document_id).await
    }

    async fn update_settlement(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
        paid_amount: Decimal,
        status: DocumentStatus,
    ) -> Result<(), StoreError> {
        if let Some(doc) = self
            .work
            .documents
            .get_mut(&document_id)
            .filter(|d| d.company_id == company_id && d.kind == kind)
        {
            doc.paid_amount = paid_amount;
            doc.status = status;
        }
        Ok(())
    }

    async fn open_documents(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        counterparty_id: Option<CounterpartyId>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut out: Vec<Document> = self
            .work
            .documents
            .values()
            .filter(|d| {
                d.company_id == company_id
                    && d.kind == kind
                    && d.lifecycle == Lifecycle::Issued
                    && d.paid_amount < d.total
                    && counterparty_id.is_none_or(|c| d.counterparty_id == c)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.number.cmp(&b.number)));
        Ok(out)
    }
}

#[async_trait]
impl CashRepository for MemoryTx {
    async fn get_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Option<CashTransaction>, StoreError> {
        Ok(self
            .work
            .cash
            .get(&payment_id)
            .filter(|c| c.company_id == company_id && c.kind == kind)
            .cloned())
    }

    async fn lock_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Option<CashTransaction>, StoreError> {
        self.get_cash(company_id, kind, payment_id).await
    }

    async fn list_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        filter: &CashFilter,
    ) -> Result<Vec<CashTransaction>, StoreError> {
        let mut out: Vec<CashTransaction> = self
            .work
            .cash
            .values()
            .filter(|c| {
                c.company_id == company_id
                    && c.kind == kind
                    && filter.from.is_none_or(|d| c.date >= d)
                    && filter.to.is_none_or(|d| c.date <= d)
                    && filter.counterparty_id.is_none_or(|cp| c.counterparty_id == Some(cp))
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.number.cmp(&a.number)));
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    async fn unreconciled_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<CashTransaction>, StoreError> {
        let mut out: Vec<CashTransaction> = self
            .work
            .cash
            .values()
            .filter(|c| {
                c.company_id == company_id
                    && c.kind == kind
                    && !c.reconciled
                    && c.bank_account_id == Some(bank_account_id)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.number.cmp(&a.number)));
        Ok(out)
    }

    async fn set_reconciled(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
        reconciled: bool,
    ) -> Result<(), StoreError> {
        if let Some(cash) = self
            .work
            .cash
            .get_mut(&payment_id)
            .filter(|c| c.company_id == company_id && c.kind == kind)
        {
            cash.reconciled = reconciled;
        }
        Ok(())
    }
}

#[async_trait]
impl AllocationRepository for MemoryTx {
    async fn insert_allocation(&mut self, allocation: &Allocation) -> Result<(), StoreError> {
        self.work.allocations.push(allocation.clone());
        Ok(())
    }

    async fn get_allocation(
        &mut self,
        company_id: CompanyId,
        allocation_id: AllocationId,
    ) -> Result<Option<Allocation>, StoreError> {
        Ok(self
            .work
            .allocations
            .iter()
            .find(|a| a.company_id == company_id && a.id == allocation_id)
            .cloned())
    }

    async fn delete_allocation(&mut self, company_id: CompanyId, allocation_id: AllocationId) -> Result<bool, StoreError> {
        let before = self.work.allocations.len();
        self.work
            .allocations
            .retain(|a| !(a.company_id == company_id && a.id == allocation_id));
        Ok(self.work.allocations.len() != before)
    }

    async fn total_for_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Decimal, StoreError> {
        Ok(self
            .work
            .allocations
            .iter()
            .filter(|a| a.company_id == company_id && a.document_kind == kind && a.document_id == document_id)
            .map(|a| a.amount)
            .sum())
    }

    async fn total_for_payment(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Decimal, StoreError> {
        Ok(self
            .work
            .allocations
            .iter()
            .filter(|a| a.company_id == company_id && a.payment_kind == kind && a.payment_id == payment_id)
            .map(|a| a.amount)
            .sum())
    }

    async fn list_for_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Vec<Allocation>, StoreError> {
        Ok(self
            .work
            .allocations
            .iter()
            .filter(|a| a.company_id == company_id && a.document_kind == kind && a.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn recent_allocations(&mut self, company_id: CompanyId, limit: usize) -> Result<Vec<Allocation>, StoreError> {
        Ok(self
            .work
            .allocations
            .iter()
            .rev()
            .filter(|a| a.company_id == company_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BankLineRepository for MemoryTx {
    async fn lock_bank_line(&mut self, company_id: CompanyId, line_id: BankLineId) -> Result<Option<BankLine>, StoreError> {
        Ok(self
            .work
            .bank_lines
            .get(&line_id)
            .filter(|l| l.company_id == company_id)
            .cloned())
    }

    async fn mark_bank_line_matched(
        &mut self,
        company_id: CompanyId,
        line_id: BankLineId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<(), StoreError> {
        if let Some(line) = self
            .work
            .bank_lines
            .get_mut(&line_id)
            .filter(|l| l.company_id == company_id)
        {
            line.matched = true;
            line.matched_kind = Some(kind);
            line.matched_payment_id = Some(payment_id);
        }
        Ok(())
    }
}

#[async_trait]
impl LandedCostRepository for MemoryTx {
    async fn lock_voucher(&mut self, company_id: CompanyId, voucher_id: VoucherId) -> Result<Option<LandedCostVoucher>, StoreError> {
        Ok(self
            .work
            .vouchers
            .get(&voucher_id)
            .filter(|v| v.company_id == company_id)
            .cloned())
    }

    async fn voucher_bills(&mut self, voucher_id: VoucherId) -> Result<Vec<LandedCostBill>, StoreError> {
        Ok(self
            .work
            .voucher_bills
            .iter()
            .filter(|b| b.voucher_id == voucher_id)
            .cloned()
            .collect())
    }

    async fn voucher_items(&mut self, voucher_id: VoucherId) -> Result<Vec<LandedCostItem>, StoreError> {
        Ok(self
            .work
            .voucher_items
            .iter()
            .filter(|i| i.voucher_id == voucher_id)
            .cloned()
            .collect())
    }

    async fn update_voucher_item(&mut self, item: &LandedCostItem) -> Result<(), StoreError> {
        if let Some(existing) = self.work.voucher_items.iter_mut().find(|i| i.id == item.id) {
            *existing = item.clone();
        }
        Ok(())
    }

    async fn set_voucher_status(
        &mut self,
        company_id: CompanyId,
        voucher_id: VoucherId,
        status: VoucherStatus,
        journal_id: Option<JournalId>,
    ) -> Result<(), StoreError> {
        if let Some(voucher) = self
            .work
            .vouchers
            .get_mut(&voucher_id)
            .filter(|v| v.company_id == company_id)
        {
            voucher.status = status;
            voucher.journal_id = journal_id;
        }
        Ok(())
    }

    async fn lock_stock_movement(
        &mut self,
        company_id: CompanyId,
        movement_id: StockMovementId,
    ) -> Result<Option<StockMovement>, StoreError> {
        Ok(self
            .work
            .stock_movements
            .get(&movement_id)
            .filter(|m| m.company_id == company_id)
            .cloned())
    }

    async fn update_stock_cost(
        &mut self,
        company_id: CompanyId,
        movement_id: StockMovementId,
        unit_cost: Decimal,
        total_cost: Decimal,
    ) -> Result<(), StoreError> {
        if let Some(movement) = self
            .work
            .stock_movements
            .get_mut(&movement_id)
            .filter(|m| m.company_id == company_id)
        {
            movement.unit_cost = unit_cost;
            movement.total_cost = total_cost;
        }
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for MemoryTx {
    async fn record_audit(&mut self, entry: &AuditEntry) -> Result<(), StoreError> {
        self.work.audit_log.push(entry.clone());
        Ok(())
    }
}

/// Seeds a USD company with a January fiscal year and no default accounts.
#[cfg(test)]
pub(crate) async fn test_company(store: &InMemoryStore) -> CompanyId {
    let company_id = CompanyId::new();
    store
        .seed(|s| {
            s.add_company(CompanySettings {
                company_id,
                base_currency: "USD".to_string(),
                fiscal_year_start_month: 1,
                accounts: crate::company::DefaultAccounts::default(),
            });
        })
        .await;
    company_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = InMemoryStore::new();
        let company = test_company(&store).await;
        let account = AccountId::new();

        let mut tx = store.begin().await.unwrap();
        tx.work.add_account(company, account);
        tx.commit().await.unwrap();

        assert!(store.read(|s| s.accounts.contains(&(company, account))).await);
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let store = InMemoryStore::new();
        let company = test_company(&store).await;
        let account = AccountId::new();

        {
            let mut tx = store.begin().await.unwrap();
            tx.work.add_account(company, account);
            assert!(tx.account_exists(company, account).await.unwrap());
        }

        assert!(!store.read(|s| s.accounts.contains(&(company, account))).await);
    }
}
