//! PostgreSQL implementation of the core repository traits.
//!
//! One [`SeaOrmTx`] wraps one database transaction. `lock_*` methods issue
//! `SELECT … FOR UPDATE`; the sequencer relies on an upsert so concurrent
//! callers never observe the same number.

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerwise_core::allocation::{
    Allocation, CashTransaction, Document, DocumentKind, DocumentStatus, Lifecycle, PaymentKind,
};
use ledgerwise_core::audit::AuditEntry;
use ledgerwise_core::company::CompanySettings;
use ledgerwise_core::currency::ExchangeRate;
use ledgerwise_core::journal::{Journal, SourceType};
use ledgerwise_core::landed_cost::{LandedCostBill, LandedCostItem, LandedCostVoucher, StockMovement, VoucherStatus};
use ledgerwise_core::reconcile::{BankLine, CashFilter};
use ledgerwise_core::sequence::{DocumentSequence, DocumentType};
use ledgerwise_core::store::{
    AccountRepository, AllocationRepository, AuditRepository, BankLineRepository, CashRepository, CompanyRepository,
    DocumentRepository, ExchangeRateRepository, JournalRepository, LandedCostRepository, SequenceRepository, Store,
    StoreError, StoreTx,
};
use ledgerwise_shared::types::{
    AccountId, AllocationId, BankAccountId, BankLineId, CompanyId, CounterpartyId, DocumentId, JournalId, PaymentId,
    StockMovementId, VoucherId,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::convert::{audit_active, db_err};
use crate::entities::{
    accounts, bank_statement_lines, cash_transactions, companies, document_sequences, documents, exchange_rates,
    journal_lines, journals, landed_cost_bills, landed_cost_items, landed_cost_vouchers, payment_allocations,
    stock_movements,
};

const NEXT_SEQUENCE_SQL: &str = r"
INSERT INTO document_sequences (id, company_id, document_type, fiscal_year, prefix, next_number)
VALUES ($1, $2, $3, $4, $5, 2)
ON CONFLICT (company_id, document_type, fiscal_year)
DO UPDATE SET next_number = document_sequences.next_number + 1, updated_at = now()
RETURNING next_number - 1 AS issued, prefix
";

/// Store backed by a pooled PostgreSQL connection.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    /// Wraps an established connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection, for migrations.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// One database transaction.
pub struct SeaOrmTx {
    txn: DatabaseTransaction,
}

#[async_trait]
impl Store for SeaOrmStore {
    type Tx = SeaOrmTx;

    async fn begin(&self) -> Result<SeaOrmTx, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Ok(SeaOrmTx { txn })
    }
}

#[async_trait]
impl StoreTx for SeaOrmTx {
    async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(db_err)
    }
}

fn document_query(company_id: CompanyId, kind: DocumentKind, document_id: DocumentId) -> Select<documents::Entity> {
    documents::Entity::find()
        .filter(documents::Column::Id.eq(document_id.into_inner()))
        .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
        .filter(documents::Column::Kind.eq(kind.as_str()))
}

fn cash_query(company_id: CompanyId, kind: PaymentKind, payment_id: PaymentId) -> Select<cash_transactions::Entity> {
    cash_transactions::Entity::find()
        .filter(cash_transactions::Column::Id.eq(payment_id.into_inner()))
        .filter(cash_transactions::Column::CompanyId.eq(company_id.into_inner()))
        .filter(cash_transactions::Column::Kind.eq(kind.as_str()))
}

fn collect<M, T>(rows: Vec<M>, f: impl Fn(M) -> Result<T, StoreError>) -> Result<Vec<T>, StoreError> {
    rows.into_iter().map(f).collect()
}

impl SeaOrmTx {
    async fn load_journal(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
        lock: bool,
    ) -> Result<Option<Journal>, StoreError> {
        let mut query = journals::Entity::find()
            .filter(journals::Column::Id.eq(journal_id.into_inner()))
            .filter(journals::Column::CompanyId.eq(company_id.into_inner()));
        if lock {
            query = query.lock_exclusive();
        }
        let Some(header) = query.one(&self.txn).await.map_err(db_err)? else {
            return Ok(None);
        };
        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalId.eq(header.id))
            .order_by_asc(journal_lines::Column::LineNumber)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        header.into_domain(lines).map(Some)
    }

    async fn allocation_sum(&self, condition: sea_orm::Condition) -> Result<Decimal, StoreError> {
        let total: Option<Option<Decimal>> = payment_allocations::Entity::find()
            .select_only()
            .column_as(payment_allocations::Column::AllocatedAmount.sum(), "total")
            .filter(condition)
            .into_tuple()
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }
}

#[async_trait]
impl CompanyRepository for SeaOrmTx {
    async fn company_settings(&mut self, company_id: CompanyId) -> Result<Option<CompanySettings>, StoreError> {
        let row = companies::Entity::find_by_id(company_id.into_inner())
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(row.map(companies::Model::into_settings))
    }
}

#[async_trait]
impl AccountRepository for SeaOrmTx {
    async fn account_exists(&mut self, company_id: CompanyId, account_id: AccountId) -> Result<bool, StoreError> {
        let row = accounts::Entity::find()
            .filter(accounts::Column::Id.eq(account_id.into_inner()))
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl SequenceRepository for SeaOrmTx {
    async fn next_sequence_number(
        &mut self,
        company_id: CompanyId,
        document_type: DocumentType,
        fiscal_year: i32,
        prefix: &str,
    ) -> Result<(i64, String), StoreError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            NEXT_SEQUENCE_SQL,
            [
                Uuid::now_v7().into(),
                company_id.into_inner().into(),
                document_type.as_str().into(),
                fiscal_year.into(),
                prefix.into(),
            ],
        );
        let row = self
            .txn
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::Database("sequence upsert returned no row".to_string()))?;
        let issued: i64 = row.try_get("", "issued").map_err(db_err)?;
        let stored_prefix: String = row.try_get("", "prefix").map_err(db_err)?;
        Ok((issued, stored_prefix))
    }

    async fn list_sequences(&mut self, company_id: CompanyId) -> Result<Vec<DocumentSequence>, StoreError> {
        let rows = document_sequences::Entity::find()
            .filter(document_sequences::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_desc(document_sequences::Column::FiscalYear)
            .order_by_asc(document_sequences::Column::DocumentType)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        collect(rows, document_sequences::Model::into_domain)
    }
}

#[async_trait]
impl ExchangeRateRepository for SeaOrmTx {
    async fn find_rate(
        &mut self,
        company_id: CompanyId,
        from: &str,
        to: &str,
        as_of: NaiveDate,
    ) -> Result<Option<ExchangeRate>, StoreError> {
        let row = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::CompanyId.eq(company_id.into_inner()))
            .filter(exchange_rates::Column::FromCurrency.eq(from))
            .filter(exchange_rates::Column::ToCurrency.eq(to))
            .filter(exchange_rates::Column::Date.lte(as_of))
            .order_by_desc(exchange_rates::Column::Date)
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(row.map(exchange_rates::Model::into_domain))
    }

    async fn upsert_rate(&mut self, rate: &ExchangeRate) -> Result<(), StoreError> {
        let model = exchange_rates::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(rate.company_id.into_inner()),
            from_currency: Set(rate.from_currency.clone()),
            to_currency: Set(rate.to_currency.clone()),
            rate: Set(rate.rate),
            date: Set(rate.date),
            ..Default::default()
        };
        exchange_rates::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    exchange_rates::Column::CompanyId,
                    exchange_rates::Column::FromCurrency,
                    exchange_rates::Column::ToCurrency,
                    exchange_rates::Column::Date,
                ])
                .update_column(exchange_rates::Column::Rate)
                .to_owned(),
            )
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_rates(
        &mut self,
        company_id: CompanyId,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<ExchangeRate>, StoreError> {
        let rows = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::CompanyId.eq(company_id.into_inner()))
            .apply_if(from, |q, v| q.filter(exchange_rates::Column::FromCurrency.eq(v)))
            .apply_if(to, |q, v| q.filter(exchange_rates::Column::ToCurrency.eq(v)))
            .order_by_desc(exchange_rates::Column::Date)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(exchange_rates::Model::into_domain).collect())
    }
}

#[async_trait]
impl JournalRepository for SeaOrmTx {
    async fn insert_journal(&mut self, journal: &Journal) -> Result<(), StoreError> {
        let header = journals::ActiveModel {
            id: Set(journal.id.into_inner()),
            company_id: Set(journal.company_id.into_inner()),
            number: Set(journal.number.clone()),
            date: Set(journal.date),
            source_type: Set(journal.source_type.as_str().to_string()),
            source_id: Set(journal.source_id),
            description: Set(journal.description.clone()),
            currency: Set(journal.currency.clone()),
            fx_rate: Set(journal.fx_rate),
            total_amount: Set(journal.total_amount),
            created_by: Set(journal.created_by.map(|u| u.into_inner())),
            created_at: Set(journal.created_at.into()),
        };
        journals::Entity::insert(header)
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_err)?;

        let lines: Vec<journal_lines::ActiveModel> = journal
            .lines
            .iter()
            .map(|line| journal_lines::ActiveModel {
                id: Set(line.id.into_inner()),
                journal_id: Set(line.journal_id.into_inner()),
                line_number: Set(line.line_number),
                account_id: Set(line.account_id.into_inner()),
                description: Set(line.description.clone()),
                debit: Set(line.debit),
                credit: Set(line.credit),
                currency: Set(line.currency.clone()),
                fx_rate: Set(line.fx_rate),
                base_debit: Set(line.base_debit),
                base_credit: Set(line.base_credit),
            })
            .collect();
        if !lines.is_empty() {
            journal_lines::Entity::insert_many(lines)
                .exec_without_returning(&self.txn)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }

    async fn get_journal(&mut self, company_id: CompanyId, journal_id: JournalId) -> Result<Option<Journal>, StoreError> {
        self.load_journal(company_id, journal_id, false).await
    }

    async fn lock_journal(&mut self, company_id: CompanyId, journal_id: JournalId) -> Result<Option<Journal>, StoreError> {
        self.load_journal(company_id, journal_id, true).await
    }

    async fn find_reversal(&mut self, company_id: CompanyId, journal_id: JournalId) -> Result<Option<JournalId>, StoreError> {
        let id: Option<Uuid> = journals::Entity::find()
            .select_only()
            .column(journals::Column::Id)
            .filter(journals::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journals::Column::SourceType.eq(SourceType::Reversal.as_str()))
            .filter(journals::Column::SourceId.eq(journal_id.into_inner()))
            .into_tuple()
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(id.map(JournalId::from_uuid))
    }
}

#[async_trait]
impl DocumentRepository for SeaOrmTx {
    async fn get_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        document_query(company_id, kind, document_id)
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(documents::Model::into_domain)
            .transpose()
    }

    async fn lock_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        document_query(company_id, kind, document_id)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(documents::Model::into_domain)
            .transpose()
    }

    async fn update_settlement(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
        paid_amount: Decimal,
        status: DocumentStatus,
    ) -> Result<(), StoreError> {
        documents::Entity::update_many()
            .col_expr(documents::Column::PaidAmount, Expr::value(paid_amount))
            .col_expr(documents::Column::Status, Expr::value(status.as_str()))
            .col_expr(documents::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(documents::Column::Id.eq(document_id.into_inner()))
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .filter(documents::Column::Kind.eq(kind.as_str()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn open_documents(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        counterparty_id: Option<CounterpartyId>,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = documents::Entity::find()
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .filter(documents::Column::Kind.eq(kind.as_str()))
            .filter(documents::Column::Lifecycle.eq(Lifecycle::Issued.as_str()))
            .filter(Expr::col(documents::Column::PaidAmount).lt(Expr::col(documents::Column::Total)))
            .apply_if(counterparty_id, |q, c| {
                q.filter(documents::Column::CounterpartyId.eq(c.into_inner()))
            })
            .order_by_asc(documents::Column::DueDate)
            .order_by_asc(documents::Column::Number)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        collect(rows, documents::Model::into_domain)
    }
}

#[async_trait]
impl CashRepository for SeaOrmTx {
    async fn get_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Option<CashTransaction>, StoreError> {
        cash_query(company_id, kind, payment_id)
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(cash_transactions::Model::into_domain)
            .transpose()
    }

    async fn lock_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Option<CashTransaction>, StoreError> {
        cash_query(company_id, kind, payment_id)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(cash_transactions::Model::into_domain)
            .transpose()
    }

    async fn list_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        filter: &CashFilter,
    ) -> Result<Vec<CashTransaction>, StoreError> {
        let rows = cash_transactions::Entity::find()
            .filter(cash_transactions::Column::CompanyId.eq(company_id.into_inner()))
            .filter(cash_transactions::Column::Kind.eq(kind.as_str()))
            .apply_if(filter.from, |q, d| q.filter(cash_transactions::Column::Date.gte(d)))
            .apply_if(filter.to, |q, d| q.filter(cash_transactions::Column::Date.lte(d)))
            .apply_if(filter.counterparty_id, |q, c| {
                q.filter(cash_transactions::Column::CounterpartyId.eq(c.into_inner()))
            })
            .order_by_desc(cash_transactions::Column::Date)
            .order_by_desc(cash_transactions::Column::Number)
            .apply_if(filter.limit, |q, n| q.limit(n as u64))
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        collect(rows, cash_transactions::Model::into_domain)
    }

    async fn unreconciled_cash(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<CashTransaction>, StoreError> {
        let rows = cash_transactions::Entity::find()
            .filter(cash_transactions::Column::CompanyId.eq(company_id.into_inner()))
            .filter(cash_transactions::Column::Kind.eq(kind.as_str()))
            .filter(cash_transactions::Column::BankAccountId.eq(bank_account_id.into_inner()))
            .filter(cash_transactions::Column::Reconciled.eq(false))
            .order_by_desc(cash_transactions::Column::Date)
            .order_by_desc(cash_transactions::Column::Number)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        collect(rows, cash_transactions::Model::into_domain)
    }

    async fn set_reconciled(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
        reconciled: bool,
    ) -> Result<(), StoreError> {
        cash_transactions::Entity::update_many()
            .col_expr(cash_transactions::Column::Reconciled, Expr::value(reconciled))
            .filter(cash_transactions::Column::Id.eq(payment_id.into_inner()))
            .filter(cash_transactions::Column::CompanyId.eq(company_id.into_inner()))
            .filter(cash_transactions::Column::Kind.eq(kind.as_str()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl AllocationRepository for SeaOrmTx {
    async fn insert_allocation(&mut self, allocation: &Allocation) -> Result<(), StoreError> {
        let model = payment_allocations::ActiveModel {
            id: Set(allocation.id.into_inner()),
            company_id: Set(allocation.company_id.into_inner()),
            payment_type: Set(allocation.payment_kind.as_str().to_string()),
            payment_id: Set(allocation.payment_id.into_inner()),
            document_type: Set(allocation.document_kind.as_str().to_string()),
            document_id: Set(allocation.document_id.into_inner()),
            allocated_amount: Set(allocation.amount),
            allocation_date: Set(allocation.allocation_date),
            created_by: Set(allocation.created_by.map(|u| u.into_inner())),
            created_at: Set(allocation.created_at.into()),
        };
        payment_allocations::Entity::insert(model)
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_allocation(
        &mut self,
        company_id: CompanyId,
        allocation_id: AllocationId,
    ) -> Result<Option<Allocation>, StoreError> {
        payment_allocations::Entity::find()
            .filter(payment_allocations::Column::Id.eq(allocation_id.into_inner()))
            .filter(payment_allocations::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(payment_allocations::Model::into_domain)
            .transpose()
    }

    async fn delete_allocation(&mut self, company_id: CompanyId, allocation_id: AllocationId) -> Result<bool, StoreError> {
        let result = payment_allocations::Entity::delete_many()
            .filter(payment_allocations::Column::Id.eq(allocation_id.into_inner()))
            .filter(payment_allocations::Column::CompanyId.eq(company_id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn total_for_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Decimal, StoreError> {
        self.allocation_sum(
            sea_orm::Condition::all()
                .add(payment_allocations::Column::CompanyId.eq(company_id.into_inner()))
                .add(payment_allocations::Column::DocumentType.eq(kind.as_str()))
                .add(payment_allocations::Column::DocumentId.eq(document_id.into_inner())),
        )
        .await
    }

    async fn total_for_payment(
        &mut self,
        company_id: CompanyId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<Decimal, StoreError> {
        self.allocation_sum(
            sea_orm::Condition::all()
                .add(payment_allocations::Column::CompanyId.eq(company_id.into_inner()))
                .add(payment_allocations::Column::PaymentType.eq(kind.as_str()))
                .add(payment_allocations::Column::PaymentId.eq(payment_id.into_inner())),
        )
        .await
    }

    async fn list_for_document(
        &mut self,
        company_id: CompanyId,
        kind: DocumentKind,
        document_id: DocumentId,
    ) -> Result<Vec<Allocation>, StoreError> {
        let rows = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::CompanyId.eq(company_id.into_inner()))
            .filter(payment_allocations::Column::DocumentType.eq(kind.as_str()))
            .filter(payment_allocations::Column::DocumentId.eq(document_id.into_inner()))
            .order_by_asc(payment_allocations::Column::CreatedAt)
            .order_by_asc(payment_allocations::Column::Id)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        collect(rows, payment_allocations::Model::into_domain)
    }

    async fn recent_allocations(&mut self, company_id: CompanyId, limit: usize) -> Result<Vec<Allocation>, StoreError> {
        let rows = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_desc(payment_allocations::Column::CreatedAt)
            .order_by_desc(payment_allocations::Column::Id)
            .limit(limit as u64)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        collect(rows, payment_allocations::Model::into_domain)
    }
}

#[async_trait]
impl BankLineRepository for SeaOrmTx {
    async fn lock_bank_line(&mut self, company_id: CompanyId, line_id: BankLineId) -> Result<Option<BankLine>, StoreError> {
        bank_statement_lines::Entity::find()
            .filter(bank_statement_lines::Column::Id.eq(line_id.into_inner()))
            .filter(bank_statement_lines::Column::CompanyId.eq(company_id.into_inner()))
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(bank_statement_lines::Model::into_domain)
            .transpose()
    }

    async fn mark_bank_line_matched(
        &mut self,
        company_id: CompanyId,
        line_id: BankLineId,
        kind: PaymentKind,
        payment_id: PaymentId,
    ) -> Result<(), StoreError> {
        bank_statement_lines::Entity::update_many()
            .col_expr(bank_statement_lines::Column::Matched, Expr::value(true))
            .col_expr(bank_statement_lines::Column::MatchedKind, Expr::value(kind.as_str()))
            .col_expr(bank_statement_lines::Column::MatchedPaymentId, Expr::value(payment_id.into_inner()))
            .filter(bank_statement_lines::Column::Id.eq(line_id.into_inner()))
            .filter(bank_statement_lines::Column::CompanyId.eq(company_id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl LandedCostRepository for SeaOrmTx {
    async fn lock_voucher(&mut self, company_id: CompanyId, voucher_id: VoucherId) -> Result<Option<LandedCostVoucher>, StoreError> {
        landed_cost_vouchers::Entity::find()
            .filter(landed_cost_vouchers::Column::Id.eq(voucher_id.into_inner()))
            .filter(landed_cost_vouchers::Column::CompanyId.eq(company_id.into_inner()))
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(landed_cost_vouchers::Model::into_domain)
            .transpose()
    }

    async fn voucher_bills(&mut self, voucher_id: VoucherId) -> Result<Vec<LandedCostBill>, StoreError> {
        let rows = landed_cost_bills::Entity::find()
            .filter(landed_cost_bills::Column::VoucherId.eq(voucher_id.into_inner()))
            .order_by_asc(landed_cost_bills::Column::CreatedAt)
            .order_by_asc(landed_cost_bills::Column::Id)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(landed_cost_bills::Model::into_domain).collect())
    }

    async fn voucher_items(&mut self, voucher_id: VoucherId) -> Result<Vec<LandedCostItem>, StoreError> {
        let rows = landed_cost_items::Entity::find()
            .filter(landed_cost_items::Column::VoucherId.eq(voucher_id.into_inner()))
            .order_by_asc(landed_cost_items::Column::CreatedAt)
            .order_by_asc(landed_cost_items::Column::Id)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(landed_cost_items::Model::into_domain).collect())
    }

    async fn update_voucher_item(&mut self, item: &LandedCostItem) -> Result<(), StoreError> {
        landed_cost_items::Entity::update_many()
            .col_expr(landed_cost_items::Column::AllocatedCost, Expr::value(item.allocated_cost))
            .col_expr(landed_cost_items::Column::NewUnitCost, Expr::value(item.new_unit_cost))
            .filter(landed_cost_items::Column::Id.eq(item.id))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_voucher_status(
        &mut self,
        company_id: CompanyId,
        voucher_id: VoucherId,
        status: VoucherStatus,
        journal_id: Option<JournalId>,
    ) -> Result<(), StoreError> {
        landed_cost_vouchers::Entity::update_many()
            .col_expr(landed_cost_vouchers::Column::Status, Expr::value(status.as_str()))
            .col_expr(
                landed_cost_vouchers::Column::JournalId,
                Expr::value(journal_id.map(JournalId::into_inner)),
            )
            .filter(landed_cost_vouchers::Column::Id.eq(voucher_id.into_inner()))
            .filter(landed_cost_vouchers::Column::CompanyId.eq(company_id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn lock_stock_movement(
        &mut self,
        company_id: CompanyId,
        movement_id: StockMovementId,
    ) -> Result<Option<StockMovement>, StoreError> {
        let row = stock_movements::Entity::find()
            .filter(stock_movements::Column::Id.eq(movement_id.into_inner()))
            .filter(stock_movements::Column::CompanyId.eq(company_id.into_inner()))
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(row.map(stock_movements::Model::into_domain))
    }

    async fn update_stock_cost(
        &mut self,
        company_id: CompanyId,
        movement_id: StockMovementId,
        unit_cost: Decimal,
        total_cost: Decimal,
    ) -> Result<(), StoreError> {
        stock_movements::Entity::update_many()
            .col_expr(stock_movements::Column::UnitCost, Expr::value(unit_cost))
            .col_expr(stock_movements::Column::TotalCost, Expr::value(total_cost))
            .filter(stock_movements::Column::Id.eq(movement_id.into_inner()))
            .filter(stock_movements::Column::CompanyId.eq(company_id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for SeaOrmTx {
    async fn record_audit(&mut self, entry: &AuditEntry) -> Result<(), StoreError> {
        audit_active(entry).insert(&self.txn).await.map_err(db_err)?;
        Ok(())
    }
}

