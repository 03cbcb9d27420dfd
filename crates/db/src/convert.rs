//! Row to domain conversions.
//!
//! Enum columns are stored by name; a value the core does not recognise is
//! reported as [`StoreError::Corrupt`].

use chrono::Utc;
use ledgerwise_core::allocation::{Allocation, CashTransaction, Document};
use ledgerwise_core::audit::AuditEntry;
use ledgerwise_core::company::{CompanySettings, DefaultAccounts};
use ledgerwise_core::currency::ExchangeRate;
use ledgerwise_core::journal::{Journal, JournalLine};
use ledgerwise_core::landed_cost::{LandedCostBill, LandedCostItem, LandedCostVoucher, StockMovement};
use ledgerwise_core::reconcile::BankLine;
use ledgerwise_core::sequence::DocumentSequence;
use ledgerwise_core::store::StoreError;
use sea_orm::{DbErr, Set, SqlErr};

use crate::entities::{
    audit_logs, bank_statement_lines, cash_transactions, companies, document_sequences, documents, exchange_rates,
    journal_lines, journals, landed_cost_bills, landed_cost_items, landed_cost_vouchers, payment_allocations,
    stock_movements,
};

/// Maps a database error. Unique violations, serialization failures and
/// deadlocks become retryable conflicts.
pub(crate) fn db_err(e: DbErr) -> StoreError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return StoreError::Conflict;
    }
    let message = e.to_string();
    if message.contains("could not serialize") || message.contains("deadlock detected") {
        StoreError::Conflict
    } else {
        StoreError::Database(message)
    }
}

impl companies::Model {
    pub(crate) fn into_settings(self) -> CompanySettings {
        CompanySettings {
            company_id: self.id.into(),
            base_currency: self.base_currency.trim().to_string(),
            fiscal_year_start_month: u32::try_from(self.fiscal_year_start_month).unwrap_or(1),
            accounts: DefaultAccounts {
                receivable: self.receivable_account_id.map(Into::into),
                payable: self.payable_account_id.map(Into::into),
                revenue: self.revenue_account_id.map(Into::into),
                expense: self.expense_account_id.map(Into::into),
                cash: self.cash_account_id.map(Into::into),
                input_tax: self.input_tax_account_id.map(Into::into),
                output_tax: self.output_tax_account_id.map(Into::into),
            },
        }
    }
}

impl document_sequences::Model {
    pub(crate) fn into_domain(self) -> Result<DocumentSequence, StoreError> {
        Ok(DocumentSequence {
            company_id: self.company_id.into(),
            document_type: self.document_type.parse()?,
            fiscal_year: self.fiscal_year,
            prefix: self.prefix,
            next_number: self.next_number,
        })
    }
}

impl exchange_rates::Model {
    pub(crate) fn into_domain(self) -> ExchangeRate {
        ExchangeRate {
            company_id: self.company_id.into(),
            from_currency: self.from_currency.trim().to_string(),
            to_currency: self.to_currency.trim().to_string(),
            rate: self.rate,
            date: self.date,
        }
    }
}

impl journals::Model {
    pub(crate) fn into_domain(self, lines: Vec<journal_lines::Model>) -> Result<Journal, StoreError> {
        Ok(Journal {
            id: self.id.into(),
            company_id: self.company_id.into(),
            number: self.number,
            date: self.date,
            source_type: self.source_type.parse()?,
            source_id: self.source_id,
            description: self.description,
            currency: self.currency.trim().to_string(),
            fx_rate: self.fx_rate,
            total_amount: self.total_amount,
            created_by: self.created_by.map(Into::into),
            created_at: self.created_at.with_timezone(&Utc),
            lines: lines.into_iter().map(journal_lines::Model::into_domain).collect(),
        })
    }
}

impl journal_lines::Model {
    pub(crate) fn into_domain(self) -> JournalLine {
        JournalLine {
            id: self.id.into(),
            journal_id: self.journal_id.into(),
            line_number: self.line_number,
            account_id: self.account_id.into(),
            description: self.description,
            debit: self.debit,
            credit: self.credit,
            currency: self.currency.trim().to_string(),
            fx_rate: self.fx_rate,
            base_debit: self.base_debit,
            base_credit: self.base_credit,
        }
    }
}

impl documents::Model {
    pub(crate) fn into_domain(self) -> Result<Document, StoreError> {
        Ok(Document {
            id: self.id.into(),
            company_id: self.company_id.into(),
            kind: self.kind.parse()?,
            number: self.number,
            counterparty_id: self.counterparty_id.into(),
            currency: self.currency.trim().to_string(),
            fx_rate: self.fx_rate,
            issue_date: self.issue_date,
            due_date: self.due_date,
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            total: self.total,
            paid_amount: self.paid_amount,
            lifecycle: self.lifecycle.parse()?,
            status: self.status.parse()?,
        })
    }
}

impl cash_transactions::Model {
    pub(crate) fn into_domain(self) -> Result<CashTransaction, StoreError> {
        Ok(CashTransaction {
            id: self.id.into(),
            company_id: self.company_id.into(),
            kind: self.kind.parse()?,
            number: self.number,
            counterparty_id: self.counterparty_id.map(Into::into),
            bank_account_id: self.bank_account_id.map(Into::into),
            date: self.date,
            amount: self.amount,
            currency: self.currency.trim().to_string(),
            fx_rate: self.fx_rate,
            reference: self.reference,
            description: self.description,
            reconciled: self.reconciled,
        })
    }
}

impl payment_allocations::Model {
    pub(crate) fn into_domain(self) -> Result<Allocation, StoreError> {
        Ok(Allocation {
            id: self.id.into(),
            company_id: self.company_id.into(),
            payment_kind: self.payment_type.parse()?,
            payment_id: self.payment_id.into(),
            document_kind: self.document_type.parse()?,
            document_id: self.document_id.into(),
            amount: self.allocated_amount,
            allocation_date: self.allocation_date,
            created_by: self.created_by.map(Into::into),
            created_at: self.created_at.with_timezone(&Utc),
        })
    }
}

impl bank_statement_lines::Model {
    pub(crate) fn into_domain(self) -> Result<BankLine, StoreError> {
        Ok(BankLine {
            id: self.id.into(),
            company_id: self.company_id.into(),
            bank_account_id: self.bank_account_id.into(),
            date: self.date,
            amount: self.amount,
            description: self.description,
            reference: self.reference,
            matched: self.matched,
            matched_kind: self.matched_kind.map(|k| k.parse()).transpose()?,
            matched_payment_id: self.matched_payment_id.map(Into::into),
        })
    }
}

impl landed_cost_vouchers::Model {
    pub(crate) fn into_domain(self) -> Result<LandedCostVoucher, StoreError> {
        Ok(LandedCostVoucher {
            id: self.id.into(),
            company_id: self.company_id.into(),
            number: self.number,
            date: self.date,
            method: self.allocation_method.parse()?,
            status: self.status.parse()?,
            journal_id: self.journal_id.map(Into::into),
        })
    }
}

impl landed_cost_bills::Model {
    pub(crate) fn into_domain(self) -> LandedCostBill {
        LandedCostBill {
            id: self.id,
            voucher_id: self.voucher_id.into(),
            bill_id: self.bill_id.into(),
            amount: self.amount,
            expense_account_id: self.expense_account_id.map(Into::into),
        }
    }
}

impl landed_cost_items::Model {
    pub(crate) fn into_domain(self) -> LandedCostItem {
        LandedCostItem {
            id: self.id,
            voucher_id: self.voucher_id.into(),
            stock_movement_id: self.stock_movement_id.into(),
            quantity: self.quantity,
            original_cost: self.original_cost,
            allocated_cost: self.allocated_cost,
            new_unit_cost: self.new_unit_cost,
        }
    }
}

impl stock_movements::Model {
    pub(crate) fn into_domain(self) -> StockMovement {
        StockMovement {
            id: self.id.into(),
            company_id: self.company_id.into(),
            item_id: self.item_id.into(),
            inventory_account_id: self.inventory_account_id.map(Into::into),
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            total_cost: self.total_cost,
        }
    }
}

pub(crate) fn audit_active(entry: &AuditEntry) -> audit_logs::ActiveModel {
    audit_logs::ActiveModel {
        id: Set(entry.id),
        company_id: Set(entry.company_id.into_inner()),
        user_id: Set(entry.user_id.map(|u| u.into_inner())),
        entity_type: Set(entry.entity_type.clone()),
        entity_id: Set(entry.entity_id),
        action: Set(entry.action.as_str().to_string()),
        details: Set(entry.details.clone()),
        created_at: Set(entry.created_at.into()),
    }
}
