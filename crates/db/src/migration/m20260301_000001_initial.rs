//! Initial schema.
//!
//! Status and kind columns are plain `VARCHAR` guarded by `CHECK`
//! constraints; the entities map them to the core enums by name.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: COMPANIES & CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(COMPANY_ACCOUNT_FKS_SQL).await?;

        // ============================================================
        // PART 2: NUMBERING & CURRENCY
        // ============================================================
        db.execute_unprepared(DOCUMENT_SEQUENCES_SQL).await?;
        db.execute_unprepared(EXCHANGE_RATES_SQL).await?;

        // ============================================================
        // PART 3: JOURNALS
        // ============================================================
        db.execute_unprepared(JOURNALS_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 4: DOCUMENTS, CASH & ALLOCATIONS
        // ============================================================
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(CASH_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(PAYMENT_ALLOCATIONS_SQL).await?;

        // ============================================================
        // PART 5: BANK RECONCILIATION
        // ============================================================
        db.execute_unprepared(BANK_STATEMENT_LINES_SQL).await?;

        // ============================================================
        // PART 6: INVENTORY & LANDED COST
        // ============================================================
        db.execute_unprepared(STOCK_MOVEMENTS_SQL).await?;
        db.execute_unprepared(LANDED_COST_SQL).await?;

        // ============================================================
        // PART 7: AUDIT
        // ============================================================
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    base_currency CHAR(3) NOT NULL DEFAULT 'USD',
    fiscal_year_start_month INTEGER NOT NULL DEFAULT 1,
    receivable_account_id UUID,
    payable_account_id UUID,
    revenue_account_id UUID,
    expense_account_id UUID,
    cash_account_id UUID,
    input_tax_account_id UUID,
    output_tax_account_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fiscal_month CHECK (fiscal_year_start_month BETWEEN 1 AND 12)
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, code)
);

CREATE INDEX idx_accounts_company ON accounts(company_id);
";

const COMPANY_ACCOUNT_FKS_SQL: &str = r"
ALTER TABLE companies
    ADD CONSTRAINT fk_receivable FOREIGN KEY (receivable_account_id) REFERENCES accounts(id),
    ADD CONSTRAINT fk_payable FOREIGN KEY (payable_account_id) REFERENCES accounts(id),
    ADD CONSTRAINT fk_revenue FOREIGN KEY (revenue_account_id) REFERENCES accounts(id),
    ADD CONSTRAINT fk_expense FOREIGN KEY (expense_account_id) REFERENCES accounts(id),
    ADD CONSTRAINT fk_cash FOREIGN KEY (cash_account_id) REFERENCES accounts(id),
    ADD CONSTRAINT fk_input_tax FOREIGN KEY (input_tax_account_id) REFERENCES accounts(id),
    ADD CONSTRAINT fk_output_tax FOREIGN KEY (output_tax_account_id) REFERENCES accounts(id);
";

const DOCUMENT_SEQUENCES_SQL: &str = r"
CREATE TABLE document_sequences (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    document_type VARCHAR(20) NOT NULL,
    fiscal_year INTEGER NOT NULL,
    prefix VARCHAR(20) NOT NULL,
    next_number BIGINT NOT NULL DEFAULT 1,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_next_number_positive CHECK (next_number > 0),
    UNIQUE (company_id, document_type, fiscal_year)
);
";

const EXCHANGE_RATES_SQL: &str = r"
CREATE TABLE exchange_rates (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    from_currency CHAR(3) NOT NULL,
    to_currency CHAR(3) NOT NULL,
    rate NUMERIC(19, 10) NOT NULL,
    date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rate_positive CHECK (rate > 0),
    CONSTRAINT chk_different_currencies CHECK (from_currency <> to_currency),
    UNIQUE (company_id, from_currency, to_currency, date)
);

CREATE INDEX idx_exchange_rates_lookup ON exchange_rates(company_id, from_currency, to_currency, date DESC);
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journals (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    number VARCHAR(50) NOT NULL,
    date DATE NOT NULL,
    source_type VARCHAR(20) NOT NULL,
    source_id UUID,
    description TEXT NOT NULL,
    currency CHAR(3) NOT NULL,
    fx_rate NUMERIC(19, 10) NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_source_type CHECK (source_type IN
        ('manual', 'invoice', 'bill', 'receipt', 'payment', 'reversal', 'landed_cost')),
    UNIQUE (company_id, number)
);

CREATE INDEX idx_journals_source ON journals(company_id, source_type, source_id);
CREATE UNIQUE INDEX idx_journals_one_reversal ON journals(company_id, source_id) WHERE source_type = 'reversal';
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    journal_id UUID NOT NULL REFERENCES journals(id) ON DELETE RESTRICT,
    line_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    description TEXT NOT NULL,
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    currency CHAR(3) NOT NULL,
    fx_rate NUMERIC(19, 10) NOT NULL,
    base_debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    base_credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    CONSTRAINT chk_line_non_negative CHECK (debit >= 0 AND credit >= 0),
    UNIQUE (journal_id, line_number)
);

CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    kind VARCHAR(10) NOT NULL,
    number VARCHAR(50) NOT NULL,
    counterparty_id UUID NOT NULL,
    currency CHAR(3) NOT NULL,
    fx_rate NUMERIC(19, 10) NOT NULL DEFAULT 1,
    issue_date DATE NOT NULL,
    due_date DATE NOT NULL,
    subtotal NUMERIC(19, 4) NOT NULL,
    tax_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total NUMERIC(19, 4) NOT NULL,
    paid_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    lifecycle VARCHAR(10) NOT NULL DEFAULT 'draft',
    status VARCHAR(20) NOT NULL DEFAULT 'draft',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_document_kind CHECK (kind IN ('invoice', 'bill')),
    CONSTRAINT chk_lifecycle CHECK (lifecycle IN ('draft', 'issued', 'void')),
    CONSTRAINT chk_status CHECK (status IN
        ('draft', 'sent', 'pending', 'partially_paid', 'paid', 'overdue', 'void')),
    CONSTRAINT chk_paid_within_total CHECK (paid_amount >= 0 AND paid_amount <= total),
    UNIQUE (company_id, kind, number)
);

CREATE INDEX idx_documents_open ON documents(company_id, kind, counterparty_id, due_date)
    WHERE lifecycle = 'issued';
";

const CASH_TRANSACTIONS_SQL: &str = r"
CREATE TABLE cash_transactions (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    kind VARCHAR(10) NOT NULL,
    number VARCHAR(50) NOT NULL,
    counterparty_id UUID,
    bank_account_id UUID,
    date DATE NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    currency CHAR(3) NOT NULL,
    fx_rate NUMERIC(19, 10) NOT NULL DEFAULT 1,
    reference VARCHAR(255),
    description TEXT,
    reconciled BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_cash_kind CHECK (kind IN ('receipt', 'payment')),
    CONSTRAINT chk_cash_amount_positive CHECK (amount > 0),
    UNIQUE (company_id, kind, number)
);

CREATE INDEX idx_cash_company_date ON cash_transactions(company_id, kind, date DESC);
CREATE INDEX idx_cash_unreconciled ON cash_transactions(company_id, bank_account_id) WHERE NOT reconciled;
";

const PAYMENT_ALLOCATIONS_SQL: &str = r"
CREATE TABLE payment_allocations (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    payment_type VARCHAR(10) NOT NULL,
    payment_id UUID NOT NULL REFERENCES cash_transactions(id) ON DELETE CASCADE,
    document_type VARCHAR(10) NOT NULL,
    document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    allocated_amount NUMERIC(19, 4) NOT NULL,
    allocation_date DATE NOT NULL,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_allocated_positive CHECK (allocated_amount > 0),
    CONSTRAINT chk_allocation_pairing CHECK (
        (payment_type = 'receipt' AND document_type = 'invoice')
        OR (payment_type = 'payment' AND document_type = 'bill'))
);

CREATE INDEX idx_allocations_document ON payment_allocations(document_id);
CREATE INDEX idx_allocations_payment ON payment_allocations(payment_id);
CREATE INDEX idx_allocations_recent ON payment_allocations(company_id, created_at DESC);
";

const BANK_STATEMENT_LINES_SQL: &str = r"
CREATE TABLE bank_statement_lines (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    bank_account_id UUID NOT NULL,
    date DATE NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    reference VARCHAR(255),
    matched BOOLEAN NOT NULL DEFAULT false,
    matched_kind VARCHAR(10),
    matched_payment_id UUID REFERENCES cash_transactions(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_line_amount_non_zero CHECK (amount <> 0)
);

CREATE INDEX idx_bank_lines_account ON bank_statement_lines(company_id, bank_account_id, date);
";

const STOCK_MOVEMENTS_SQL: &str = r"
CREATE TABLE stock_movements (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    item_id UUID NOT NULL,
    inventory_account_id UUID REFERENCES accounts(id),
    quantity NUMERIC(19, 4) NOT NULL,
    unit_cost NUMERIC(19, 4) NOT NULL,
    total_cost NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const LANDED_COST_SQL: &str = r"
CREATE TABLE landed_cost_vouchers (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    number VARCHAR(50) NOT NULL,
    date DATE NOT NULL,
    allocation_method VARCHAR(10) NOT NULL DEFAULT 'value',
    status VARCHAR(10) NOT NULL DEFAULT 'draft',
    journal_id UUID REFERENCES journals(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_allocation_method CHECK (allocation_method IN ('value', 'quantity')),
    CONSTRAINT chk_voucher_status CHECK (status IN ('draft', 'allocated', 'posted')),
    UNIQUE (company_id, number)
);

CREATE TABLE landed_cost_bills (
    id UUID PRIMARY KEY,
    voucher_id UUID NOT NULL REFERENCES landed_cost_vouchers(id) ON DELETE CASCADE,
    bill_id UUID NOT NULL REFERENCES documents(id),
    amount NUMERIC(19, 4) NOT NULL,
    expense_account_id UUID REFERENCES accounts(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE landed_cost_items (
    id UUID PRIMARY KEY,
    voucher_id UUID NOT NULL REFERENCES landed_cost_vouchers(id) ON DELETE CASCADE,
    stock_movement_id UUID NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    original_cost NUMERIC(19, 4) NOT NULL,
    allocated_cost NUMERIC(19, 4) NOT NULL DEFAULT 0,
    new_unit_cost NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_landed_cost_bills_voucher ON landed_cost_bills(voucher_id);
CREATE INDEX idx_landed_cost_items_voucher ON landed_cost_items(voucher_id);
";

const AUDIT_LOGS_SQL: &str = r"
CREATE TABLE audit_logs (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    user_id UUID,
    entity_type VARCHAR(50) NOT NULL,
    entity_id UUID NOT NULL,
    action VARCHAR(20) NOT NULL,
    details JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_audit_logs_entity ON audit_logs(company_id, entity_type, entity_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS audit_logs CASCADE;
DROP TABLE IF EXISTS landed_cost_items CASCADE;
DROP TABLE IF EXISTS landed_cost_bills CASCADE;
DROP TABLE IF EXISTS landed_cost_vouchers CASCADE;
DROP TABLE IF EXISTS stock_movements CASCADE;
DROP TABLE IF EXISTS bank_statement_lines CASCADE;
DROP TABLE IF EXISTS payment_allocations CASCADE;
DROP TABLE IF EXISTS cash_transactions CASCADE;
DROP TABLE IF EXISTS documents CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journals CASCADE;
DROP TABLE IF EXISTS exchange_rates CASCADE;
DROP TABLE IF EXISTS document_sequences CASCADE;
DROP TABLE IF EXISTS companies CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
";
