//! `SeaORM` entities, one module per table.

pub mod accounts;
pub mod audit_logs;
pub mod bank_statement_lines;
pub mod cash_transactions;
pub mod companies;
pub mod document_sequences;
pub mod documents;
pub mod exchange_rates;
pub mod journal_lines;
pub mod journals;
pub mod landed_cost_bills;
pub mod landed_cost_items;
pub mod landed_cost_vouchers;
pub mod payment_allocations;
pub mod stock_movements;
