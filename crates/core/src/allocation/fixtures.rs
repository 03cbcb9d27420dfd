//! Document and movement builders shared by settlement and matching tests.

use chrono::NaiveDate;
use ledgerwise_shared::types::{BankAccountId, CompanyId, CounterpartyId, DocumentId, PaymentId};
use rust_decimal::Decimal;

use super::types::{CashTransaction, Document, DocumentKind, Lifecycle, PaymentKind};

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn document(company_id: CompanyId, kind: DocumentKind, number: &str, total: Decimal, due: NaiveDate) -> Document {
    Document {
        id: DocumentId::new(),
        company_id,
        kind,
        number: number.to_string(),
        counterparty_id: CounterpartyId::new(),
        currency: "USD".to_string(),
        fx_rate: Decimal::ONE,
        issue_date: date(2025, 1, 1),
        due_date: due,
        subtotal: total,
        tax_amount: Decimal::ZERO,
        total,
        paid_amount: Decimal::ZERO,
        lifecycle: Lifecycle::Issued,
        status: kind.open_status(),
    }
}

pub(crate) fn invoice(company_id: CompanyId, total: Decimal) -> Document {
    document(company_id, DocumentKind::Invoice, "INV-2025-00001", total, date(2025, 12, 31))
}

pub(crate) fn bill(company_id: CompanyId, total: Decimal) -> Document {
    document(company_id, DocumentKind::Bill, "BILL-2025-00001", total, date(2025, 12, 31))
}

pub(crate) fn cash(company_id: CompanyId, kind: PaymentKind, amount: Decimal, on: NaiveDate) -> CashTransaction {
    CashTransaction {
        id: PaymentId::new(),
        company_id,
        kind,
        number: format!("{}-{on}", kind.as_str().to_uppercase()),
        counterparty_id: None,
        bank_account_id: None,
        date: on,
        amount,
        currency: "USD".to_string(),
        fx_rate: Decimal::ONE,
        reference: None,
        description: None,
        reconciled: false,
    }
}

pub(crate) fn receipt(company_id: CompanyId, amount: Decimal) -> CashTransaction {
    cash(company_id, PaymentKind::Receipt, amount, date(2025, 3, 1))
}

pub(crate) fn payment(company_id: CompanyId, amount: Decimal) -> CashTransaction {
    cash(company_id, PaymentKind::Payment, amount, date(2025, 3, 1))
}

pub(crate) fn through_bank(mut tx: CashTransaction, bank: BankAccountId) -> CashTransaction {
    tx.bank_account_id = Some(bank);
    tx
}

