//! Journals for business documents using the company's default accounts.
//!
//! A missing default account does not fail the business action: the posting
//! is skipped with a warning and the document stands without a journal.

use chrono::NaiveDate;
use ledgerwise_shared::types::{AccountId, CompanyId, UserId};
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use super::engine::JournalEngine;
use super::error::JournalError;
use super::types::{CreateJournalInput, JournalLineInput, PostingOutcome, SourceType};
use crate::allocation::{CashTransaction, Document, PaymentKind};
use crate::company::DefaultAccounts;
use crate::store::StoreTx;

/// Posts invoices, bills, receipts and payments.
pub struct PostingService;

/// Header fields shared by every business posting.
struct Posting<'a> {
    company_id: CompanyId,
    source_type: SourceType,
    source_id: Uuid,
    date: NaiveDate,
    description: String,
    currency: &'a str,
    fx_rate: Decimal,
}

/// Names of the mapping entries that are unset.
fn missing(required: &[(&str, Option<AccountId>)]) -> Vec<String> {
    required
        .iter()
        .filter(|(_, account)| account.is_none())
        .map(|(name, _)| (*name).to_string())
        .collect()
}

impl PostingService {
    /// Posts a sales invoice: DR receivable, CR revenue, CR output tax.
    pub async fn post_invoice<T: StoreTx>(
        tx: &mut T,
        invoice: &Document,
        user_id: Option<UserId>,
    ) -> Result<PostingOutcome, JournalError> {
        let accounts = Self::accounts(tx, invoice.company_id).await?;
        let has_tax = invoice.tax_amount > Decimal::ZERO;
        let n = &invoice.number;
        let description = format!("Sales Invoice {n}");

        let mut required = vec![("receivable", accounts.receivable), ("revenue", accounts.revenue)];
        if has_tax {
            required.push(("output_tax", accounts.output_tax));
        }
        let (Some(receivable), Some(revenue)) = (accounts.receivable, accounts.revenue) else {
            return Ok(Self::skipped(invoice.company_id, &description, &missing(&required)));
        };

        let mut lines = vec![
            JournalLineInput::debit(receivable, invoice.total, format!("Invoice {n} - Customer Receivable")),
            JournalLineInput::credit(revenue, invoice.subtotal, format!("Invoice {n} - Sales Revenue")),
        ];
        if has_tax {
            let Some(tax) = accounts.output_tax else {
                return Ok(Self::skipped(invoice.company_id, &description, &missing(&required)));
            };
            lines.push(JournalLineInput::credit(tax, invoice.tax_amount, format!("Invoice {n} - Tax Payable")));
        }

        let posting = Posting {
            company_id: invoice.company_id,
            source_type: SourceType::Invoice,
            source_id: invoice.id.into_inner(),
            date: invoice.issue_date,
            description,
            currency: &invoice.currency,
            fx_rate: invoice.fx_rate,
        };
        Self::post(tx, posting, lines, user_id).await
    }

    /// Posts a purchase bill: DR expense, DR input tax, CR payable.
    pub async fn post_bill<T: StoreTx>(
        tx: &mut T,
        bill: &Document,
        user_id: Option<UserId>,
    ) -> Result<PostingOutcome, JournalError> {
        let accounts = Self::accounts(tx, bill.company_id).await?;
        let has_tax = bill.tax_amount > Decimal::ZERO;
        let n = &bill.number;
        let description = format!("Purchase Bill {n}");

        let mut required = vec![("payable", accounts.payable), ("expense", accounts.expense)];
        if has_tax {
            required.push(("input_tax", accounts.input_tax));
        }
        let (Some(payable), Some(expense)) = (accounts.payable, accounts.expense) else {
            return Ok(Self::skipped(bill.company_id, &description, &missing(&required)));
        };

        let mut lines = vec![JournalLineInput::debit(expense, bill.subtotal, format!("Bill {n} - Purchase Expense"))];
        if has_tax {
            let Some(tax) = accounts.input_tax else {
                return Ok(Self::skipped(bill.company_id, &description, &missing(&required)));
            };
            lines.push(JournalLineInput::debit(tax, bill.tax_amount, format!("Bill {n} - Input Tax")));
        }
        lines.push(JournalLineInput::credit(payable, bill.total, format!("Bill {n} - Accounts Payable")));

        let posting = Posting {
            company_id: bill.company_id,
            source_type: SourceType::Bill,
            source_id: bill.id.into_inner(),
            date: bill.issue_date,
            description,
            currency: &bill.currency,
            fx_rate: bill.fx_rate,
        };
        Self::post(tx, posting, lines, user_id).await
    }

    /// Posts a receipt (DR cash, CR receivable) or payment (DR payable, CR cash).
    pub async fn post_cash<T: StoreTx>(
        tx: &mut T,
        cash: &CashTransaction,
        user_id: Option<UserId>,
    ) -> Result<PostingOutcome, JournalError> {
        let accounts = Self::accounts(tx, cash.company_id).await?;
        let n = &cash.number;

        let (source_type, description, lines) = match cash.kind {
            PaymentKind::Receipt => {
                let description = format!("Receipt {n}");
                let (Some(bank), Some(receivable)) = (accounts.cash, accounts.receivable) else {
                    let names = missing(&[("cash", accounts.cash), ("receivable", accounts.receivable)]);
                    return Ok(Self::skipped(cash.company_id, &description, &names));
                };
                let lines = vec![
                    JournalLineInput::debit(bank, cash.amount, format!("Receipt {n} - Cash")),
                    JournalLineInput::credit(receivable, cash.amount, format!("Receipt {n} - Customer Receivable")),
                ];
                (SourceType::Receipt, description, lines)
            }
            PaymentKind::Payment => {
                let description = format!("Payment {n}");
                let (Some(bank), Some(payable)) = (accounts.cash, accounts.payable) else {
                    let names = missing(&[("cash", accounts.cash), ("payable", accounts.payable)]);
                    return Ok(Self::skipped(cash.company_id, &description, &names));
                };
                let lines = vec![
                    JournalLineInput::debit(payable, cash.amount, format!("Payment {n} - Accounts Payable")),
                    JournalLineInput::credit(bank, cash.amount, format!("Payment {n} - Cash")),
                ];
                (SourceType::Payment, description, lines)
            }
        };

        let posting = Posting {
            company_id: cash.company_id,
            source_type,
            source_id: cash.id.into_inner(),
            date: cash.date,
            description,
            currency: &cash.currency,
            fx_rate: cash.fx_rate,
        };
        Self::post(tx, posting, lines, user_id).await
    }

    async fn accounts<T: StoreTx>(tx: &mut T, company_id: CompanyId) -> Result<DefaultAccounts, JournalError> {
        tx.company_settings(company_id)
            .await?
            .map(|s| s.accounts)
            .ok_or(JournalError::CompanyNotFound(company_id))
    }

    fn skipped(company_id: CompanyId, description: &str, missing: &[String]) -> PostingOutcome {
        let warning = format!("{description}: no default {} account configured", missing.join(", "));
        warn!(company_id = %company_id, warning = %warning, "Journal posting skipped");
        PostingOutcome::Skipped { warning }
    }

    async fn post<T: StoreTx>(
        tx: &mut T,
        posting: Posting<'_>,
        lines: Vec<JournalLineInput>,
        created_by: Option<UserId>,
    ) -> Result<PostingOutcome, JournalError> {
        let journal = JournalEngine::create(
            tx,
            CreateJournalInput {
                company_id: posting.company_id,
                date: posting.date,
                source_type: posting.source_type,
                source_id: Some(posting.source_id),
                description: posting.description,
                currency: Some(posting.currency.to_string()),
                fx_rate: Some(posting.fx_rate),
                lines,
                created_by,
            },
        )
        .await?;
        Ok(PostingOutcome::Posted { journal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{DocumentKind, DocumentStatus, Lifecycle};
    use crate::company::CompanySettings;
    use crate::store::memory::InMemoryStore;
    use crate::store::Store;
    use ledgerwise_shared::types::{CounterpartyId, DocumentId, PaymentId};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn company_with(store: &InMemoryStore, accounts: DefaultAccounts) -> CompanyId {
        let company_id = CompanyId::new();
        store
            .seed(|s| {
                for account in [
                    accounts.receivable,
                    accounts.payable,
                    accounts.revenue,
                    accounts.expense,
                    accounts.cash,
                    accounts.input_tax,
                    accounts.output_tax,
                ]
                .into_iter()
                .flatten()
                {
                    s.add_account(company_id, account);
                }
                s.add_company(CompanySettings {
                    company_id,
                    base_currency: "USD".to_string(),
                    fiscal_year_start_month: 1,
                    accounts,
                });
            })
            .await;
        company_id
    }

    fn full_mapping() -> DefaultAccounts {
        DefaultAccounts {
            receivable: Some(AccountId::new()),
            payable: Some(AccountId::new()),
            revenue: Some(AccountId::new()),
            expense: Some(AccountId::new()),
            cash: Some(AccountId::new()),
            input_tax: Some(AccountId::new()),
            output_tax: Some(AccountId::new()),
        }
    }

    fn document(company_id: CompanyId, kind: DocumentKind, subtotal: Decimal, tax: Decimal) -> Document {
        Document {
            id: DocumentId::new(),
            company_id,
            kind,
            number: "INV-2025-00001".to_string(),
            counterparty_id: CounterpartyId::new(),
            currency: "USD".to_string(),
            fx_rate: Decimal::ONE,
            issue_date: date(2025, 2, 1),
            due_date: date(2025, 3, 1),
            subtotal,
            tax_amount: tax,
            total: subtotal + tax,
            paid_amount: Decimal::ZERO,
            lifecycle: Lifecycle::Issued,
            status: DocumentStatus::Sent,
        }
    }

    #[tokio::test]
    async fn test_post_invoice_with_tax() {
        let store = InMemoryStore::new();
        let accounts = full_mapping();
        let company = company_with(&store, accounts.clone()).await;
        let invoice = document(company, DocumentKind::Invoice, dec!(1000), dec!(100));
        let mut tx = store.begin().await.unwrap();

        let outcome = PostingService::post_invoice(&mut tx, &invoice, None).await.unwrap();
        let journal = outcome.journal().unwrap();

        assert_eq!(journal.source_type, SourceType::Invoice);
        assert_eq!(journal.total_amount, dec!(1100));
        assert_eq!(journal.lines.len(), 3);
        assert_eq!(journal.lines[0].account_id, accounts.receivable.unwrap());
        assert_eq!(journal.lines[2].account_id, accounts.output_tax.unwrap());
        assert_eq!(journal.lines[2].credit, dec!(100));
    }

    #[tokio::test]
    async fn test_post_bill_without_tax() {
        let store = InMemoryStore::new();
        let company = company_with(&store, full_mapping()).await;
        let bill = document(company, DocumentKind::Bill, dec!(500), Decimal::ZERO);
        let mut tx = store.begin().await.unwrap();

        let outcome = PostingService::post_bill(&mut tx, &bill, None).await.unwrap();
        let journal = outcome.journal().unwrap();

        assert_eq!(journal.lines.len(), 2);
        assert_eq!(journal.lines[0].debit, dec!(500));
        assert_eq!(journal.lines[1].credit, dec!(500));
    }

    #[tokio::test]
    async fn test_missing_mapping_skips_posting() {
        let store = InMemoryStore::new();
        let mut accounts = full_mapping();
        accounts.revenue = None;
        let company = company_with(&store, accounts).await;
        let invoice = document(company, DocumentKind::Invoice, dec!(100), Decimal::ZERO);
        let mut tx = store.begin().await.unwrap();

        let outcome = PostingService::post_invoice(&mut tx, &invoice, None).await.unwrap();
        tx.commit().await.unwrap();

        match outcome {
            PostingOutcome::Skipped { warning } => assert!(warning.contains("revenue")),
            PostingOutcome::Posted { .. } => panic!("expected skip"),
        }
        assert!(store.read(|s| s.journals.is_empty()).await);
    }

    #[tokio::test]
    async fn test_missing_tax_account_skips_taxed_bill() {
        let store = InMemoryStore::new();
        let mut accounts = full_mapping();
        accounts.input_tax = None;
        let company = company_with(&store, accounts).await;
        let bill = document(company, DocumentKind::Bill, dec!(100), dec!(10));
        let mut tx = store.begin().await.unwrap();

        let outcome = PostingService::post_bill(&mut tx, &bill, None).await.unwrap();
        assert!(matches!(outcome, PostingOutcome::Skipped { ref warning } if warning.contains("input_tax")));
    }

    #[tokio::test]
    async fn test_post_receipt_and_payment() {
        let store = InMemoryStore::new();
        let accounts = full_mapping();
        let company = company_with(&store, accounts.clone()).await;
        let mut tx = store.begin().await.unwrap();

        for kind in [PaymentKind::Receipt, PaymentKind::Payment] {
            let cash = CashTransaction {
                id: PaymentId::new(),
                company_id: company,
                kind,
                number: "RCPT-2025-00001".to_string(),
                counterparty_id: None,
                bank_account_id: None,
                date: date(2025, 2, 10),
                amount: dec!(75),
                currency: "USD".to_string(),
                fx_rate: Decimal::ONE,
                reference: None,
                description: None,
                reconciled: false,
            };
            let outcome = PostingService::post_cash(&mut tx, &cash, None).await.unwrap();
            let journal = outcome.journal().unwrap();
            let cash_line = journal
                .lines
                .iter()
                .find(|l| Some(l.account_id) == accounts.cash)
                .unwrap();
            match kind {
                PaymentKind::Receipt => assert_eq!(cash_line.debit, dec!(75)),
                PaymentKind::Payment => assert_eq!(cash_line.credit, dec!(75)),
            }
        }
    }
}
