//! Property-based tests for journal balance and reversal.

use std::collections::HashMap;

use chrono::NaiveDate;
use ledgerwise_shared::types::{AccountId, CompanyId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::JournalEngine;
use super::types::{CreateJournalInput, JournalLineInput, SourceType};
use super::validation::validate_lines;
use crate::store::memory::{test_company, InMemoryStore};
use crate::store::Store;

/// Strategy to generate positive amounts (0.01 to 100,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a positive rate (0.0001 to 100.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Splits each debit amount across a credit line so the set balances.
fn balanced_lines(amounts: &[Decimal], accounts: &[AccountId]) -> Vec<JournalLineInput> {
    let mut lines = Vec::new();
    for (i, amount) in amounts.iter().enumerate() {
        let debit_account = accounts[i % accounts.len()];
        let credit_account = accounts[(i + 1) % accounts.len()];
        lines.push(JournalLineInput::debit(debit_account, *amount, "dr"));
        lines.push(JournalLineInput::credit(credit_account, *amount, "cr"));
    }
    lines
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

async fn company_with_accounts(store: &InMemoryStore, count: usize) -> (CompanyId, Vec<AccountId>) {
    let company = test_company(store).await;
    let accounts: Vec<AccountId> = (0..count).map(|_| AccountId::new()).collect();
    let seeded = accounts.clone();
    store
        .seed(move |s| {
            for account in seeded {
                s.add_account(company, account);
            }
        })
        .await;
    (company, accounts)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Any accepted line set is balanced within 0.01.
    #[test]
    fn prop_accepted_lines_are_balanced(
        debits in prop::collection::vec(positive_amount(), 1..8),
        credits in prop::collection::vec(positive_amount(), 1..8),
    ) {
        let account = AccountId::new();
        let mut lines: Vec<JournalLineInput> = debits.iter().map(|d| JournalLineInput::debit(account, *d, "dr")).collect();
        lines.extend(credits.iter().map(|c| JournalLineInput::credit(account, *c, "cr")));

        if let Ok(totals) = validate_lines(&lines) {
            prop_assert!((totals.debit - totals.credit).abs() <= crate::EPSILON);
        } else {
            let debit: Decimal = debits.iter().copied().sum();
            let credit: Decimal = credits.iter().copied().sum();
            prop_assert!((debit - credit).abs() > crate::EPSILON);
        }
    }

    /// Balanced input always produces a journal with equal totals.
    #[test]
    fn prop_created_journal_is_balanced(
        amounts in prop::collection::vec(positive_amount(), 1..6),
        rate in positive_rate(),
    ) {
        runtime().block_on(async {
            let store = InMemoryStore::new();
            let (company, accounts) = company_with_accounts(&store, 3).await;
            let mut tx = store.begin().await.unwrap();

            let journal = JournalEngine::create(&mut tx, CreateJournalInput {
                company_id: company,
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                source_type: SourceType::Manual,
                source_id: None,
                description: "prop".to_string(),
                currency: Some("EUR".to_string()),
                fx_rate: Some(rate),
                lines: balanced_lines(&amounts, &accounts),
                created_by: None,
            }).await.unwrap();

            let debit: Decimal = journal.lines.iter().map(|l| l.debit).sum();
            let credit: Decimal = journal.lines.iter().map(|l| l.credit).sum();
            let base_debit: Decimal = journal.lines.iter().map(|l| l.base_debit).sum();
            let base_credit: Decimal = journal.lines.iter().map(|l| l.base_credit).sum();
            assert_eq!(debit, credit);
            assert_eq!(base_debit, base_credit);
            assert_eq!(journal.total_amount, debit);
        });
    }

    /// A journal plus its reversal nets to zero on every account.
    #[test]
    fn prop_reversal_nets_to_zero(
        amounts in prop::collection::vec(positive_amount(), 1..6),
        rate in positive_rate(),
    ) {
        runtime().block_on(async {
            let store = InMemoryStore::new();
            let (company, accounts) = company_with_accounts(&store, 4).await;
            let mut tx = store.begin().await.unwrap();
            let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

            let original = JournalEngine::create(&mut tx, CreateJournalInput {
                company_id: company,
                date,
                source_type: SourceType::Manual,
                source_id: None,
                description: "prop".to_string(),
                currency: Some("GBP".to_string()),
                fx_rate: Some(rate),
                lines: balanced_lines(&amounts, &accounts),
                created_by: None,
            }).await.unwrap();
            let reversal = JournalEngine::reverse(&mut tx, company, original.id, date, "prop", None)
                .await
                .unwrap();

            let mut net: HashMap<AccountId, (Decimal, Decimal)> = HashMap::new();
            for line in original.lines.iter().chain(reversal.lines.iter()) {
                let entry = net.entry(line.account_id).or_default();
                entry.0 += line.debit - line.credit;
                entry.1 += line.base_debit - line.base_credit;
            }
            for (amount, base) in net.values() {
                assert!(amount.is_zero());
                assert!(base.is_zero());
            }
        });
    }
}
