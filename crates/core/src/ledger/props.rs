//! Property-based tests for the balance check and posting.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tenora_shared::types::{AccountId, JournalEntryId, OrganizationId, UserId};

use super::balance::{AccountBalance, is_balanced};
use super::entry::{JournalEntry, JournalLine};
use super::error::LedgerError;
use super::types::{AccountType, JournalStatus};

/// Amounts from 0.01 to 1,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn account_type() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Asset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Revenue),
        Just(AccountType::Expense),
    ]
}

/// Balanced lines: every debit is mirrored by a credit of the same amount.
fn balanced_lines() -> impl Strategy<Value = Vec<JournalLine>> {
    prop::collection::vec(amount(), 1..8).prop_map(|amounts| {
        amounts
            .into_iter()
            .flat_map(|a| {
                [
                    JournalLine::debit(AccountId::new(), a),
                    JournalLine::credit(AccountId::new(), a),
                ]
            })
            .collect()
    })
}

fn draft(lines: Vec<JournalLine>) -> JournalEntry {
    let mut entry = JournalEntry::draft(JournalEntryId::new(), OrganizationId::new());
    entry.lines = lines;
    entry
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Mirrored debits and credits always balance, and the entry posts.
    #[test]
    fn prop_balanced_entries_post(lines in balanced_lines()) {
        prop_assert!(is_balanced(&lines));

        let mut entry = draft(lines);
        prop_assert!(entry.post(UserId::new(), Utc::now()).is_ok());
        prop_assert_eq!(entry.status, JournalStatus::Posted);
    }

    /// Adding any positive amount to one side breaks the balance, and a
    /// failed post leaves the draft untouched.
    #[test]
    fn prop_skewed_entries_stay_draft(lines in balanced_lines(), skew in amount()) {
        let mut lines = lines;
        lines.push(JournalLine::debit(AccountId::new(), skew));

        let mut entry = draft(lines);
        let result = entry.post(UserId::new(), Utc::now());

        let is_unbalanced = matches!(result, Err(LedgerError::UnbalancedEntry { .. }));
        prop_assert!(is_unbalanced);
        prop_assert_eq!(entry.status, JournalStatus::Draft);
        prop_assert!(entry.posted_at.is_none());
    }

    /// Debit-normal and credit-normal balances are mirror images.
    #[test]
    fn prop_polarity_is_antisymmetric(debit in amount(), credit in amount(), kind in account_type()) {
        let account = AccountId::new();
        let lines = vec![
            JournalLine::debit(account, debit),
            JournalLine::credit(account, credit),
        ];

        let balance = AccountBalance::from_lines(account, kind, &lines).balance;
        let expected = match kind {
            AccountType::Asset | AccountType::Expense => debit - credit,
            _ => credit - debit,
        };
        prop_assert_eq!(balance, expected);
    }
}
