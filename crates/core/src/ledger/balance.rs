//! Balance checks and account balance calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tenora_shared::types::{AccountId, round_money};

use super::entry::JournalLine;
use super::types::AccountType;

/// Rounded debit and credit totals for a set of lines.
///
/// Each line amount is rounded to ledger precision before it is summed, so
/// the totals compare the same values a reader sees on the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineTotals {
    /// Sum of rounded debits.
    pub debit: Decimal,
    /// Sum of rounded credits.
    pub credit: Decimal,
}

impl LineTotals {
    /// Totals a slice of lines.
    #[must_use]
    pub fn from_lines(lines: &[JournalLine]) -> Self {
        lines.iter().fold(Self::default(), |acc, line| Self {
            debit: acc.debit + round_money(line.debit),
            credit: acc.credit + round_money(line.credit),
        })
    }

    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }
}

/// Returns true if the lines' rounded debits equal their rounded credits.
///
/// An empty set of lines is balanced.
#[must_use]
pub fn is_balanced(lines: &[JournalLine]) -> bool {
    LineTotals::from_lines(lines).is_balanced()
}

/// Account balance computed from its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Account type the polarity was taken from.
    pub account_type: AccountType,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Net balance, signed by the account's normal side.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Builds a balance from already aggregated totals.
    ///
    /// The database sums with SQL and hands the totals here.
    #[must_use]
    pub fn from_totals(
        account_id: AccountId,
        account_type: AccountType,
        debit_total: Decimal,
        credit_total: Decimal,
    ) -> Self {
        Self {
            account_id,
            account_type,
            debit_total,
            credit_total,
            balance: account_type
                .normal_balance()
                .balance(debit_total, credit_total),
        }
    }

    /// Aggregates the lines that reference `account_id`.
    ///
    /// Lines for other accounts are ignored.
    #[must_use]
    pub fn from_lines(
        account_id: AccountId,
        account_type: AccountType,
        lines: &[JournalLine],
    ) -> Self {
        let (debit, credit) = lines
            .iter()
            .filter(|line| line.account_id == account_id)
            .fold((Decimal::ZERO, Decimal::ZERO), |(d, c), line| {
                (d + line.debit, c + line.credit)
            });
        Self::from_totals(account_id, account_type, debit, credit)
    }
}
