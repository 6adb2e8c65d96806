//! Double-entry bookkeeping logic.
//!
//! This module implements the journal side of the ledger:
//! - Account types and their normal balance (debit- or credit-normal)
//! - Journal entries and their lines
//! - The balance check that guards posting
//! - The draft → posted / draft → cancelled state machine
//! - Account balance aggregation

pub mod balance;
pub mod entry;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use balance::{AccountBalance, LineTotals, is_balanced};
pub use entry::{JournalEntry, JournalLine, PostingStamp};
pub use error::LedgerError;
pub use types::{AccountType, JournalStatus, NormalBalance};
