//! Journal entry domain types and the posting state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tenora_shared::types::{AccountId, BranchId, JournalEntryId, OrganizationId, UserId};

use super::balance::{LineTotals, is_balanced};
use super::error::LedgerError;
use super::types::JournalStatus;

/// A single line of a journal entry.
///
/// Both amounts are non-negative. A line normally carries either a debit or a
/// credit, but nothing here requires the other side to be zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// The account affected by this line.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional description for this line item.
    pub description: Option<String>,
}

impl JournalLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }
}

/// Who posted an entry, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingStamp {
    /// Posting time.
    pub posted_at: DateTime<Utc>,
    /// Acting user.
    pub posted_by: UserId,
}

/// A journal entry with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Optional branch.
    pub branch_id: Option<BranchId>,
    /// Current status.
    pub status: JournalStatus,
    /// Set once, when the entry is posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Set once, when the entry is posted.
    pub posted_by: Option<UserId>,
    /// Lines in entry order.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Creates an empty draft entry.
    #[must_use]
    pub fn draft(id: JournalEntryId, organization_id: OrganizationId) -> Self {
        Self {
            id,
            organization_id,
            branch_id: None,
            status: JournalStatus::Draft,
            posted_at: None,
            posted_by: None,
            lines: Vec::new(),
        }
    }

    /// Rounded debit and credit totals of the lines.
    #[must_use]
    pub fn totals(&self) -> LineTotals {
        LineTotals::from_lines(&self.lines)
    }

    /// Returns true if debits equal credits at ledger precision.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        is_balanced(&self.lines)
    }

    /// Fails unless the entry's lines may still change.
    ///
    /// # Errors
    ///
    /// `AlreadyPosted` for posted entries, `InvalidTransition` for
    /// cancelled ones.
    pub fn ensure_mutable(&self) -> Result<(), LedgerError> {
        match self.status {
            JournalStatus::Draft => Ok(()),
            JournalStatus::Posted => Err(LedgerError::AlreadyPosted),
            JournalStatus::Cancelled => Err(LedgerError::InvalidTransition {
                from: JournalStatus::Cancelled,
                to: JournalStatus::Draft,
            }),
        }
    }

    /// Moves a balanced draft to posted and stamps it.
    ///
    /// On any error the entry is left untouched.
    ///
    /// # Errors
    ///
    /// - `AlreadyPosted` if the entry is posted (the stamp is not refreshed)
    /// - `InvalidTransition` if the entry is cancelled
    /// - `UnbalancedEntry` if rounded debits differ from rounded credits
    pub fn post(
        &mut self,
        acting_user: UserId,
        now: DateTime<Utc>,
    ) -> Result<PostingStamp, LedgerError> {
        match self.status {
            JournalStatus::Posted => return Err(LedgerError::AlreadyPosted),
            JournalStatus::Cancelled => {
                return Err(LedgerError::InvalidTransition {
                    from: JournalStatus::Cancelled,
                    to: JournalStatus::Posted,
                });
            }
            JournalStatus::Draft => {}
        }

        let totals = self.totals();
        if !totals.is_balanced() {
            return Err(LedgerError::UnbalancedEntry {
                debit: totals.debit,
                credit: totals.credit,
            });
        }

        self.status = JournalStatus::Posted;
        self.posted_at = Some(now);
        self.posted_by = Some(acting_user);

        Ok(PostingStamp {
            posted_at: now,
            posted_by: acting_user,
        })
    }

    /// Moves a draft to cancelled.
    ///
    /// # Errors
    ///
    /// `AlreadyPosted` for posted entries, `InvalidTransition` for
    /// cancelled ones.
    pub fn cancel(&mut self) -> Result<(), LedgerError> {
        match self.status {
            JournalStatus::Draft => {
                self.status = JournalStatus::Cancelled;
                Ok(())
            }
            JournalStatus::Posted => Err(LedgerError::AlreadyPosted),
            JournalStatus::Cancelled => Err(LedgerError::InvalidTransition {
                from: JournalStatus::Cancelled,
                to: JournalStatus::Cancelled,
            }),
        }
    }
}
