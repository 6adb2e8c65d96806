//! Ledger error types for posting and state errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::JournalStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Posting Errors ==========
    /// Journal entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Rounded debit total.
        debit: Decimal,
        /// Rounded credit total.
        credit: Decimal,
    },

    /// Journal entry has already been posted.
    #[error("Journal entry has already been posted")]
    AlreadyPosted,

    /// Status change not allowed by the journal state machine.
    #[error("Cannot move journal entry from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: JournalStatus,
        /// Requested status.
        to: JournalStatus,
    },

    // ========== Account Errors ==========
    /// Re-parenting would create a cycle in the account tree.
    #[error("Account {0} cannot be moved under one of its own descendants")]
    AccountCycle(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    // ========== Lookup Errors ==========
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(Uuid),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::AlreadyPosted => "ALREADY_POSTED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AccountCycle(_) => "ACCOUNT_CYCLE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 422 Unprocessable Entity - business rule violations
            Self::UnbalancedEntry { .. }
            | Self::AlreadyPosted
            | Self::InvalidTransition { .. }
            | Self::AccountCycle(_) => 422,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::EntryNotFound(_) => 404,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::AlreadyPosted.error_code(), "ALREADY_POSTED");
        assert_eq!(
            LedgerError::UnbalancedEntry {
                debit: dec!(150.00),
                credit: dec!(100.00),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::AccountCycle(Uuid::nil()).error_code(),
            "ACCOUNT_CYCLE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::AlreadyPosted.http_status_code(), 422);
        assert_eq!(
            LedgerError::InvalidTransition {
                from: JournalStatus::Cancelled,
                to: JournalStatus::Posted,
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::EntryNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedEntry {
            debit: dec!(150.00),
            credit: dec!(100.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 150.00, Credit: 100.00"
        );

        let err = LedgerError::InvalidTransition {
            from: JournalStatus::Cancelled,
            to: JournalStatus::Posted,
        };
        assert_eq!(err.to_string(), "Cannot move journal entry from cancelled to posted");
    }
}
