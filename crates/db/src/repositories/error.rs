//! Error type shared by the ledger repositories.

use sea_orm::DbErr;
use tenora_core::ledger::LedgerError;
use uuid::Uuid;

/// Error types for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Organization not found in the current tenant.
    #[error("Organization not found: {0}")]
    OrganizationNotFound(Uuid),

    /// Branch not found in the organization.
    #[error("Branch not found: {0}")]
    BranchNotFound(Uuid),

    /// Re-parenting would create a cycle in the branch tree.
    #[error("Branch {0} cannot be moved under one of its own descendants")]
    BranchCycle(Uuid),

    /// Entry number already in use.
    #[error("Entry number '{0}' already exists")]
    DuplicateEntryNumber(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}
