//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every business query is filtered through [`crate::scope`] so rows of other
//! tenants are never returned.

pub mod account;
pub mod branch;
pub mod error;
pub mod journal_entry;
pub mod tenant;

pub use account::AccountRepository;
pub use branch::BranchRepository;
pub use error::RepositoryError;
pub use journal_entry::{
    CreateJournalEntryInput, JournalEntryFilter, JournalEntryRepository, JournalEntryWithLines,
    JournalLineInput,
};
pub use tenant::TenantRepository;

use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use uuid::Uuid;

use crate::entities::organizations;

/// Takes a row lock on the organization for the rest of the transaction.
///
/// Hierarchy moves inside one organization queue behind this lock, so each
/// cycle check reads a parent map no concurrent move can change.
pub(crate) async fn lock_organization<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
) -> Result<(), RepositoryError> {
    organizations::Entity::find_by_id(organization_id)
        .lock_exclusive()
        .one(conn)
        .await?;
    Ok(())
}
