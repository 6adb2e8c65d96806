//! `SeaORM` entity prelude.

pub use super::accounts::Entity as Accounts;
pub use super::branches::Entity as Branches;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_entry_lines::Entity as JournalEntryLines;
pub use super::organizations::Entity as Organizations;
pub use super::tenants::Entity as Tenants;
