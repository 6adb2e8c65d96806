//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod branches;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod organizations;
pub mod sea_orm_active_enums;
pub mod tenants;
