//! Core business logic for Tenora.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `tenant` - Tenant model, activity rule and per-request tenant resolution
//! - `ledger` - Journal entry state machine and double-entry balance rules
//! - `hierarchy` - Parent/child cycle detection for accounts and branches

pub mod hierarchy;
pub mod ledger;
pub mod tenant;
