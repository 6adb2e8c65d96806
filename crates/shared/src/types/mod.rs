//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{MAX_MONEY, MONEY_SCALE, MoneyError, parse_money, round_money};
pub use pagination::{PageMeta, PageRequest, PageResponse};
