//! Request middleware and the extractors that read what it stores.

pub mod auth;
pub mod tenant;

pub use auth::{AuthUser, auth_middleware};
pub use tenant::{CurrentTenant, tenant_middleware};
