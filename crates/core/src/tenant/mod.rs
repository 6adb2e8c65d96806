//! Tenant model and per-request tenant resolution.
//!
//! A request is scoped to exactly one tenant. The resolver walks a fixed
//! lookup chain (ID header, subdomain header, host subdomain, custom domain)
//! and the caller attaches the result to that request's own context.

pub mod error;
pub mod host;
pub mod resolver;
pub mod types;

pub use error::TenantError;
pub use host::{host_subdomain, normalize_host};
pub use resolver::{
    ResolveRequest, ResolvedBy, TENANT_ID_HEADER, TENANT_SUBDOMAIN_HEADER, TenantContext,
    TenantResolver, TenantSource,
};
pub use types::{Tenant, TenantStatus};
