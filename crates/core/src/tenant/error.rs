//! Tenant resolution errors.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced while resolving the tenant of a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantError {
    /// No tenant matched any step of the lookup chain.
    #[error("Tenant not found or invalid tenant context")]
    TenantNotFound,

    /// A tenant was found but is not active or has expired.
    #[error("Tenant {0} is not active or has expired")]
    TenantInactive(Uuid),

    /// The tenant store failed.
    #[error("Tenant store error: {0}")]
    Store(String),
}

impl TenantError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TenantNotFound => "TENANT_NOT_FOUND",
            Self::TenantInactive(_) => "TENANT_INACTIVE",
            Self::Store(_) => "TENANT_STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::TenantNotFound => 404,
            Self::TenantInactive(_) => 403,
            Self::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_inactive_are_distinct() {
        let not_found = TenantError::TenantNotFound;
        let inactive = TenantError::TenantInactive(Uuid::nil());

        assert_eq!(not_found.http_status_code(), 404);
        assert_eq!(inactive.http_status_code(), 403);
        assert_ne!(not_found.error_code(), inactive.error_code());
    }

    #[test]
    fn test_store_error_is_internal() {
        let err = TenantError::Store("connection reset".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.to_string(), "Tenant store error: connection reset");
    }
}
