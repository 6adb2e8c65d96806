//! HTTP error responses.
//!
//! Every handler error becomes [`ApiError`], which renders as
//! `{"error": CODE, "message": text}` with the error's status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tenora_core::ledger::LedgerError;
use tenora_core::tenant::TenantError;
use tenora_db::RepositoryError;
use tenora_shared::AppError;
use tenora_shared::types::MoneyError;
use tracing::{error, warn};

/// Error returned by handlers and middleware.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Shorthand for a 400 validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::Store(message) => Self(AppError::Internal(message)),
            other => Self(AppError::domain(
                other.http_status_code(),
                other.error_code(),
                &other,
            )),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(AppError::domain(
            err.http_status_code(),
            err.error_code(),
            &err,
        ))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Ledger(e) => e.into(),
            RepositoryError::OrganizationNotFound(_) => {
                Self(AppError::domain(404, "ORGANIZATION_NOT_FOUND", &err))
            }
            RepositoryError::BranchNotFound(_) => {
                Self(AppError::domain(404, "BRANCH_NOT_FOUND", &err))
            }
            RepositoryError::BranchCycle(_) => Self(AppError::domain(422, "BRANCH_CYCLE", &err)),
            RepositoryError::DuplicateEntryNumber(_) => {
                Self(AppError::domain(422, "DUPLICATE_ENTRY_NUMBER", &err))
            }
            RepositoryError::Database(e) => Self(AppError::Database(e.to_string())),
        }
    }
}

impl From<MoneyError> for ApiError {
    fn from(err: MoneyError) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_internal() {
            error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            warn!(code = self.0.error_code(), error = %self.0, "request rejected");
            match &self.0 {
                AppError::Domain { message, .. } => message.clone(),
                other => other.to_string(),
            }
        };

        (
            status,
            Json(json!({ "error": self.0.error_code(), "message": message })),
        )
            .into_response()
    }
}
