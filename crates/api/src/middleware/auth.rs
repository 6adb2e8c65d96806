//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tenora_core::tenant::TenantContext;
use tenora_shared::{AppError, Claims, JwtError};
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// Runs after the tenant middleware. A token issued for one tenant is
/// refused on requests that resolved to another.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError(AppError::Unauthorized(
            "Authorization header with Bearer token is required".to_string(),
        ))
        .into_response();
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(JwtError::Expired) => {
            return ApiError(AppError::Unauthorized("Token has expired".to_string())).into_response();
        }
        Err(_) => {
            return ApiError(AppError::Unauthorized(
                "Invalid or malformed token".to_string(),
            ))
            .into_response();
        }
    };

    if let Some(context) = request.extensions().get::<TenantContext>()
        && context.tenant_id().into_inner() != claims.tenant_id()
    {
        warn!(
            user_id = %claims.user_id(),
            token_tenant = %claims.tenant_id(),
            request_tenant = %context.tenant_id(),
            "token used against another tenant"
        );
        return ApiError(AppError::Forbidden(
            "Token was not issued for this tenant".to_string(),
        ))
        .into_response();
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> uuid::Uuid {
        self.0.user_id()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::Unauthorized("Authentication required".to_string())))
    }
}
