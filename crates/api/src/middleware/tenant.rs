//! Tenant resolution middleware.
//!
//! Resolves the request's tenant once, before any handler runs, and stores
//! the [`TenantContext`] in that request's extensions. Nothing about the
//! tenant is kept outside the request.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::HOST, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tenora_core::tenant::{
    ResolveRequest, TENANT_ID_HEADER, TENANT_SUBDOMAIN_HEADER, TenantContext, TenantResolver,
};
use tenora_shared::AppError;
use tracing::debug;

use crate::{AppState, error::ApiError};

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Middleware that resolves the tenant or rejects the request.
///
/// - 404 `TENANT_NOT_FOUND` when no lookup step matches
/// - 403 `TENANT_INACTIVE` when the tenant is suspended or expired
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // The body is not `Sync`; no borrow of the request may cross the await.
    let headers = request.headers();
    let tenant_id = header_str(headers, TENANT_ID_HEADER).map(str::to_owned);
    let subdomain = header_str(headers, TENANT_SUBDOMAIN_HEADER).map(str::to_owned);
    let host = header_str(headers, HOST.as_str())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default()
        .to_owned();

    let lookup = ResolveRequest {
        tenant_id: tenant_id.as_deref(),
        subdomain: subdomain.as_deref(),
        host: &host,
    };

    let resolved = TenantResolver::new(state.tenants.clone())
        .resolve(&lookup, Utc::now())
        .await;

    match resolved {
        Ok(context) => {
            debug!(
                tenant_id = %context.tenant_id(),
                resolved_by = context.resolved_by.as_str(),
                "tenant resolved"
            );
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Extractor for the tenant resolved by [`tenant_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub TenantContext);

impl CurrentTenant {
    /// Returns the tenant ID as a raw UUID for repository calls.
    #[must_use]
    pub const fn id(&self) -> uuid::Uuid {
        self.0.tenant.id.into_inner()
    }
}

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .map(CurrentTenant)
            .ok_or_else(|| ApiError(AppError::Internal("tenant context missing".to_string())))
    }
}
