//! Tenant introspection.

use axum::{Json, Router, routing::get};
use serde::Serialize;
use tenora_core::tenant::{ResolvedBy, Tenant};

use crate::{AppState, middleware::CurrentTenant};

/// The tenant the request resolved to.
#[derive(Debug, Serialize)]
pub struct CurrentTenantResponse {
    /// The tenant.
    #[serde(flatten)]
    pub tenant: Tenant,
    /// Lookup step that matched.
    pub resolved_by: ResolvedBy,
}

/// GET `/tenants/current`
async fn current_tenant(CurrentTenant(context): CurrentTenant) -> Json<CurrentTenantResponse> {
    Json(CurrentTenantResponse {
        tenant: context.tenant,
        resolved_by: context.resolved_by,
    })
}

/// Creates tenant routes (tenant middleware applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new().route("/tenants/current", get(current_tenant))
}
