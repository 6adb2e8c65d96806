//! Branch hierarchy routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::patch,
};
use serde::Serialize;
use tenora_db::BranchRepository;
use tenora_db::entities::branches;
use uuid::Uuid;

use super::accounts::SetParentRequest;
use crate::{
    AppState,
    error::ApiError,
    middleware::{AuthUser, CurrentTenant},
};

/// Creates the branch routes (requires tenant and auth middleware).
pub fn routes() -> Router<AppState> {
    Router::new().route("/branches/{branch_id}/parent", patch(set_parent))
}

/// A branch after a hierarchy change.
#[derive(Debug, Serialize)]
pub struct BranchResponse {
    /// Identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Parent, or `None` for a root.
    pub parent_id: Option<Uuid>,
    /// Code, unique within the organization.
    pub code: String,
    /// Display name.
    pub name: String,
}

impl From<branches::Model> for BranchResponse {
    fn from(model: branches::Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            parent_id: model.parent_id,
            code: model.code,
            name: model.name,
        }
    }
}

/// PATCH `/branches/{branch_id}/parent`
async fn set_parent(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    _auth: AuthUser,
    Path(branch_id): Path<Uuid>,
    Json(payload): Json<SetParentRequest>,
) -> Result<Json<BranchResponse>, ApiError> {
    let branch = BranchRepository::new(state.db())
        .set_parent(tenant.id(), branch_id, payload.parent_id)
        .await?;
    Ok(Json(branch.into()))
}
