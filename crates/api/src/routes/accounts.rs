//! Chart of accounts routes: balances and hierarchy.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use tenora_core::ledger::{AccountBalance, AccountType};
use tenora_db::AccountRepository;
use tenora_db::entities::accounts;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::{AuthUser, CurrentTenant},
};

/// Creates the account routes (requires tenant and auth middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/{account_id}/balance", get(get_balance))
        .route("/accounts/{account_id}/parent", patch(set_parent))
}

/// Request body for moving an account.
#[derive(Debug, Deserialize)]
pub struct SetParentRequest {
    /// New parent, or `null` to make the account a root.
    pub parent_id: Option<Uuid>,
}

/// An account after a hierarchy change.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
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
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Currency code.
    pub currency_code: String,
    /// Whether the account accepts postings.
    pub is_active: bool,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            parent_id: model.parent_id,
            code: model.code,
            name: model.name,
            account_type: model.account_type.into(),
            currency_code: model.currency_code,
            is_active: model.is_active,
        }
    }
}

/// GET `/accounts/{account_id}/balance`
///
/// Computed from the ledger on every call.
async fn get_balance(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    _auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountBalance>, ApiError> {
    let balance = AccountRepository::new(state.db())
        .balance(tenant.id(), account_id)
        .await?;
    Ok(Json(balance))
}

/// PATCH `/accounts/{account_id}/parent`
async fn set_parent(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    _auth: AuthUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<SetParentRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = AccountRepository::new(state.db())
        .set_parent(tenant.id(), account_id, payload.parent_id)
        .await?;
    Ok(Json(account.into()))
}
