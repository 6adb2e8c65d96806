//! Branch repository.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use tenora_core::hierarchy::would_create_cycle;
use tracing::info;
use uuid::Uuid;

use super::error::RepositoryError;
use super::lock_organization;
use crate::entities::branches;
use crate::scope::in_tenant;

/// Branch repository.
#[derive(Debug, Clone)]
pub struct BranchRepository {
    db: DatabaseConnection,
}

impl BranchRepository {
    /// Creates a new branch repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Moves a branch under a new parent, or to the root.
    ///
    /// # Errors
    ///
    /// - `BranchNotFound` for the branch or the parent
    /// - `BranchCycle` if the move would close a loop
    pub async fn set_parent(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<branches::Model, RepositoryError> {
        let txn = self.db.begin().await?;

        let branch = find_in_tenant(&txn, tenant_id, id).await?;

        if let Some(parent_id) = parent_id {
            lock_organization(&txn, branch.organization_id).await?;

            let parent = find_in_tenant(&txn, tenant_id, parent_id).await?;
            if parent.organization_id != branch.organization_id {
                return Err(RepositoryError::BranchNotFound(parent_id));
            }

            let rows: Vec<(Uuid, Option<Uuid>)> = branches::Entity::find()
                .filter(branches::Column::OrganizationId.eq(branch.organization_id))
                .select_only()
                .column(branches::Column::Id)
                .column(branches::Column::ParentId)
                .into_tuple()
                .all(&txn)
                .await?;
            let parents: HashMap<_, _> = rows.into_iter().collect();

            if would_create_cycle(&parents, id, parent_id) {
                return Err(RepositoryError::BranchCycle(id));
            }
        }

        let mut active: branches::ActiveModel = branch.into();
        active.parent_id = Set(parent_id);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(branch_id = %id, parent_id = ?parent_id, "branch re-parented");
        Ok(updated)
    }
}

/// Finds a live branch owned by the tenant.
pub(crate) async fn find_in_tenant<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<branches::Model, RepositoryError> {
    branches::Entity::find_by_id(id)
        .filter(in_tenant(branches::Column::OrganizationId, tenant_id))
        .filter(branches::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or(RepositoryError::BranchNotFound(id))
}
