//! Account repository for chart of accounts database operations.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use tenora_core::hierarchy::would_create_cycle;
use tenora_core::ledger::{AccountBalance, LedgerError};
use tenora_shared::types::AccountId;
use tracing::info;
use uuid::Uuid;

use super::error::RepositoryError;
use super::lock_organization;
use crate::entities::{accounts, journal_entry_lines};
use crate::scope::in_tenant;

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a live account owned by the tenant.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when the account does not exist, is deleted,
    /// or belongs to another tenant.
    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<accounts::Model, RepositoryError> {
        find_in_tenant(&self.db, tenant_id, id).await
    }

    /// Computes an account's balance from all of its journal lines.
    ///
    /// Debit and credit are summed in SQL; the account type decides the
    /// sign. The result is never cached.
    ///
    /// Every line on the account counts, whatever its entry's status: lines
    /// of draft, cancelled and soft-deleted entries are included.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a database error.
    pub async fn balance(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<AccountBalance, RepositoryError> {
        let account = find_in_tenant(&self.db, tenant_id, id).await?;

        let (debit, credit): (Option<Decimal>, Option<Decimal>) =
            journal_entry_lines::Entity::find()
                .filter(journal_entry_lines::Column::AccountId.eq(id))
                .select_only()
                .column_as(Expr::col(journal_entry_lines::Column::Debit).sum(), "debit")
                .column_as(Expr::col(journal_entry_lines::Column::Credit).sum(), "credit")
                .into_tuple()
                .one(&self.db)
                .await?
                .unwrap_or_default();

        Ok(AccountBalance::from_totals(
            AccountId::from_uuid(account.id),
            account.account_type.into(),
            debit.unwrap_or_default(),
            credit.unwrap_or_default(),
        ))
    }

    /// Moves an account under a new parent, or to the root when `parent_id`
    /// is `None`.
    ///
    /// The parent must be in the same organization, and must not be the
    /// account itself or one of its descendants. Moves within one
    /// organization are serialized on the organization row.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` for the account or the parent
    /// - `AccountCycle` if the move would close a loop
    pub async fn set_parent(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<accounts::Model, RepositoryError> {
        let txn = self.db.begin().await?;

        let account = find_in_tenant(&txn, tenant_id, id).await?;

        if let Some(parent_id) = parent_id {
            lock_organization(&txn, account.organization_id).await?;

            let parent = find_in_tenant(&txn, tenant_id, parent_id).await?;
            if parent.organization_id != account.organization_id {
                return Err(LedgerError::AccountNotFound(parent_id).into());
            }

            let parents = parent_map(&txn, account.organization_id).await?;
            if would_create_cycle(&parents, id, parent_id) {
                return Err(LedgerError::AccountCycle(id).into());
            }
        }

        let mut active: accounts::ActiveModel = account.into();
        active.parent_id = Set(parent_id);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(account_id = %id, parent_id = ?parent_id, "account re-parented");
        Ok(updated)
    }
}

async fn find_in_tenant<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<accounts::Model, RepositoryError> {
    accounts::Entity::find_by_id(id)
        .filter(in_tenant(accounts::Column::OrganizationId, tenant_id))
        .filter(accounts::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(id).into())
}

/// Parent links of every account in the organization.
async fn parent_map<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
) -> Result<HashMap<Uuid, Option<Uuid>>, RepositoryError> {
    let rows: Vec<(Uuid, Option<Uuid>)> = accounts::Entity::find()
        .filter(accounts::Column::OrganizationId.eq(organization_id))
        .select_only()
        .column(accounts::Column::Id)
        .column(accounts::Column::ParentId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows.into_iter().collect())
}
