//! Tenant repository, the database-backed tenant lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tenora_core::tenant::{Tenant, TenantError, TenantSource};
use tenora_shared::types::TenantId;

use crate::entities::{sea_orm_active_enums::TenantStatus, tenants};

/// Tenant repository.
///
/// Soft-deleted tenants are invisible to every lookup.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_one(&self, condition: Condition) -> Result<Option<Tenant>, DbErr> {
        let model = tenants::Entity::find()
            .filter(tenants::Column::DeletedAt.is_null())
            .filter(condition)
            .one(&self.db)
            .await?;
        Ok(model.map(Tenant::from))
    }
}

/// Status is active and the tenant has not expired at `now`.
fn active_at(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(tenants::Column::Status.eq(TenantStatus::Active))
        .add(
            Condition::any()
                .add(tenants::Column::ExpiresAt.is_null())
                .add(tenants::Column::ExpiresAt.gt(now)),
        )
}

/// Case-insensitive match on a text column.
fn lower_eq(column: tenants::Column, value: &str) -> Condition {
    Condition::all().add(
        Expr::expr(Func::lower(Expr::col((tenants::Entity, column)))).eq(value.to_lowercase()),
    )
}

fn store_error(err: DbErr) -> TenantError {
    TenantError::Store(err.to_string())
}

#[async_trait]
impl TenantSource for TenantRepository {
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantError> {
        self.find_one(Condition::all().add(tenants::Column::Id.eq(id.into_inner())))
            .await
            .map_err(store_error)
    }

    async fn find_active_by_subdomain(
        &self,
        subdomain: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Tenant>, TenantError> {
        self.find_one(lower_eq(tenants::Column::Subdomain, subdomain).add(active_at(now)))
            .await
            .map_err(store_error)
    }

    async fn find_active_by_domain(
        &self,
        domain: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Tenant>, TenantError> {
        self.find_one(lower_eq(tenants::Column::Domain, domain).add(active_at(now)))
            .await
            .map_err(store_error)
    }
}

impl From<tenants::Model> for Tenant {
    fn from(model: tenants::Model) -> Self {
        Self {
            id: TenantId::from_uuid(model.id),
            name: model.name,
            subdomain: model.subdomain,
            domain: model.domain,
            status: model.status.into(),
            expires_at: model.expires_at.map(|at| at.with_timezone(&Utc)),
        }
    }
}
