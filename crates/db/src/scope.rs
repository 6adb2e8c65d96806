//! Tenant scoping for business data queries.
//!
//! Business rows carry an `organization_id`. A row belongs to the current
//! tenant when its organization does, so every tenant-scoped query filters on
//! `organization_id IN (SELECT id FROM organizations WHERE tenant_id = ?)`.
//!
//! # Usage
//!
//! ```ignore
//! use tenora_db::scope::in_tenant;
//!
//! let entries = journal_entries::Entity::find()
//!     .filter(in_tenant(journal_entries::Column::OrganizationId, tenant_id))
//!     .all(&db)
//!     .await?;
//! ```

use sea_orm::sea_query::{Query, SelectStatement, SimpleExpr};
use sea_orm::ColumnTrait;
use uuid::Uuid;

use crate::entities::organizations;

/// Sub-select of the live organization IDs owned by a tenant.
#[must_use]
pub fn tenant_organizations(tenant_id: Uuid) -> SelectStatement {
    Query::select()
        .column(organizations::Column::Id)
        .from(organizations::Entity)
        .and_where(organizations::Column::TenantId.eq(tenant_id))
        .and_where(organizations::Column::DeletedAt.is_null())
        .to_owned()
}

/// Restricts `column` (an organization foreign key) to the tenant's
/// organizations.
#[must_use]
pub fn in_tenant<C: ColumnTrait>(column: C, tenant_id: Uuid) -> SimpleExpr {
    column.in_subquery(tenant_organizations(tenant_id))
}
