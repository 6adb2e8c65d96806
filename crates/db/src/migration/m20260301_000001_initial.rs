//! Initial database migration.
//!
//! Creates the tenant, organization, chart of accounts and journal tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY
        // ============================================================
        db.execute_unprepared(TENANTS_SQL).await?;
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(BRANCHES_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRY_LINES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE tenant_status AS ENUM ('active', 'inactive', 'suspended');
CREATE TYPE record_status AS ENUM ('active', 'inactive');
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'revenue', 'expense');
CREATE TYPE journal_status AS ENUM ('draft', 'posted', 'cancelled');
";

const TENANTS_SQL: &str = r"
CREATE TABLE tenants (
    id          UUID PRIMARY KEY,
    name        VARCHAR(255) NOT NULL,
    subdomain   VARCHAR(63) NOT NULL,
    domain      VARCHAR(255),
    status      tenant_status NOT NULL DEFAULT 'active',
    expires_at  TIMESTAMPTZ,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at  TIMESTAMPTZ
);

CREATE UNIQUE INDEX tenants_subdomain_key ON tenants (LOWER(subdomain));
CREATE UNIQUE INDEX tenants_domain_key ON tenants (LOWER(domain)) WHERE domain IS NOT NULL;
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id             UUID PRIMARY KEY,
    tenant_id      UUID NOT NULL REFERENCES tenants(id) ON DELETE RESTRICT,
    name           VARCHAR(255) NOT NULL,
    code           VARCHAR(50) NOT NULL,
    currency_code  CHAR(3) NOT NULL,
    status         record_status NOT NULL DEFAULT 'active',
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at     TIMESTAMPTZ,
    UNIQUE (tenant_id, code)
);

CREATE INDEX organizations_tenant_id_idx ON organizations (tenant_id);
";

const BRANCHES_SQL: &str = r"
CREATE TABLE branches (
    id               UUID PRIMARY KEY,
    organization_id  UUID NOT NULL REFERENCES organizations(id) ON DELETE RESTRICT,
    parent_id        UUID REFERENCES branches(id) ON DELETE SET NULL,
    name             VARCHAR(255) NOT NULL,
    code             VARCHAR(50) NOT NULL,
    status           record_status NOT NULL DEFAULT 'active',
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at       TIMESTAMPTZ,
    UNIQUE (organization_id, code),
    CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX branches_organization_id_idx ON branches (organization_id);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id               UUID PRIMARY KEY,
    organization_id  UUID NOT NULL REFERENCES organizations(id) ON DELETE RESTRICT,
    parent_id        UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    code             VARCHAR(50) NOT NULL,
    name             VARCHAR(255) NOT NULL,
    account_type     account_type NOT NULL,
    currency_code    CHAR(3) NOT NULL,
    is_active        BOOLEAN NOT NULL DEFAULT TRUE,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at       TIMESTAMPTZ,
    UNIQUE (organization_id, code),
    CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX accounts_organization_id_idx ON accounts (organization_id);
CREATE INDEX accounts_parent_id_idx ON accounts (parent_id);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id               UUID PRIMARY KEY,
    organization_id  UUID NOT NULL REFERENCES organizations(id) ON DELETE RESTRICT,
    branch_id        UUID REFERENCES branches(id) ON DELETE SET NULL,
    entry_number     VARCHAR(50) NOT NULL UNIQUE,
    entry_date       DATE NOT NULL,
    reference        VARCHAR(255),
    description      TEXT,
    currency_code    CHAR(3) NOT NULL,
    status           journal_status NOT NULL DEFAULT 'draft',
    posted_at        TIMESTAMPTZ,
    posted_by        UUID,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at       TIMESTAMPTZ,
    CHECK ((status = 'posted') = (posted_at IS NOT NULL))
);

CREATE INDEX journal_entries_organization_id_idx ON journal_entries (organization_id, entry_date DESC);
CREATE INDEX journal_entries_status_idx ON journal_entries (status);
";

const JOURNAL_ENTRY_LINES_SQL: &str = r"
CREATE TABLE journal_entry_lines (
    id                UUID PRIMARY KEY,
    journal_entry_id  UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id        UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    line_number       INTEGER NOT NULL,
    debit             NUMERIC(19, 2) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit            NUMERIC(19, 2) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    description       TEXT,
    currency_code     CHAR(3) NOT NULL,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (journal_entry_id, line_number)
);

CREATE INDEX journal_entry_lines_account_id_idx ON journal_entry_lines (account_id);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS journal_entry_lines;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS branches;
DROP TABLE IF EXISTS organizations;
DROP TABLE IF EXISTS tenants;
DROP TYPE IF EXISTS journal_status;
DROP TYPE IF EXISTS account_type;
DROP TYPE IF EXISTS record_status;
DROP TYPE IF EXISTS tenant_status;
";
