//! Journal entry repository.
//!
//! Status changes and line edits run inside one database transaction that
//! first takes a row lock on the entry (`SELECT … FOR UPDATE`). Concurrent
//! posts or edits of the same entry queue behind that lock, so the balance
//! check always sees the lines that get posted.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr, TransactionTrait,
};
use tenora_core::ledger::{JournalEntry, JournalLine, LedgerError, LineTotals};
use tenora_shared::types::{
    AccountId, BranchId, JournalEntryId, OrganizationId, PageRequest, PageResponse, UserId,
    round_money,
};
use tracing::info;
use uuid::Uuid;

use super::branch;
use super::error::RepositoryError;
use crate::entities::{
    accounts, journal_entries, journal_entry_lines, organizations,
    sea_orm_active_enums::JournalStatus,
};
use crate::scope::in_tenant;

/// Filter options for listing journal entries.
#[derive(Debug, Clone, Default)]
pub struct JournalEntryFilter {
    /// Filter by organization.
    pub organization_id: Option<Uuid>,
    /// Filter by branch.
    pub branch_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<JournalStatus>,
    /// Entry date range start (inclusive).
    pub from_date: Option<NaiveDate>,
    /// Entry date range end (inclusive).
    pub to_date: Option<NaiveDate>,
    /// Substring of the entry number or reference.
    pub search: Option<String>,
}

/// Input for a single journal line.
#[derive(Debug, Clone)]
pub struct JournalLineInput {
    /// Account ID.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional description.
    pub description: Option<String>,
    /// Line currency; defaults to the entry's.
    pub currency_code: Option<String>,
}

/// Input for creating a draft journal entry.
#[derive(Debug, Clone)]
pub struct CreateJournalEntryInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Optional branch ID.
    pub branch_id: Option<Uuid>,
    /// Entry number (globally unique).
    pub entry_number: String,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Currency; defaults to the organization's.
    pub currency_code: Option<String>,
    /// Lines in entry order.
    pub lines: Vec<JournalLineInput>,
}

/// Journal entry with its lines.
#[derive(Debug, Clone)]
pub struct JournalEntryWithLines {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Lines ordered by line number.
    pub lines: Vec<journal_entry_lines::Model>,
}

impl JournalEntryWithLines {
    /// Converts the rows into the domain entry.
    #[must_use]
    pub fn to_domain(&self) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::from_uuid(self.entry.id),
            organization_id: OrganizationId::from_uuid(self.entry.organization_id),
            branch_id: self.entry.branch_id.map(BranchId::from_uuid),
            status: self.entry.status.into(),
            posted_at: self.entry.posted_at.map(|at| at.with_timezone(&Utc)),
            posted_by: self.entry.posted_by.map(UserId::from_uuid),
            lines: self
                .lines
                .iter()
                .map(|line| JournalLine {
                    account_id: AccountId::from_uuid(line.account_id),
                    debit: line.debit,
                    credit: line.credit,
                    description: line.description.clone(),
                })
                .collect(),
        }
    }

    /// Rounded debit and credit totals.
    #[must_use]
    pub fn totals(&self) -> LineTotals {
        self.to_domain().totals()
    }
}

/// Journal entry repository.
#[derive(Debug, Clone)]
pub struct JournalEntryRepository {
    db: DatabaseConnection,
}

impl JournalEntryRepository {
    /// Creates a new journal entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the tenant's journal entries, newest entry date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &JournalEntryFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<journal_entries::Model>, RepositoryError> {
        let mut query = journal_entries::Entity::find()
            .filter(in_tenant(journal_entries::Column::OrganizationId, tenant_id))
            .filter(journal_entries::Column::DeletedAt.is_null());

        if let Some(organization_id) = filter.organization_id {
            query = query.filter(journal_entries::Column::OrganizationId.eq(organization_id));
        }
        if let Some(branch_id) = filter.branch_id {
            query = query.filter(journal_entries::Column::BranchId.eq(branch_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(journal_entries::Column::Status.eq(status));
        }
        if let Some(from_date) = filter.from_date {
            query = query.filter(journal_entries::Column::EntryDate.gte(from_date));
        }
        if let Some(to_date) = filter.to_date {
            query = query.filter(journal_entries::Column::EntryDate.lte(to_date));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(journal_entries::Column::EntryNumber.contains(search))
                    .add(journal_entries::Column::Reference.contains(search)),
            );
        }

        let paginator = query
            .order_by_desc(journal_entries::Column::EntryDate)
            .order_by_desc(journal_entries::Column::CreatedAt)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let entries = paginator.fetch_page(page.page_index()).await?;

        Ok(PageResponse::new(entries, page, total))
    }

    /// Gets an entry of the tenant with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when the entry does not exist, is deleted, or
    /// belongs to another tenant.
    pub async fn get(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<JournalEntryWithLines, RepositoryError> {
        let entry = journal_entries::Entity::find_by_id(id)
            .filter(in_tenant(journal_entries::Column::OrganizationId, tenant_id))
            .filter(journal_entries::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;

        let lines = load_lines(&self.db, id).await?;
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Creates a draft entry with its lines.
    ///
    /// # Errors
    ///
    /// - `OrganizationNotFound` if the organization is not the tenant's
    /// - `BranchNotFound` if the branch is not in the organization
    /// - `AccountNotFound` if a line references an account outside it
    /// - `DuplicateEntryNumber` if the number is taken
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CreateJournalEntryInput,
    ) -> Result<JournalEntryWithLines, RepositoryError> {
        let txn = self.db.begin().await?;

        let organization = organizations::Entity::find_by_id(input.organization_id)
            .filter(organizations::Column::TenantId.eq(tenant_id))
            .filter(organizations::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or(RepositoryError::OrganizationNotFound(input.organization_id))?;

        if let Some(branch_id) = input.branch_id {
            let branch = branch::find_in_tenant(&txn, tenant_id, branch_id).await?;
            if branch.organization_id != organization.id {
                return Err(RepositoryError::BranchNotFound(branch_id));
            }
        }

        let taken = journal_entries::Entity::find()
            .filter(journal_entries::Column::EntryNumber.eq(input.entry_number.as_str()))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(RepositoryError::DuplicateEntryNumber(input.entry_number));
        }

        ensure_accounts_in_organization(&txn, organization.id, &input.lines).await?;

        let now = Utc::now().into();
        let currency_code = input
            .currency_code
            .unwrap_or_else(|| organization.currency_code.clone());

        let entry_number = input.entry_number.clone();
        let entry = journal_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization.id),
            branch_id: Set(input.branch_id),
            entry_number: Set(input.entry_number),
            entry_date: Set(input.entry_date),
            reference: Set(input.reference),
            description: Set(input.description),
            currency_code: Set(currency_code),
            status: Set(JournalStatus::Draft),
            posted_at: Set(None),
            posted_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|err| match err.sql_err() {
            // A concurrent create took the number after the check above.
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                RepositoryError::DuplicateEntryNumber(entry_number)
            }
            _ => err.into(),
        })?;

        let lines = insert_lines(&txn, &entry, input.lines).await?;

        txn.commit().await?;

        info!(
            journal_entry_id = %entry.id,
            entry_number = %entry.entry_number,
            "journal entry created"
        );
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Replaces all lines of a draft entry.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the entry is not the tenant's
    /// - `AlreadyPosted` if the entry is posted
    /// - `InvalidTransition` if the entry is cancelled
    /// - `AccountNotFound` if a line references an account outside the
    ///   entry's organization
    pub async fn replace_lines(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        lines: Vec<JournalLineInput>,
    ) -> Result<JournalEntryWithLines, RepositoryError> {
        let txn = self.db.begin().await?;

        let entry = lock_entry(&txn, tenant_id, id).await?;
        let current = JournalEntryWithLines {
            entry,
            lines: Vec::new(),
        };
        current.to_domain().ensure_mutable()?;

        ensure_accounts_in_organization(&txn, current.entry.organization_id, &lines).await?;

        journal_entry_lines::Entity::delete_many()
            .filter(journal_entry_lines::Column::JournalEntryId.eq(id))
            .exec(&txn)
            .await?;

        let mut active: journal_entries::ActiveModel = current.entry.into();
        active.updated_at = Set(Utc::now().into());
        let entry = active.update(&txn).await?;

        let lines = insert_lines(&txn, &entry, lines).await?;

        txn.commit().await?;

        info!(journal_entry_id = %id, lines = lines.len(), "journal lines replaced");
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Soft-deletes an entry that is not posted.
    ///
    /// # Errors
    ///
    /// `EntryNotFound`, or `AlreadyPosted` for posted entries.
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let entry = lock_entry(&txn, tenant_id, id).await?;
        if entry.status == JournalStatus::Posted {
            return Err(LedgerError::AlreadyPosted.into());
        }

        let mut active: journal_entries::ActiveModel = entry.into();
        let now = Utc::now().into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(journal_entry_id = %id, "journal entry deleted");
        Ok(())
    }

    /// Posts a balanced draft entry.
    ///
    /// Runs lock, load, check and stamp in one transaction. On any error
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the entry is not the tenant's
    /// - `AlreadyPosted` if it is already posted
    /// - `InvalidTransition` if it is cancelled
    /// - `UnbalancedEntry` if rounded debits differ from rounded credits
    pub async fn post(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        acting_user: UserId,
        now: DateTime<Utc>,
    ) -> Result<JournalEntryWithLines, RepositoryError> {
        let txn = self.db.begin().await?;

        let entry = lock_entry(&txn, tenant_id, id).await?;
        let lines = load_lines(&txn, id).await?;
        let loaded = JournalEntryWithLines { entry, lines };

        let mut domain = loaded.to_domain();
        let stamp = domain.post(acting_user, now)?;

        let mut active: journal_entries::ActiveModel = loaded.entry.into();
        active.status = Set(domain.status.into());
        active.posted_at = Set(Some(stamp.posted_at.into()));
        active.posted_by = Set(Some(stamp.posted_by.into_inner()));
        active.updated_at = Set(now.into());
        let entry = active.update(&txn).await?;

        txn.commit().await?;

        info!(journal_entry_id = %id, posted_by = %acting_user, "journal entry posted");
        Ok(JournalEntryWithLines {
            entry,
            lines: loaded.lines,
        })
    }

    /// Cancels a draft entry.
    ///
    /// # Errors
    ///
    /// `EntryNotFound`, `AlreadyPosted` for posted entries, or
    /// `InvalidTransition` for cancelled ones.
    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<JournalEntryWithLines, RepositoryError> {
        let txn = self.db.begin().await?;

        let entry = lock_entry(&txn, tenant_id, id).await?;
        let lines = load_lines(&txn, id).await?;
        let loaded = JournalEntryWithLines { entry, lines };

        let mut domain = loaded.to_domain();
        domain.cancel()?;

        let mut active: journal_entries::ActiveModel = loaded.entry.into();
        active.status = Set(domain.status.into());
        active.updated_at = Set(Utc::now().into());
        let entry = active.update(&txn).await?;

        txn.commit().await?;

        info!(journal_entry_id = %id, "journal entry cancelled");
        Ok(JournalEntryWithLines {
            entry,
            lines: loaded.lines,
        })
    }
}

/// Loads a live entry of the tenant and locks its row until the transaction
/// ends.
async fn lock_entry(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<journal_entries::Model, RepositoryError> {
    journal_entries::Entity::find_by_id(id)
        .filter(in_tenant(journal_entries::Column::OrganizationId, tenant_id))
        .filter(journal_entries::Column::DeletedAt.is_null())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| LedgerError::EntryNotFound(id).into())
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
) -> Result<Vec<journal_entry_lines::Model>, RepositoryError> {
    Ok(journal_entry_lines::Entity::find()
        .filter(journal_entry_lines::Column::JournalEntryId.eq(entry_id))
        .order_by_asc(journal_entry_lines::Column::LineNumber)
        .all(conn)
        .await?)
}

/// Every referenced account must be a live account of the organization.
async fn ensure_accounts_in_organization(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    lines: &[JournalLineInput],
) -> Result<(), RepositoryError> {
    let wanted: HashSet<Uuid> = lines.iter().map(|line| line.account_id).collect();
    if wanted.is_empty() {
        return Ok(());
    }

    let found: HashSet<Uuid> = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(wanted.iter().copied()))
        .filter(accounts::Column::OrganizationId.eq(organization_id))
        .filter(accounts::Column::DeletedAt.is_null())
        .select_only()
        .column(accounts::Column::Id)
        .into_tuple::<Uuid>()
        .all(txn)
        .await?
        .into_iter()
        .collect();

    match lines.iter().find(|line| !found.contains(&line.account_id)) {
        Some(line) => Err(LedgerError::AccountNotFound(line.account_id).into()),
        None => Ok(()),
    }
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    entry: &journal_entries::Model,
    lines: Vec<JournalLineInput>,
) -> Result<Vec<journal_entry_lines::Model>, RepositoryError> {
    let now = Utc::now().into();
    let mut inserted = Vec::with_capacity(lines.len());

    for (line_number, line) in (1..).zip(lines) {
        let model = journal_entry_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            journal_entry_id: Set(entry.id),
            account_id: Set(line.account_id),
            line_number: Set(line_number),
            debit: Set(round_money(line.debit)),
            credit: Set(round_money(line.credit)),
            description: Set(line.description),
            currency_code: Set(line
                .currency_code
                .unwrap_or_else(|| entry.currency_code.clone())),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;
        inserted.push(model);
    }

    Ok(inserted)
}
