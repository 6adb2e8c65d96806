//! Journal entry routes.
//!
//! Entries are created and edited as drafts. Posting goes through
//! `POST /journal-entries/{id}/post`, which checks the balance and stamps the
//! entry in one transaction.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tenora_core::ledger::JournalStatus;
use tenora_db::JournalEntryRepository;
use tenora_db::entities::{journal_entries, journal_entry_lines};
use tenora_db::repositories::{
    CreateJournalEntryInput, JournalEntryFilter, JournalEntryWithLines, JournalLineInput,
};
use tenora_shared::types::{PageRequest, PageResponse, UserId, parse_money};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::{AuthUser, CurrentTenant},
};

/// Fewest lines a journal entry may be created with.
pub const MIN_LINES: usize = 2;

/// Creates the journal entry routes (requires tenant and auth middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal-entries", get(list_entries).post(create_entry))
        .route(
            "/journal-entries/{entry_id}",
            get(get_entry).delete(delete_entry),
        )
        .route("/journal-entries/{entry_id}/lines", put(replace_lines))
        .route("/journal-entries/{entry_id}/post", post(post_entry))
        .route("/journal-entries/{entry_id}/cancel", post(cancel_entry))
}

/// Query parameters for listing entries.
#[derive(Debug, Default, Deserialize)]
pub struct ListEntriesQuery {
    /// Filter by organization.
    pub organization_id: Option<Uuid>,
    /// Filter by branch.
    pub branch_id: Option<Uuid>,
    /// Filter by status: draft, posted, cancelled.
    pub status: Option<String>,
    /// Entry date lower bound (inclusive, YYYY-MM-DD).
    pub from_date: Option<NaiveDate>,
    /// Entry date upper bound (inclusive, YYYY-MM-DD).
    pub to_date: Option<NaiveDate>,
    /// Substring of the entry number or reference.
    pub search: Option<String>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Entries per page (default: 15, max: 100).
    pub per_page: Option<u32>,
}

impl ListEntriesQuery {
    fn filter(&self) -> Result<JournalEntryFilter, ApiError> {
        let status = match self.status.as_deref() {
            Some(raw) => Some(
                JournalStatus::parse(raw)
                    .ok_or_else(|| ApiError::validation(format!("unknown status: {raw}")))?
                    .into(),
            ),
            None => None,
        };

        Ok(JournalEntryFilter {
            organization_id: self.organization_id,
            branch_id: self.branch_id,
            status,
            from_date: self.from_date,
            to_date: self.to_date,
            search: self.search.clone(),
        })
    }
}

/// A journal line as sent by clients.
///
/// Amounts are decimal strings; a missing amount counts as zero.
#[derive(Debug, Deserialize)]
pub struct JournalLineRequest {
    /// Account the line posts to.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: Option<String>,
    /// Credit amount.
    pub credit: Option<String>,
    /// Line memo.
    pub description: Option<String>,
    /// Line currency, defaulting to the entry's.
    pub currency_code: Option<String>,
}

/// Request body for creating an entry.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Owning organization; must belong to the resolved tenant.
    pub organization_id: Uuid,
    /// Optional branch within the organization.
    pub branch_id: Option<Uuid>,
    /// Unique entry number.
    pub entry_number: String,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// External reference.
    pub reference: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Entry currency, defaulting to the organization's.
    pub currency_code: Option<String>,
    /// At least two lines.
    pub lines: Vec<JournalLineRequest>,
}

/// Request body for replacing an entry's lines.
#[derive(Debug, Deserialize)]
pub struct ReplaceLinesRequest {
    /// The new lines, in order.
    pub lines: Vec<JournalLineRequest>,
}

/// Entry header as returned in lists.
#[derive(Debug, Serialize)]
pub struct JournalEntrySummary {
    /// Identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Branch, if any.
    pub branch_id: Option<Uuid>,
    /// Entry number.
    pub entry_number: String,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// External reference.
    pub reference: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Currency code.
    pub currency_code: String,
    /// Lifecycle status.
    pub status: JournalStatus,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// User who posted the entry.
    pub posted_by: Option<Uuid>,
}

impl From<journal_entries::Model> for JournalEntrySummary {
    fn from(model: journal_entries::Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            branch_id: model.branch_id,
            entry_number: model.entry_number,
            entry_date: model.entry_date,
            reference: model.reference,
            description: model.description,
            currency_code: model.currency_code,
            status: model.status.into(),
            posted_at: model.posted_at.map(|at| at.with_timezone(&Utc)),
            posted_by: model.posted_by,
        }
    }
}

/// A stored journal line.
#[derive(Debug, Serialize)]
pub struct JournalLineResponse {
    /// Identifier.
    pub id: Uuid,
    /// Position within the entry, from 1.
    pub line_number: i32,
    /// Account the line posts to.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Description.
    pub description: Option<String>,
    /// Currency code.
    pub currency_code: String,
}

impl From<journal_entry_lines::Model> for JournalLineResponse {
    fn from(model: journal_entry_lines::Model) -> Self {
        Self {
            id: model.id,
            line_number: model.line_number,
            account_id: model.account_id,
            debit: model.debit,
            credit: model.credit,
            description: model.description,
            currency_code: model.currency_code,
        }
    }
}

/// An entry with its lines and rounded totals.
#[derive(Debug, Serialize)]
pub struct JournalEntryDetail {
    /// Entry header.
    #[serde(flatten)]
    pub entry: JournalEntrySummary,
    /// Lines ordered by line number.
    pub lines: Vec<JournalLineResponse>,
    /// Sum of rounded debits.
    pub total_debit: Decimal,
    /// Sum of rounded credits.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

impl From<JournalEntryWithLines> for JournalEntryDetail {
    fn from(loaded: JournalEntryWithLines) -> Self {
        let totals = loaded.totals();
        Self {
            entry: loaded.entry.into(),
            lines: loaded.lines.into_iter().map(Into::into).collect(),
            total_debit: totals.debit,
            total_credit: totals.credit,
            is_balanced: totals.is_balanced(),
        }
    }
}

/// Converts request lines, parsing and rounding amounts.
fn parse_lines(lines: Vec<JournalLineRequest>) -> Result<Vec<JournalLineInput>, ApiError> {
    if lines.len() < MIN_LINES {
        return Err(ApiError::validation(format!(
            "a journal entry needs at least {MIN_LINES} lines"
        )));
    }

    lines
        .into_iter()
        .map(|line| {
            let debit = parse_amount(line.debit.as_deref())?;
            let credit = parse_amount(line.credit.as_deref())?;
            Ok(JournalLineInput {
                account_id: line.account_id,
                debit,
                credit,
                description: line.description,
                currency_code: line.currency_code,
            })
        })
        .collect()
}

fn parse_amount(raw: Option<&str>) -> Result<Decimal, ApiError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => Ok(parse_money(raw)?),
        _ => Ok(Decimal::ZERO),
    }
}

/// GET `/journal-entries`
async fn list_entries(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    _auth: AuthUser,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<PageResponse<JournalEntrySummary>>, ApiError> {
    let filter = query.filter()?;
    let page = PageRequest::from_query(query.page, query.per_page);

    let entries = JournalEntryRepository::new(state.db())
        .list(tenant.id(), &filter, &page)
        .await?;

    Ok(Json(entries.map(Into::into)))
}

/// POST `/journal-entries`
async fn create_entry(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    _auth: AuthUser,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<JournalEntryDetail>), ApiError> {
    let entry_number = payload.entry_number.trim().to_string();
    if entry_number.is_empty() {
        return Err(ApiError::validation("entry_number is required"));
    }

    let input = CreateJournalEntryInput {
        organization_id: payload.organization_id,
        branch_id: payload.branch_id,
        entry_number,
        entry_date: payload.entry_date,
        reference: payload.reference,
        description: payload.description,
        currency_code: payload.currency_code,
        lines: parse_lines(payload.lines)?,
    };

    let created = JournalEntryRepository::new(state.db())
        .create(tenant.id(), input)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET `/journal-entries/{entry_id}`
async fn get_entry(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<JournalEntryDetail>, ApiError> {
    let loaded = JournalEntryRepository::new(state.db())
        .get(tenant.id(), entry_id)
        .await?;
    Ok(Json(loaded.into()))
}

/// PUT `/journal-entries/{entry_id}/lines`
async fn replace_lines(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<ReplaceLinesRequest>,
) -> Result<Json<JournalEntryDetail>, ApiError> {
    let lines = parse_lines(payload.lines)?;
    let updated = JournalEntryRepository::new(state.db())
        .replace_lines(tenant.id(), entry_id, lines)
        .await?;
    Ok(Json(updated.into()))
}

/// DELETE `/journal-entries/{entry_id}`
async fn delete_entry(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    JournalEntryRepository::new(state.db())
        .delete(tenant.id(), entry_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/journal-entries/{entry_id}/post`
///
/// The acting user is taken from the token.
async fn post_entry(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<JournalEntryDetail>, ApiError> {
    let posted = JournalEntryRepository::new(state.db())
        .post(
            tenant.id(),
            entry_id,
            UserId::from_uuid(auth.user_id()),
            Utc::now(),
        )
        .await?;
    Ok(Json(posted.into()))
}

/// POST `/journal-entries/{entry_id}/cancel`
async fn cancel_entry(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<JournalEntryDetail>, ApiError> {
    let cancelled = JournalEntryRepository::new(state.db())
        .cancel(tenant.id(), entry_id)
        .await?;
    Ok(Json(cancelled.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn line(debit: Option<&str>, credit: Option<&str>) -> JournalLineRequest {
        JournalLineRequest {
            account_id: Uuid::new_v4(),
            debit: debit.map(str::to_string),
            credit: credit.map(str::to_string),
            description: None,
            currency_code: None,
        }
    }

    #[test]
    fn test_parse_lines_rounds_and_defaults_to_zero() {
        let lines = parse_lines(vec![line(Some("100.005"), None), line(None, Some(""))]).unwrap();
        assert_eq!(lines[0].debit, dec!(100.01));
        assert_eq!(lines[0].credit, Decimal::ZERO);
        assert_eq!(lines[1].credit, Decimal::ZERO);
    }

    #[test]
    fn test_parse_lines_needs_two_lines() {
        let err = parse_lines(vec![line(Some("10"), None)]).unwrap_err();
        assert_eq!(err.0.status_code(), 400);
    }

    #[rstest]
    #[case("-5.00")]
    #[case("ten")]
    #[case("100000000000000000000")]
    fn test_parse_lines_rejects_bad_amounts(#[case] amount: &str) {
        let err = parse_lines(vec![line(Some(amount), None), line(None, Some("5"))]).unwrap_err();
        assert_eq!(err.0.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_status_filter() {
        let query = ListEntriesQuery {
            status: Some("Posted".to_string()),
            ..ListEntriesQuery::default()
        };
        assert!(query.filter().unwrap().status.is_some());

        let query = ListEntriesQuery {
            status: Some("archived".to_string()),
            ..ListEntriesQuery::default()
        };
        assert!(query.filter().is_err());
    }
}
