//! Journal routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use ledgerwise_core::journal::{CreateJournalInput, Journal, JournalEngine, JournalLineInput, SourceType};
use ledgerwise_core::store::{Store, StoreTx};
use ledgerwise_shared::types::{CompanyId, JournalId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::today;
use crate::{AppState, error::ApiError, middleware::ActingUser};

/// Creates the journal routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/journals", post(create_journal::<S>))
        .route("/journals/{journal_id}", get(get_journal::<S>))
        .route("/journals/{journal_id}/reverse", post(reverse_journal::<S>))
}

/// Request body for posting a journal.
#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    /// Accounting date.
    pub date: NaiveDate,
    /// Originating event, `manual` when omitted.
    #[serde(default)]
    pub source_type: Option<SourceType>,
    /// Originating record.
    #[serde(default)]
    pub source_id: Option<Uuid>,
    /// Description.
    pub description: String,
    /// Transaction currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// Rate to the base currency.
    #[serde(default)]
    pub fx_rate: Option<Decimal>,
    /// Lines.
    pub lines: Vec<JournalLineInput>,
}

/// Request body for reversing a journal.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReverseJournalRequest {
    /// Reversal date, today when omitted.
    pub date: Option<NaiveDate>,
    /// Reason recorded in the description.
    pub reason: Option<String>,
}

/// Identifier and number of a posted journal.
#[derive(Debug, Serialize)]
pub struct JournalCreated {
    /// New journal.
    pub journal_id: JournalId,
    /// Its number.
    pub number: String,
    /// Sum of debits.
    pub total_amount: Decimal,
}

impl From<&Journal> for JournalCreated {
    fn from(journal: &Journal) -> Self {
        Self {
            journal_id: journal.id,
            number: journal.number.clone(),
            total_amount: journal.total_amount,
        }
    }
}

/// POST `/journals` - Post a balanced journal.
async fn create_journal<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    ActingUser(user_id): ActingUser,
    Json(req): Json<CreateJournalRequest>,
) -> Result<(StatusCode, Json<JournalCreated>), ApiError> {
    let mut tx = state.store.begin().await?;
    let journal = JournalEngine::create(
        &mut tx,
        CreateJournalInput {
            company_id,
            date: req.date,
            source_type: req.source_type.unwrap_or(SourceType::Manual),
            source_id: req.source_id,
            description: req.description,
            currency: req.currency,
            fx_rate: req.fx_rate,
            lines: req.lines,
            created_by: user_id,
        },
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(JournalCreated::from(&journal))))
}

/// GET `/journals/{journal_id}` - Header and lines.
async fn get_journal<S: Store>(
    State(state): State<AppState<S>>,
    Path((company_id, journal_id)): Path<(CompanyId, JournalId)>,
) -> Result<Json<Journal>, ApiError> {
    let mut tx = state.store.begin().await?;
    let journal = JournalEngine::get(&mut tx, company_id, journal_id).await?;
    Ok(Json(journal))
}

/// POST `/journals/{journal_id}/reverse` - Post the mirror image.
async fn reverse_journal<S: Store>(
    State(state): State<AppState<S>>,
    Path((company_id, journal_id)): Path<(CompanyId, JournalId)>,
    ActingUser(user_id): ActingUser,
    Json(req): Json<ReverseJournalRequest>,
) -> Result<(StatusCode, Json<JournalCreated>), ApiError> {
    let reason = req.reason.unwrap_or_else(|| "reversed".to_string());
    let mut tx = state.store.begin().await?;
    let reversal = JournalEngine::reverse(
        &mut tx,
        company_id,
        journal_id,
        req.date.unwrap_or_else(today),
        &reason,
        user_id,
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(JournalCreated::from(&reversal))))
}
