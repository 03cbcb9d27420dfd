//! Reconciliation routes: suggestions, auto-match and the statement summary.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use ledgerwise_core::reconcile::{
    AutoMatchReport, AutoMatchRequest, AutoMatcher, MatchOverrides, MatchSide, MovementScope, PaymentSuggestions,
    ReconciliationMatcher, ReconciliationSummary, SuggestionRequest, SummaryRequest,
};
use ledgerwise_core::store::Store;
use ledgerwise_shared::types::{CompanyId, CounterpartyId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::today;
use crate::{AppState, error::ApiError, middleware::ActingUser};

/// Creates the reconciliation routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/reconciliation/suggestions", get(suggestions::<S>))
        .route("/reconciliation/auto-match", post(auto_match::<S>))
        .route("/reconciliation/summary", post(summary))
}

/// Query string for suggestions. Kept flat for the query extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SuggestionQuery {
    /// Receipts, payments, or both.
    #[serde(rename = "type")]
    pub side: MatchSide,
    /// Earliest value date.
    pub from: Option<NaiveDate>,
    /// Latest value date.
    pub to: Option<NaiveDate>,
    /// Only this customer or vendor.
    pub counterparty_id: Option<CounterpartyId>,
    /// Most recent movements per side.
    pub max: Option<usize>,
    /// Absolute tolerance for an exact amount match.
    pub amount_tolerance: Option<Decimal>,
    /// Date window in days.
    pub max_days: Option<u32>,
    /// Minimum total score.
    pub min_score: Option<u32>,
    /// Candidates per movement.
    pub max_candidates: Option<usize>,
    /// Only same-currency documents.
    pub currency_strict: Option<bool>,
    /// Score exact amounts above near ones.
    pub prefer_exact_amount: Option<bool>,
    /// Weight of the text overlap factor.
    pub text_weight: Option<u32>,
}

impl From<SuggestionQuery> for SuggestionRequest {
    fn from(q: SuggestionQuery) -> Self {
        Self {
            scope: MovementScope {
                side: q.side,
                from: q.from,
                to: q.to,
                counterparty_id: q.counterparty_id,
                max: q.max,
            },
            overrides: MatchOverrides {
                amount_tolerance: q.amount_tolerance,
                max_days: q.max_days,
                min_score: q.min_score,
                max_candidates: q.max_candidates,
                max_actions: None,
                currency_strict: q.currency_strict,
                prefer_exact_amount: q.prefer_exact_amount,
                text_weight: q.text_weight,
            },
        }
    }
}

/// GET `/reconciliation/suggestions`
async fn suggestions<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<PaymentSuggestions>>, ApiError> {
    let request = SuggestionRequest::from(query);
    let mut tx = state.store.begin().await?;
    let suggestions = ReconciliationMatcher::suggest(&mut tx, company_id, &request, &state.matching).await?;
    Ok(Json(suggestions))
}

/// POST `/reconciliation/auto-match` - Dry run unless `dry_run` is false.
async fn auto_match<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    ActingUser(user_id): ActingUser,
    Json(request): Json<AutoMatchRequest>,
) -> Result<Json<AutoMatchReport>, ApiError> {
    let report = AutoMatcher::run(
        state.store.as_ref(),
        company_id,
        &request,
        &state.matching,
        user_id,
        today(),
    )
    .await?;
    info!(
        company_id = %company_id,
        dry_run = report.dry_run,
        planned = report.summary.total_candidates,
        allocated = report.summary.allocated,
        "Auto-match finished"
    );
    Ok(Json(report))
}

/// POST `/reconciliation/summary`
async fn summary(Json(request): Json<SummaryRequest>) -> Json<ReconciliationSummary> {
    Json(ReconciliationSummary::compute(&request))
}
