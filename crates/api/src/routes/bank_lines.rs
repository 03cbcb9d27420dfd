//! Bank statement line routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use ledgerwise_core::reconcile::{BankMatch, BankMatcher, CashCandidate, MatchOverrides};
use ledgerwise_core::store::{Store, StoreTx};
use ledgerwise_shared::types::{BankLineId, CompanyId, PaymentId};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{AppState, error::ApiError, middleware::ActingUser};

/// Creates the bank line routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/bank-lines/{line_id}/suggestions", get(suggest::<S>))
        .route("/bank-lines/{line_id}/match", post(match_line::<S>))
}

/// Scoring overrides accepted on the query string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OverridesQuery {
    /// Absolute tolerance for an exact amount match.
    pub amount_tolerance: Option<Decimal>,
    /// Date window in days.
    pub max_days: Option<u32>,
    /// Minimum total score.
    pub min_score: Option<u32>,
    /// Candidates returned.
    pub max_candidates: Option<usize>,
    /// Weight of the text overlap factor.
    pub text_weight: Option<u32>,
}

impl From<OverridesQuery> for MatchOverrides {
    fn from(q: OverridesQuery) -> Self {
        Self {
            amount_tolerance: q.amount_tolerance,
            max_days: q.max_days,
            min_score: q.min_score,
            max_candidates: q.max_candidates,
            text_weight: q.text_weight,
            ..Self::default()
        }
    }
}

/// Request body for confirming a match.
#[derive(Debug, Deserialize)]
pub struct MatchLineRequest {
    /// Receipt or payment the line settles.
    pub payment_id: PaymentId,
}

/// GET `/bank-lines/{line_id}/suggestions`
async fn suggest<S: Store>(
    State(state): State<AppState<S>>,
    Path((company_id, line_id)): Path<(CompanyId, BankLineId)>,
    Query(query): Query<OverridesQuery>,
) -> Result<Json<Vec<CashCandidate>>, ApiError> {
    let overrides = MatchOverrides::from(query);
    let mut tx = state.store.begin().await?;
    let candidates = BankMatcher::suggest_for_line(&mut tx, company_id, line_id, &overrides, &state.matching).await?;
    Ok(Json(candidates))
}

/// POST `/bank-lines/{line_id}/match`
async fn match_line<S: Store>(
    State(state): State<AppState<S>>,
    Path((company_id, line_id)): Path<(CompanyId, BankLineId)>,
    ActingUser(user_id): ActingUser,
    Json(req): Json<MatchLineRequest>,
) -> Result<Json<BankMatch>, ApiError> {
    let mut tx = state.store.begin().await?;
    let matched = BankMatcher::match_line(&mut tx, company_id, line_id, req.payment_id, user_id).await?;
    tx.commit().await?;
    Ok(Json(matched))
}
