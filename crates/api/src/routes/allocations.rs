//! Payment allocation routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use ledgerwise_core::allocation::{
    AllocateInput, Allocation, AllocationLedger, AllocationResult, DocumentKind, PaymentKind, Settlement, UndoOutcome,
};
use ledgerwise_core::store::{Store, StoreTx};
use ledgerwise_shared::types::{AllocationId, CompanyId, DocumentId, PaymentId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::today;
use crate::{AppState, error::ApiError, middleware::ActingUser};

const DEFAULT_RECENT_LIMIT: usize = 50;
const MAX_RECENT_LIMIT: usize = 500;

/// Creates the allocation routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/allocations", post(create_allocation::<S>).get(list_recent::<S>))
        .route("/allocations/undo-batch", post(undo_batch::<S>))
        .route("/allocations/{allocation_id}", delete(delete_allocation::<S>))
        .route(
            "/documents/{document_kind}/{document_id}/allocations",
            get(list_for_document::<S>),
        )
}

/// Request body for an allocation.
#[derive(Debug, Deserialize)]
pub struct CreateAllocationRequest {
    /// Receipt or payment.
    pub payment_kind: PaymentKind,
    /// The movement.
    pub payment_id: PaymentId,
    /// Invoice or bill.
    pub document_kind: DocumentKind,
    /// The document.
    pub document_id: DocumentId,
    /// Amount to apply.
    pub amount: Decimal,
    /// Allocation date, today when omitted.
    #[serde(default)]
    pub allocation_date: Option<NaiveDate>,
}

/// Request body for a batch undo.
#[derive(Debug, Deserialize)]
pub struct UndoBatchRequest {
    /// Allocations to remove.
    pub allocation_ids: Vec<AllocationId>,
}

/// Query parameters for recent allocations.
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    /// Page size.
    pub limit: Option<usize>,
}

/// POST `/allocations`
async fn create_allocation<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    ActingUser(user_id): ActingUser,
    Json(req): Json<CreateAllocationRequest>,
) -> Result<(StatusCode, Json<AllocationResult>), ApiError> {
    let mut tx = state.store.begin().await?;
    let result = AllocationLedger::allocate(
        &mut tx,
        AllocateInput {
            company_id,
            payment_kind: req.payment_kind,
            payment_id: req.payment_id,
            document_kind: req.document_kind,
            document_id: req.document_id,
            amount: req.amount,
            allocation_date: req.allocation_date,
            user_id,
        },
        today(),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// DELETE `/allocations/{allocation_id}`
async fn delete_allocation<S: Store>(
    State(state): State<AppState<S>>,
    Path((company_id, allocation_id)): Path<(CompanyId, AllocationId)>,
    ActingUser(user_id): ActingUser,
) -> Result<Json<Settlement>, ApiError> {
    let mut tx = state.store.begin().await?;
    let settlement = AllocationLedger::delete(&mut tx, company_id, allocation_id, user_id, today()).await?;
    tx.commit().await?;
    Ok(Json(settlement))
}

/// POST `/allocations/undo-batch` - Each id is undone independently.
async fn undo_batch<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    ActingUser(user_id): ActingUser,
    Json(req): Json<UndoBatchRequest>,
) -> Result<Json<Vec<UndoOutcome>>, ApiError> {
    let outcomes =
        AllocationLedger::undo_batch(state.store.as_ref(), company_id, &req.allocation_ids, user_id, today()).await?;
    let deleted = outcomes.iter().filter(|o| o.deleted).count();
    info!(company_id = %company_id, requested = req.allocation_ids.len(), deleted, "Batch undo finished");
    Ok(Json(outcomes))
}

/// GET `/allocations?limit=`
async fn list_recent<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<Allocation>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, MAX_RECENT_LIMIT);
    let mut tx = state.store.begin().await?;
    let allocations = AllocationLedger::recent(&mut tx, company_id, limit).await?;
    Ok(Json(allocations))
}

/// GET `/documents/{document_kind}/{document_id}/allocations`
async fn list_for_document<S: Store>(
    State(state): State<AppState<S>>,
    Path((company_id, kind, document_id)): Path<(CompanyId, DocumentKind, DocumentId)>,
) -> Result<Json<Vec<Allocation>>, ApiError> {
    let mut tx = state.store.begin().await?;
    let allocations = AllocationLedger::list_for_document(&mut tx, company_id, kind, document_id).await?;
    Ok(Json(allocations))
}
