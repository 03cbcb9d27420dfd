//! Document numbering routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use ledgerwise_core::sequence::{DocumentSequence, DocumentSequencer, DocumentType, IssuedNumber};
use ledgerwise_core::store::{Store, StoreTx};
use ledgerwise_shared::types::CompanyId;
use serde::Deserialize;
use tracing::info;

use super::today;
use crate::{AppState, error::ApiError};

/// Creates the sequence routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/sequences", get(list_sequences::<S>))
        .route("/sequences/{document_type}/next", post(next_number::<S>))
}

/// Query parameters for issuing a number.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextNumberQuery {
    /// Overrides the type's default prefix for a new counter.
    pub prefix: Option<String>,
    /// Date that selects the fiscal year, today when omitted.
    pub date: Option<NaiveDate>,
}

/// POST `/sequences/{document_type}/next`
async fn next_number<S: Store>(
    State(state): State<AppState<S>>,
    Path((company_id, document_type)): Path<(CompanyId, DocumentType)>,
    Query(query): Query<NextNumberQuery>,
) -> Result<(StatusCode, Json<IssuedNumber>), ApiError> {
    let mut tx = state.store.begin().await?;
    let issued = DocumentSequencer::next(
        &mut tx,
        company_id,
        document_type,
        query.date.unwrap_or_else(today),
        query.prefix.as_deref(),
    )
    .await?;
    tx.commit().await?;

    info!(company_id = %company_id, number = %issued.formatted, "Issued document number");
    Ok((StatusCode::CREATED, Json(issued)))
}

/// GET `/sequences`
async fn list_sequences<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
) -> Result<Json<Vec<DocumentSequence>>, ApiError> {
    let mut tx = state.store.begin().await?;
    let sequences = DocumentSequencer::list(&mut tx, company_id).await?;
    Ok(Json(sequences))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{TestApp, send};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_numbers_increase_within_a_fiscal_year() {
        let app = TestApp::new().await;

        let (status, body) = send(&app, Method::POST, "/sequences/invoice/next?date=2025-04-01", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["formatted"], "INV-2025-00001");

        let (_, body) = send(&app, Method::POST, "/sequences/invoice/next?date=2025-09-30", None).await;
        assert_eq!(body["formatted"], "INV-2025-00002");

        let (_, body) = send(&app, Method::POST, "/sequences/invoice/next?date=2026-01-02", None).await;
        assert_eq!(body["formatted"], "INV-2026-00001");

        let (status, body) = send(&app, Method::GET, "/sequences", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_custom_prefix_and_bad_prefix() {
        let app = TestApp::new().await;

        let (_, body) = send(&app, Method::POST, "/sequences/credit_note/next?prefix=CRN&date=2025-01-15", None).await;
        assert_eq!(body["formatted"], "CRN-2025-00001");

        let (status, body) = send(&app, Method::POST, "/sequences/bill/next?prefix=A%20B", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_PREFIX");
    }

    #[tokio::test]
    async fn test_unknown_document_type_is_rejected() {
        let app = TestApp::new().await;
        let (status, _) = send(&app, Method::POST, "/sequences/widget/next", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
