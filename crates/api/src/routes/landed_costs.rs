//! Landed cost voucher routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use ledgerwise_core::landed_cost::{LandedCostAllocator, PostedVoucher, VoucherAllocation};
use ledgerwise_core::store::{Store, StoreTx};
use ledgerwise_shared::types::{CompanyId, VoucherId};

use crate::{AppState, error::ApiError, middleware::ActingUser};

/// Creates the landed cost routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/landed-costs/{voucher_id}/allocate", post(allocate::<S>))
        .route("/landed-costs/{voucher_id}/post", post(post_voucher::<S>))
}

/// POST `/landed-costs/{voucher_id}/allocate` - Distribute the bill amounts.
async fn allocate<S: Store>(
    State(state): State<AppState<S>>,
    Path((company_id, voucher_id)): Path<(CompanyId, VoucherId)>,
) -> Result<Json<VoucherAllocation>, ApiError> {
    let mut tx = state.store.begin().await?;
    let allocation = LandedCostAllocator::allocate(&mut tx, company_id, voucher_id).await?;
    tx.commit().await?;
    Ok(Json(allocation))
}

/// POST `/landed-costs/{voucher_id}/post` - Capitalize into inventory.
async fn post_voucher<S: Store>(
    State(state): State<AppState<S>>,
    Path((company_id, voucher_id)): Path<(CompanyId, VoucherId)>,
    ActingUser(user_id): ActingUser,
) -> Result<(StatusCode, Json<PostedVoucher>), ApiError> {
    let mut tx = state.store.begin().await?;
    let posted = LandedCostAllocator::post(&mut tx, company_id, voucher_id, user_id).await?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(posted)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{TestApp, send};
    use axum::http::{Method, StatusCode};
    use chrono::NaiveDate;
    use ledgerwise_core::landed_cost::{
        AllocationMethod, LandedCostBill, LandedCostItem, LandedCostVoucher, StockMovement, VoucherStatus,
    };
    use ledgerwise_shared::types::{DocumentId, ItemId, StockMovementId, VoucherId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn decimal(value: &serde_json::Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    async fn seed_voucher(app: &TestApp) -> VoucherId {
        let company = app.company;
        let inventory = app.cash;
        let expense = app.payable;
        let voucher = LandedCostVoucher {
            id: VoucherId::new(),
            company_id: company,
            number: "LCV-2025-00001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            method: AllocationMethod::Quantity,
            status: VoucherStatus::Draft,
            journal_id: None,
        };
        let voucher_id = voucher.id;
        let movements: Vec<StockMovement> = [dec!(10), dec!(30)]
            .into_iter()
            .map(|quantity| StockMovement {
                id: StockMovementId::new(),
                company_id: company,
                item_id: ItemId::new(),
                inventory_account_id: Some(inventory),
                quantity,
                unit_cost: dec!(5),
                total_cost: quantity * dec!(5),
            })
            .collect();

        app.store
            .seed(move |s| {
                s.voucher_bills.push(LandedCostBill {
                    id: Uuid::new_v4(),
                    voucher_id,
                    bill_id: DocumentId::new(),
                    amount: dec!(100),
                    expense_account_id: Some(expense),
                });
                for movement in movements {
                    s.voucher_items.push(LandedCostItem {
                        id: Uuid::new_v4(),
                        voucher_id,
                        stock_movement_id: movement.id,
                        quantity: movement.quantity,
                        original_cost: movement.total_cost,
                        allocated_cost: Decimal::ZERO,
                        new_unit_cost: movement.unit_cost,
                    });
                    s.stock_movements.insert(movement.id, movement);
                }
                s.vouchers.insert(voucher_id, voucher);
            })
            .await;
        voucher_id
    }

    #[tokio::test]
    async fn test_allocate_by_quantity() {
        let app = TestApp::new().await;
        let voucher = seed_voucher(&app).await;

        let (status, body) = send(&app, Method::POST, &format!("/landed-costs/{voucher}/allocate"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["total_cost"]), dec!(100));
        let mut shares: Vec<Decimal> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| decimal(&item["allocated_cost"]))
            .collect();
        shares.sort();
        assert_eq!(shares, vec![dec!(25), dec!(75)]);
    }

    #[tokio::test]
    async fn test_post_once() {
        let app = TestApp::new().await;
        let voucher = seed_voucher(&app).await;
        let uri = format!("/landed-costs/{voucher}/post");

        let (status, body) = send(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["journal_number"], "JE-2025-00001");

        let (status, body) = send(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "ALREADY_POSTED");
    }

    #[tokio::test]
    async fn test_unknown_voucher_is_not_found() {
        let app = TestApp::new().await;
        let uri = format!("/landed-costs/{}/allocate", VoucherId::new());
        let (status, _) = send(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
