//! Landed cost allocation and posting.
//!
//! A voucher moves `draft → allocated → posted`. Allocation may be repeated
//! until the voucher is posted; posting re-runs the allocation, rewrites the
//! stock movements' cost, and books one journal:
//!
//! ```text
//! DR inventory (per item)   allocated_cost
//!     CR expense (bill)         total_cost
//! ```

use ledgerwise_shared::types::{CompanyId, UserId, VoucherId};
use rust_decimal::prelude::*;
use serde_json::json;
use tracing::info;

use super::error::LandedCostError;
use super::types::{
    AllocationMethod, ItemShare, LandedCostBill, LandedCostItem, LandedCostVoucher, PostedVoucher, StockMovement,
    VoucherAllocation, VoucherStatus,
};
use crate::audit::{AuditAction, AuditEntry};
use crate::currency::AllocationUtil;
use crate::journal::{CreateJournalInput, JournalEngine, JournalLineInput, SourceType};
use crate::store::StoreTx;

/// Entity name used in the audit log.
pub const AUDIT_ENTITY: &str = "landed_cost_voucher";

/// Decimal places of allocated cost.
pub const COST_DP: u32 = 2;

/// Decimal places of unit cost.
pub const UNIT_COST_DP: u32 = 4;

/// Figures computed for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedShare {
    /// Share of the voucher cost.
    pub allocated_cost: Decimal,
    /// `(original_cost + allocated_cost) / quantity`.
    pub new_unit_cost: Decimal,
}

struct Loaded {
    voucher: LandedCostVoucher,
    bills: Vec<LandedCostBill>,
    stocked: Vec<(LandedCostItem, StockMovement)>,
}

/// Distributes incidental costs over stock receipts.
pub struct LandedCostAllocator;

impl LandedCostAllocator {
    /// Splits `total_cost` over `items` given as `(quantity, original_cost)`.
    ///
    /// Shares are rounded to cents with the largest remainder method, so
    /// they always sum to `total_cost`.
    pub fn compute(
        method: AllocationMethod,
        total_cost: Decimal,
        items: &[(Decimal, Decimal)],
    ) -> Result<Vec<ComputedShare>, LandedCostError> {
        let weights: Vec<Decimal> = items
            .iter()
            .map(|&(quantity, original_cost)| match method {
                AllocationMethod::Quantity => quantity,
                AllocationMethod::Value => original_cost,
            })
            .collect();
        let base: Decimal = weights.iter().copied().sum();
        if base <= Decimal::ZERO {
            return Err(LandedCostError::ZeroBase);
        }

        let shares = AllocationUtil::allocate_by_weights(total_cost, &weights, COST_DP);
        Ok(items
            .iter()
            .zip(shares)
            .map(|(&(quantity, original_cost), allocated_cost)| ComputedShare {
                allocated_cost,
                new_unit_cost: Self::unit_cost(original_cost + allocated_cost, quantity),
            })
            .collect())
    }

    /// Computes and stores each item's share and moves the voucher to
    /// `allocated`. Stock movements are left untouched.
    pub async fn allocate<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        voucher_id: VoucherId,
    ) -> Result<VoucherAllocation, LandedCostError> {
        let (allocation, _) = Self::allocate_loaded(tx, company_id, voucher_id).await?;
        tx.set_voucher_status(company_id, voucher_id, VoucherStatus::Allocated, None)
            .await?;
        Ok(allocation)
    }

    /// Re-allocates, applies the new unit costs to stock, books the journal,
    /// and marks the voucher posted.
    pub async fn post<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        voucher_id: VoucherId,
        user_id: Option<UserId>,
    ) -> Result<PostedVoucher, LandedCostError> {
        let (allocation, loaded) = Self::allocate_loaded(tx, company_id, voucher_id).await?;
        let Loaded {
            voucher,
            bills,
            stocked,
        } = loaded;

        let mut credits = Vec::with_capacity(bills.len());
        for bill in bills.iter().filter(|b| b.amount > Decimal::ZERO) {
            let expense_account = bill
                .expense_account_id
                .ok_or(LandedCostError::MissingExpenseAccount(bill.bill_id))?;
            credits.push(JournalLineInput::credit(
                expense_account,
                bill.amount,
                format!("Landed cost {}", voucher.number),
            ));
        }

        let mut lines = Vec::with_capacity(stocked.len() + credits.len());
        for (item, movement) in &stocked {
            let inventory_account = movement
                .inventory_account_id
                .ok_or(LandedCostError::MissingInventoryAccount(movement.id))?;

            tx.update_stock_cost(
                company_id,
                movement.id,
                item.new_unit_cost,
                movement.quantity * item.new_unit_cost,
            )
            .await?;

            if item.allocated_cost > Decimal::ZERO {
                lines.push(JournalLineInput::debit(
                    inventory_account,
                    item.allocated_cost,
                    format!("Landed cost {}", voucher.number),
                ));
            }
        }
        lines.extend(credits);

        let journal = JournalEngine::create(
            tx,
            CreateJournalInput {
                company_id,
                date: voucher.date,
                source_type: SourceType::LandedCost,
                source_id: Some(voucher_id.into_inner()),
                description: format!("Landed cost voucher {}", voucher.number),
                currency: None,
                fx_rate: None,
                lines,
                created_by: user_id,
            },
        )
        .await?;

        tx.set_voucher_status(company_id, voucher_id, VoucherStatus::Posted, Some(journal.id))
            .await?;
        tx.record_audit(&AuditEntry::new(
            company_id,
            user_id,
            AUDIT_ENTITY,
            voucher_id.into_inner(),
            AuditAction::Post,
            json!({
                "number": voucher.number,
                "journal_id": journal.id,
                "total_cost": allocation.total_cost,
            }),
        ))
        .await?;

        info!(
            company_id = %company_id,
            voucher = %voucher.number,
            journal = %journal.number,
            total_cost = %allocation.total_cost,
            "Landed cost posted"
        );

        Ok(PostedVoucher {
            voucher_id,
            journal_id: journal.id,
            journal_number: journal.number,
            total_cost: allocation.total_cost,
        })
    }

    async fn allocate_loaded<T: StoreTx>(
        tx: &mut T,
        company_id: CompanyId,
        voucher_id: VoucherId,
    ) -> Result<(VoucherAllocation, Loaded), LandedCostError> {
        let voucher = tx
            .lock_voucher(company_id, voucher_id)
            .await?
            .ok_or(LandedCostError::VoucherNotFound(voucher_id))?;
        if voucher.status == VoucherStatus::Posted {
            return Err(LandedCostError::AlreadyPosted(voucher_id));
        }

        let bills = tx.voucher_bills(voucher_id).await?;
        let total_cost: Decimal = bills.iter().map(|b| b.amount).sum();
        if total_cost <= Decimal::ZERO {
            return Err(LandedCostError::NoCosts(voucher_id));
        }

        let mut stocked = Vec::new();
        for item in tx.voucher_items(voucher_id).await? {
            if let Some(movement) = tx.lock_stock_movement(company_id, item.stock_movement_id).await? {
                stocked.push((item, movement));
            }
        }
        if stocked.is_empty() {
            return Err(LandedCostError::NoItems(voucher_id));
        }

        let basis: Vec<(Decimal, Decimal)> = stocked
            .iter()
            .map(|(item, _)| (item.quantity, item.original_cost))
            .collect();
        let computed = Self::compute(voucher.method, total_cost, &basis)?;

        let mut shares = Vec::with_capacity(stocked.len());
        for ((item, _), share) in stocked.iter_mut().zip(computed) {
            item.allocated_cost = share.allocated_cost;
            item.new_unit_cost = share.new_unit_cost;
            tx.update_voucher_item(item).await?;
            shares.push(ItemShare {
                item_id: item.id,
                stock_movement_id: item.stock_movement_id,
                allocated_cost: item.allocated_cost,
                new_unit_cost: item.new_unit_cost,
            });
        }

        info!(
            company_id = %company_id,
            voucher = %voucher.number,
            method = %voucher.method,
            items = shares.len(),
            total_cost = %total_cost,
            "Landed cost allocated"
        );

        Ok((
            VoucherAllocation {
                voucher_id,
                total_cost,
                items: shares,
            },
            Loaded {
                voucher,
                bills,
                stocked,
            },
        ))
    }

    fn unit_cost(total: Decimal, quantity: Decimal) -> Decimal {
        if quantity.is_zero() {
            return Decimal::ZERO;
        }
        (total / quantity).round_dp_with_strategy(UNIT_COST_DP, RoundingStrategy::MidpointNearestEven)
    }
}
