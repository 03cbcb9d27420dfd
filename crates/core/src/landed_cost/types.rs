//! Landed cost voucher types.

use chrono::NaiveDate;
use ledgerwise_shared::types::{
    AccountId, CompanyId, DocumentId, ItemId, JournalId, StockMovementId, VoucherId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Basis for spreading cost across receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    /// Proportional to original receipt cost.
    Value,
    /// Proportional to received quantity.
    Quantity,
}

string_enum!(AllocationMethod {
    Value => "value",
    Quantity => "quantity",
});

/// Voucher state. Transitions run `Draft → Allocated → Posted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    /// Created, nothing computed.
    Draft,
    /// Shares computed, stock untouched.
    Allocated,
    /// Stock costs updated and journal posted.
    Posted,
}

string_enum!(VoucherStatus {
    Draft => "draft",
    Allocated => "allocated",
    Posted => "posted",
});

/// A batch of incidental costs to distribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandedCostVoucher {
    /// Identifier.
    pub id: VoucherId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Voucher number.
    pub number: String,
    /// Accounting date.
    pub date: NaiveDate,
    /// Distribution basis.
    pub method: AllocationMethod,
    /// State.
    pub status: VoucherStatus,
    /// Posted journal.
    pub journal_id: Option<JournalId>,
}

/// A bill whose amount is distributed by the voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandedCostBill {
    /// Row identifier.
    pub id: Uuid,
    /// Parent voucher.
    pub voucher_id: VoucherId,
    /// Source bill.
    pub bill_id: DocumentId,
    /// Amount to distribute.
    pub amount: Decimal,
    /// Expense account of the bill's first costed line.
    pub expense_account_id: Option<AccountId>,
}

/// A stock receipt receiving part of the voucher cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandedCostItem {
    /// Row identifier.
    pub id: Uuid,
    /// Parent voucher.
    pub voucher_id: VoucherId,
    /// Stock receipt.
    pub stock_movement_id: StockMovementId,
    /// Received quantity.
    pub quantity: Decimal,
    /// Receipt cost before landed costs.
    pub original_cost: Decimal,
    /// Share of the voucher total.
    pub allocated_cost: Decimal,
    /// `(original_cost + allocated_cost) / quantity`.
    pub new_unit_cost: Decimal,
}

/// Inventory receipt whose cost is adjusted on posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Identifier.
    pub id: StockMovementId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Item received.
    pub item_id: ItemId,
    /// Inventory account of the item.
    pub inventory_account_id: Option<AccountId>,
    /// Quantity received.
    pub quantity: Decimal,
    /// Unit cost.
    pub unit_cost: Decimal,
    /// `quantity × unit_cost`.
    pub total_cost: Decimal,
}

/// Computed share for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemShare {
    /// Item row.
    pub item_id: Uuid,
    /// Stock receipt.
    pub stock_movement_id: StockMovementId,
    /// Share of the voucher total.
    pub allocated_cost: Decimal,
    /// Adjusted unit cost.
    pub new_unit_cost: Decimal,
}

/// Result of an allocate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherAllocation {
    /// Voucher.
    pub voucher_id: VoucherId,
    /// Σ bill amounts.
    pub total_cost: Decimal,
    /// Per-item shares.
    pub items: Vec<ItemShare>,
}

/// Result of a post call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedVoucher {
    /// Voucher.
    pub voucher_id: VoucherId,
    /// Journal written.
    pub journal_id: JournalId,
    /// Journal number.
    pub journal_number: String,
    /// Σ bill amounts.
    pub total_cost: Decimal,
}
