//! Landed cost allocator.
//!
//! Distributes freight, duty and similar bill amounts over the stock
//! receipts of a voucher, by quantity or by value.

pub mod allocator;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use allocator::{ComputedShare, LandedCostAllocator};
pub use error::LandedCostError;
pub use types::{
    AllocationMethod, ItemShare, LandedCostBill, LandedCostItem, LandedCostVoucher, PostedVoucher, StockMovement,
    VoucherAllocation, VoucherStatus,
};
