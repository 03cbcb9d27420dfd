//! Payment allocation ledger.
//!
//! Links receipts to invoices and payments to bills, and keeps each
//! document's paid amount and status consistent with its allocations.

pub mod error;
pub mod ledger;
pub mod status;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod props;

pub use error::AllocationError;
pub use ledger::{AllocationLedger, AllocationResult, UndoOutcome};
pub use status::{derive_status, settled_amount};
pub use types::{
    AllocateInput, Allocation, CashTransaction, Document, DocumentKind, DocumentStatus, Lifecycle, PaymentKind,
    Settlement,
};
