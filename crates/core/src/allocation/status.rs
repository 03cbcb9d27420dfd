//! Pure settlement status derivation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{DocumentKind, DocumentStatus, Lifecycle};
use crate::EPSILON;

/// Paid amount reported for a document: `Σ allocations` clamped to `[0, total]`.
#[must_use]
pub fn settled_amount(total: Decimal, allocated: Decimal) -> Decimal {
    allocated.min(total).max(Decimal::ZERO)
}

/// Derives a document's status from its figures.
///
/// - void stays void
/// - `paid` once `paid ≥ total − 0.01`
/// - `partially_paid` while `0.01 < paid < total − 0.01`
/// - otherwise draft stays draft, past-due is `overdue`, else the kind's open status
#[must_use]
pub fn derive_status(
    kind: DocumentKind,
    lifecycle: Lifecycle,
    total: Decimal,
    paid: Decimal,
    due_date: NaiveDate,
    today: NaiveDate,
) -> DocumentStatus {
    if lifecycle == Lifecycle::Void {
        return DocumentStatus::Void;
    }
    if paid >= total - EPSILON {
        return DocumentStatus::Paid;
    }
    if paid > EPSILON {
        return DocumentStatus::PartiallyPaid;
    }
    match lifecycle {
        Lifecycle::Draft => DocumentStatus::Draft,
        _ if due_date < today => DocumentStatus::Overdue,
        _ => kind.open_status(),
    }
}
