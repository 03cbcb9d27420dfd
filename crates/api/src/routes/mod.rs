//! API route definitions.
//!
//! Everything except the health check lives under
//! `/api/v1/companies/{company_id}`; handlers extract the company id as the
//! first path parameter.

use axum::Router;
use chrono::{NaiveDate, Utc};
use ledgerwise_core::store::Store;

use crate::AppState;

pub mod allocations;
pub mod bank_lines;
pub mod exchange_rates;
pub mod health;
pub mod journals;
pub mod landed_costs;
pub mod reconciliation;
pub mod sequences;

#[cfg(test)]
mod test_support;

/// Routes scoped to one company.
pub fn company_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .merge(journals::routes::<S>())
        .merge(allocations::routes::<S>())
        .merge(reconciliation::routes::<S>())
        .merge(bank_lines::routes::<S>())
        .merge(landed_costs::routes::<S>())
        .merge(sequences::routes::<S>())
        .merge(exchange_rates::routes::<S>())
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
