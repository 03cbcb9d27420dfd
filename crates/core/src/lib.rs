//! Core accounting logic for Ledgerwise.
//!
//! This crate contains the financial engine with ZERO web or database dependencies.
//! Persistence is reached through the repository traits in [`store`]; the
//! PostgreSQL implementation lives in `ledgerwise-db`.
//!
//! # Modules
//!
//! - `journal` - Balanced double-entry journals, reversal, business postings
//! - `allocation` - Payment/receipt to invoice/bill settlement and status derivation
//! - `reconcile` - Candidate scoring, auto-match, bank line matching
//! - `currency` - Exchange rate resolution and conversion
//! - `landed_cost` - Incidental cost distribution across stock receipts
//! - `sequence` - Per-company, per-fiscal-year document numbering

#[macro_use]
mod macros;

pub mod allocation;
pub mod audit;
pub mod company;
pub mod currency;
pub mod journal;
pub mod landed_cost;
pub mod reconcile;
pub mod sequence;
pub mod store;

pub use macros::ParseEnumError;

use rust_decimal::Decimal;

/// Tolerance used for balance and settlement comparisons (0.01).
pub const EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
