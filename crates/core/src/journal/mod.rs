//! Double-entry journal engine.
//!
//! This module implements:
//! - Line validation (non-negative amounts, balance within 0.01)
//! - Journal creation with sequence-issued numbers and base-currency amounts
//! - Reversal (additive mirror journal, one per original)
//! - Business postings for invoices, bills, receipts and payments

pub mod engine;
pub mod error;
pub mod posting;
pub mod types;
pub mod validation;

#[cfg(test)]
mod props;

pub use engine::JournalEngine;
pub use error::JournalError;
pub use posting::PostingService;
pub use types::{CreateJournalInput, Journal, JournalLine, JournalLineInput, PostingOutcome, SourceType};
pub use validation::{validate_lines, LineTotals};
