//! Reconciliation matcher.
//!
//! This module implements:
//! - Named scoring factors (amount, date, reference text) and confidence bands
//! - Ranked suggestions of open documents for receipts and payments
//! - Two-phase auto-match that only commits unique exact matches
//! - Bank statement line suggestions and matching
//! - Statement-to-book reconciliation summary

pub mod auto_match;
pub mod bank;
pub mod error;
pub mod matcher;
pub mod scoring;
pub mod summary;
pub mod types;

pub use auto_match::{ActionStatus, AutoMatchReport, AutoMatchRequest, AutoMatchSummary, AutoMatcher, MatchAction, SelectedPair};
pub use bank::{BankMatch, BankMatcher};
pub use error::MatchError;
pub use matcher::{MovementScope, ReconciliationMatcher, SuggestionRequest};
pub use scoring::{MatchOverrides, MatchParams};
pub use summary::{ReconciliationSummary, ReconcilingItem, ReconcilingItemKind, SummaryRequest};
pub use types::{BankLine, CashCandidate, CashFilter, Confidence, DocumentCandidate, MatchSide, PaymentSuggestions};
