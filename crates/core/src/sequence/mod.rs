//! Per-company, per-fiscal-year document numbering.

pub mod error;
pub mod service;
pub mod types;

pub use error::SequenceError;
pub use service::DocumentSequencer;
pub use types::{DocumentSequence, DocumentType, IssuedNumber};
