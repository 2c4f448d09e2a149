//! Engagement Engine - Cascade Orchestration
//!
//! Glues the scheduling and billing domains into one pipeline:
//!
//! 1. creating or reevaluating a recurring work backfills its periods;
//! 2. task status changes aggregate up to periods and the work;
//! 3. completion transitions generate draft invoices;
//! 4. invoice status changes drive balanced ledger postings and receipt
//!    vouchers.
//!
//! The engine holds everything in memory and takes business dates as
//! explicit parameters, so every operation is deterministic and
//! replayable under test.

pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
