//! Engine errors

use thiserror::Error;

use domain_billing::BillingError;
use domain_schedule::ScheduleError;

/// Errors surfaced by engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Work not found in the store
    #[error("Work not found: {0}")]
    WorkNotFound(String),

    /// Invoice not found in the store
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Schedule domain error
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Billing domain error
    #[error(transparent)]
    Billing(#[from] BillingError),
}
