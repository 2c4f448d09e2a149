//! Billing domain errors

use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Account not found in the chart of accounts
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Account already exists
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    /// Invalid posting amount
    #[error("Invalid posting: {0}")]
    InvalidPosting(String),

    /// Disallowed invoice status transition
    #[error("Invalid invoice transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}
