//! Core Kernel - Foundational types for the engagement billing system
//!
//! This crate provides the building blocks shared by all domain modules:
//! - Money and Rate types with precise decimal arithmetic
//! - Strongly-typed identifiers for every domain entity
//! - Common error types

pub mod error;
pub mod identifiers;
pub mod money;

pub use error::CoreError;
pub use identifiers::{
    AccountId, CustomerId, InvoiceId, LedgerEntryId, PeriodId, ServiceId,
    TaskId, TemplateId, VoucherId, WorkId,
};
pub use money::{Currency, Money, MoneyError, Rate};
