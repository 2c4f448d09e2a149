//! Billing Domain - Invoicing and Double-Entry Ledger
//!
//! This crate implements the billing half of the core: completed
//! engagements become draft invoices, invoice status changes drive
//! balanced ledger postings, and payment creates a dependent receipt
//! voucher.
//!
//! # Double-Entry Principles
//!
//! Every posting is a balanced pair:
//! - issuing an invoice debits the customer receivable and credits
//!   service income for the invoice total;
//! - receiving payment debits cash or bank and credits the customer
//!   account, through a receipt voucher.
//!
//! The ledger enforces, at every step, that the rows tied to an invoice
//! have equal nonzero debit and credit sums. A detected partial posting
//! is healed by delete-and-repost, never left standing.

pub mod account;
pub mod catalog;
pub mod error;
pub mod generator;
pub mod invoice;
pub mod ledger;
pub mod posting;
pub mod voucher;

pub use account::{Account, AccountCategory, AccountType, ServicesChartOfAccounts};
pub use catalog::{CompanySettings, Customer, ReceiptDeposit, ServiceOffering};
pub use error::BillingError;
pub use generator::{generate_for_period, generate_for_work, BillingContext};
pub use invoice::{Invoice, InvoiceLine, InvoiceStatus};
pub use ledger::{InvoicePostingState, Ledger, LedgerEntry, TrialBalance};
pub use posting::{apply_status_change, PostingEffect};
pub use voucher::{Voucher, VoucherEntry, VoucherRegister, VoucherType};
