//! Receipt vouchers
//!
//! A receipt voucher is created when an invoice becomes paid and is fully
//! deleted when the invoice leaves the paid state. Its lifecycle is tied
//! 1:1 to the invoice, which the register enforces by keying on the
//! invoice identifier.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AccountId, InvoiceId, Money, VoucherId};

/// Kinds of vouchers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    /// Money received against an invoice
    Receipt,
}

/// One side of a voucher posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherEntry {
    /// Entry ID
    pub id: Uuid,
    /// Account posted to
    pub account_id: AccountId,
    /// Debit amount
    pub debit: Money,
    /// Credit amount
    pub credit: Money,
}

/// An auxiliary accounting document with its own balanced entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    /// Unique identifier
    pub id: VoucherId,
    /// Voucher number (human-readable)
    pub voucher_number: String,
    /// Kind of voucher
    pub voucher_type: VoucherType,
    /// Invoice this voucher settles
    pub invoice_id: InvoiceId,
    /// Business date
    pub voucher_date: NaiveDate,
    /// Settled amount
    pub amount: Money,
    /// Balanced entry pair
    pub entries: Vec<VoucherEntry>,
}

impl Voucher {
    /// Builds a receipt voucher: debit the deposit account, credit the
    /// customer account, both for the full amount
    pub fn receipt(
        invoice_id: InvoiceId,
        voucher_date: NaiveDate,
        amount: Money,
        deposit_account: AccountId,
        customer_account: AccountId,
    ) -> Self {
        let zero = Money::zero(amount.currency());
        Self {
            id: VoucherId::new_v7(),
            voucher_number: generate_voucher_number(),
            voucher_type: VoucherType::Receipt,
            invoice_id,
            voucher_date,
            amount,
            entries: vec![
                VoucherEntry {
                    id: Uuid::new_v4(),
                    account_id: deposit_account,
                    debit: amount,
                    credit: zero,
                },
                VoucherEntry {
                    id: Uuid::new_v4(),
                    account_id: customer_account,
                    debit: zero,
                    credit: amount,
                },
            ],
        }
    }

    /// Returns true when debit and credit entry sums match and are nonzero
    pub fn is_balanced(&self) -> bool {
        let zero = Money::zero(self.amount.currency());
        let debit = self.entries.iter().fold(zero, |acc, e| acc + e.debit);
        let credit = self.entries.iter().fold(zero, |acc, e| acc + e.credit);
        debit == credit && !debit.is_zero()
    }
}

/// In-memory voucher store, one receipt per invoice
#[derive(Debug, Default)]
pub struct VoucherRegister {
    by_invoice: HashMap<InvoiceId, Voucher>,
}

impl VoucherRegister {
    /// Creates an empty register
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the receipt voucher for an invoice
    pub fn receipt_for(&self, invoice_id: InvoiceId) -> Option<&Voucher> {
        self.by_invoice.get(&invoice_id)
    }

    /// Inserts a voucher, replacing any prior receipt for its invoice
    pub fn insert(&mut self, voucher: Voucher) {
        self.by_invoice.insert(voucher.invoice_id, voucher);
    }

    /// Removes and returns the receipt voucher for an invoice
    pub fn remove(&mut self, invoice_id: InvoiceId) -> Option<Voucher> {
        self.by_invoice.remove(&invoice_id)
    }

    /// Returns the number of vouchers held
    pub fn len(&self) -> usize {
        self.by_invoice.len()
    }

    /// Returns true when no vouchers are held
    pub fn is_empty(&self) -> bool {
        self.by_invoice.is_empty()
    }
}

/// Generates a unique voucher number
fn generate_voucher_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("RCT-{}", duration.as_nanos() % 10_000_000_000)
}
