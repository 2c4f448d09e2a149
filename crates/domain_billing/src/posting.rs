//! Invoice posting state machine
//!
//! Invoice status changes drive the ledger: moving into a posted status
//! (sent or paid) must leave exactly one balanced document pair, moving
//! into paid must additionally leave exactly one receipt voucher, and
//! moving back out must remove exactly what the forward step created.
//! Applying the same status twice is a no-op, so replays cannot double
//! post.

use chrono::NaiveDate;

use core_kernel::{AccountId, VoucherId};

use crate::catalog::{CompanySettings, Customer};
use crate::error::BillingError;
use crate::invoice::{Invoice, InvoiceStatus};
use crate::ledger::{InvoicePostingState, Ledger};
use crate::voucher::{Voucher, VoucherRegister};

/// What a status change did to the ledger and voucher register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingEffect {
    /// Document pair posted to the ledger
    InvoicePosted,
    /// Document pair removed from the ledger
    InvoiceUnposted,
    /// A broken document posting was deleted and reposted
    PartialPostingHealed,
    /// Receipt voucher and its ledger pair created
    ReceiptCreated(VoucherId),
    /// Receipt voucher and its ledger pair removed
    ReceiptRemoved(VoucherId),
    /// Customer ledger account learned from the invoice mapping
    CustomerAccountBackfilled(AccountId),
}

/// Applies an invoice status change and its ledger consequences
///
/// Returns the effects applied, in order. A change to the current status
/// returns no effects. Posting that cannot proceed because account
/// mappings are missing is logged and skipped, never fatal, so the same
/// transition can be replayed once the mapping exists.
///
/// # Errors
///
/// Returns an error for the paid-to-cancelled transition, which must go
/// through sent so the receipt teardown is explicit, and propagates
/// ledger failures.
pub fn apply_status_change(
    invoice: &mut Invoice,
    new_status: InvoiceStatus,
    ledger: &mut Ledger,
    vouchers: &mut VoucherRegister,
    customer: &mut Customer,
    settings: &CompanySettings,
    today: NaiveDate,
) -> Result<Vec<PostingEffect>, BillingError> {
    let old_status = invoice.status;
    if old_status == new_status {
        tracing::debug!(invoice = %invoice.id, status = ?new_status, "status unchanged, no-op");
        return Ok(Vec::new());
    }
    if old_status == InvoiceStatus::Paid && new_status == InvoiceStatus::Cancelled {
        return Err(BillingError::InvalidTransition {
            from: format!("{:?}", old_status),
            to: format!("{:?}", new_status),
        });
    }

    let mut effects = Vec::new();

    match new_status {
        InvoiceStatus::Draft | InvoiceStatus::Cancelled => {
            remove_receipt(invoice, ledger, vouchers, &mut effects);
            let removed = ledger.remove_invoice_entries(invoice.id);
            if removed > 0 {
                effects.push(PostingEffect::InvoiceUnposted);
            }
        }
        InvoiceStatus::Sent => {
            if old_status == InvoiceStatus::Paid {
                remove_receipt(invoice, ledger, vouchers, &mut effects);
            }
            ensure_posted(invoice, ledger, today, &mut effects)?;
        }
        InvoiceStatus::Paid => {
            ensure_posted(invoice, ledger, today, &mut effects)?;
            ensure_receipt(invoice, ledger, vouchers, customer, settings, today, &mut effects)?;
        }
    }

    invoice.status = new_status;
    invoice.updated_at = chrono::Utc::now();

    tracing::info!(
        invoice = %invoice.id,
        from = ?old_status,
        to = ?new_status,
        effects = effects.len(),
        "applied invoice status change"
    );
    Ok(effects)
}

/// Makes sure exactly one balanced document pair exists for the invoice
///
/// A partial posting is removed and reposted rather than patched.
fn ensure_posted(
    invoice: &Invoice,
    ledger: &mut Ledger,
    today: NaiveDate,
    effects: &mut Vec<PostingEffect>,
) -> Result<(), BillingError> {
    match ledger.invoice_posting_state(invoice.id) {
        InvoicePostingState::Posted => return Ok(()),
        InvoicePostingState::Partial => {
            tracing::warn!(invoice = %invoice.id, "partial posting detected, deleting and reposting");
            ledger.remove_invoice_entries(invoice.id);
            effects.push(PostingEffect::PartialPostingHealed);
        }
        InvoicePostingState::NotPosted => {}
    }

    let (income_account, customer_account) =
        match (invoice.income_account, invoice.customer_account) {
            (Some(income), Some(customer)) => (income, customer),
            _ => {
                tracing::warn!(
                    invoice = %invoice.id,
                    "account mappings missing, leaving invoice unposted"
                );
                return Ok(());
            }
        };
    if !invoice.total_amount.is_positive() {
        tracing::warn!(invoice = %invoice.id, "zero invoice total, nothing to post");
        return Ok(());
    }

    ledger.post_pair(
        customer_account,
        income_account,
        invoice.total_amount,
        today,
        format!("Invoice {}", invoice.invoice_number),
        Some(invoice.id),
        None,
    )?;
    effects.push(PostingEffect::InvoicePosted);
    Ok(())
}

/// Makes sure exactly one receipt voucher exists for a paid invoice
fn ensure_receipt(
    invoice: &Invoice,
    ledger: &mut Ledger,
    vouchers: &mut VoucherRegister,
    customer: &mut Customer,
    settings: &CompanySettings,
    today: NaiveDate,
    effects: &mut Vec<PostingEffect>,
) -> Result<(), BillingError> {
    if vouchers.receipt_for(invoice.id).is_some() {
        return Ok(());
    }

    let customer_account = match customer.ledger_account.or(invoice.customer_account) {
        Some(account) => account,
        None => {
            tracing::warn!(
                invoice = %invoice.id,
                "no customer account for receipt, skipping voucher"
            );
            return Ok(());
        }
    };
    if customer.ledger_account.is_none() {
        customer.ledger_account = Some(customer_account);
        effects.push(PostingEffect::CustomerAccountBackfilled(customer_account));
        tracing::info!(
            customer = %customer.id,
            account = %customer_account,
            "backfilled customer ledger account from invoice"
        );
    }

    let deposit_account = match settings.receipt_account() {
        Some(account) => account,
        None => {
            tracing::warn!(
                invoice = %invoice.id,
                "no deposit account configured, skipping receipt voucher"
            );
            return Ok(());
        }
    };
    if !invoice.total_amount.is_positive() {
        tracing::warn!(invoice = %invoice.id, "zero invoice total, no receipt to record");
        return Ok(());
    }

    let voucher = Voucher::receipt(
        invoice.id,
        today,
        invoice.total_amount,
        deposit_account,
        customer_account,
    );
    ledger.post_pair(
        deposit_account,
        customer_account,
        invoice.total_amount,
        today,
        format!("Receipt {} for invoice {}", voucher.voucher_number, invoice.invoice_number),
        Some(invoice.id),
        Some(voucher.id),
    )?;
    effects.push(PostingEffect::ReceiptCreated(voucher.id));
    vouchers.insert(voucher);
    Ok(())
}

/// Removes the receipt voucher and its ledger rows, if present
fn remove_receipt(
    invoice: &Invoice,
    ledger: &mut Ledger,
    vouchers: &mut VoucherRegister,
    effects: &mut Vec<PostingEffect>,
) {
    if let Some(voucher) = vouchers.remove(invoice.id) {
        ledger.remove_voucher_entries(voucher.id);
        effects.push(PostingEffect::ReceiptRemoved(voucher.id));
    }
}
