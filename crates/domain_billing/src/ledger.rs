//! Double-entry ledger implementation
//!
//! Stores individual ledger rows, each carrying a debit or a credit on
//! one account, optionally tied to an invoice and/or a voucher. Postings
//! always enter as balanced pairs, and rows for an invoice can be
//! inspected and removed as a unit so that status rollbacks leave zero
//! residue.
//!
//! # Invariants
//!
//! - Each row carries a nonzero amount on exactly one side.
//! - For every invoice outside draft/cancelled, the invoice-document rows
//!   (those without a voucher reference) are exactly one balanced pair.
//! - Rows are only ever removed by the posting state machine reversing a
//!   transition.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Currency, InvoiceId, LedgerEntryId, Money, VoucherId};

use crate::account::Account;
use crate::error::BillingError;

/// One row of a double-entry posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier
    pub id: LedgerEntryId,
    /// Account posted to
    pub account_id: AccountId,
    /// Debit amount (zero when this is the credit side)
    pub debit: Money,
    /// Credit amount (zero when this is the debit side)
    pub credit: Money,
    /// Business date of the posting
    pub entry_date: NaiveDate,
    /// Description
    pub description: String,
    /// Invoice this row belongs to, if any
    pub invoice_id: Option<InvoiceId>,
    /// Voucher this row belongs to, if any
    pub voucher_id: Option<VoucherId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Posting state of an invoice's document rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoicePostingState {
    /// No rows exist
    NotPosted,
    /// Exactly one balanced nonzero pair exists
    Posted,
    /// Rows exist but violate the balanced-pair invariant; must be
    /// healed by delete-and-repost
    Partial,
}

/// The double-entry ledger
#[derive(Debug)]
pub struct Ledger {
    accounts: HashMap<AccountId, Account>,
    entries: Vec<LedgerEntry>,
    currency: Currency,
}

impl Ledger {
    /// Creates an empty ledger in the given currency
    pub fn new(currency: Currency) -> Self {
        Self {
            accounts: HashMap::new(),
            entries: Vec::new(),
            currency,
        }
    }

    /// Returns the ledger currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Adds an account to the chart of accounts
    ///
    /// # Errors
    ///
    /// Returns an error if the account already exists.
    pub fn add_account(&mut self, account: Account) -> Result<(), BillingError> {
        if self.accounts.contains_key(&account.id) {
            return Err(BillingError::AccountAlreadyExists(account.id.to_string()));
        }
        self.accounts.insert(account.id, account);
        Ok(())
    }

    /// Gets an account by ID
    pub fn account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Returns all rows, in posting order
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Posts a balanced debit/credit pair
    ///
    /// # Errors
    ///
    /// - Returns an error if the amount is not positive
    /// - Returns an error if either account does not exist
    pub fn post_pair(
        &mut self,
        debit_account: AccountId,
        credit_account: AccountId,
        amount: Money,
        entry_date: NaiveDate,
        description: impl Into<String>,
        invoice_id: Option<InvoiceId>,
        voucher_id: Option<VoucherId>,
    ) -> Result<(), BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::InvalidPosting(format!(
                "posting amount must be positive, got {}",
                amount
            )));
        }
        for account in [&debit_account, &credit_account] {
            if !self.accounts.contains_key(account) {
                return Err(BillingError::AccountNotFound(account.to_string()));
            }
        }

        let description = description.into();
        let now = Utc::now();
        let zero = Money::zero(self.currency);

        self.entries.push(LedgerEntry {
            id: LedgerEntryId::new_v7(),
            account_id: debit_account,
            debit: amount,
            credit: zero,
            entry_date,
            description: description.clone(),
            invoice_id,
            voucher_id,
            created_at: now,
        });
        self.entries.push(LedgerEntry {
            id: LedgerEntryId::new_v7(),
            account_id: credit_account,
            debit: zero,
            credit: amount,
            entry_date,
            description,
            invoice_id,
            voucher_id,
            created_at: now,
        });

        Ok(())
    }

    /// Returns all rows referencing an invoice, including receipt rows
    pub fn entries_for_invoice(&self, invoice_id: InvoiceId) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.invoice_id == Some(invoice_id))
            .collect()
    }

    /// Returns the invoice-document rows (those without a voucher link)
    pub fn invoice_document_entries(&self, invoice_id: InvoiceId) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.invoice_id == Some(invoice_id) && e.voucher_id.is_none())
            .collect()
    }

    /// Classifies the invoice-document rows of an invoice
    pub fn invoice_posting_state(&self, invoice_id: InvoiceId) -> InvoicePostingState {
        let rows = self.invoice_document_entries(invoice_id);
        if rows.is_empty() {
            return InvoicePostingState::NotPosted;
        }

        let debit: Money = rows
            .iter()
            .fold(Money::zero(self.currency), |acc, e| acc + e.debit);
        let credit: Money = rows
            .iter()
            .fold(Money::zero(self.currency), |acc, e| acc + e.credit);

        if rows.len() == 2 && debit == credit && !debit.is_zero() {
            InvoicePostingState::Posted
        } else {
            InvoicePostingState::Partial
        }
    }

    /// Sums debits and credits across every row tied to an invoice
    pub fn invoice_totals(&self, invoice_id: InvoiceId) -> (Money, Money) {
        self.entries_for_invoice(invoice_id).iter().fold(
            (Money::zero(self.currency), Money::zero(self.currency)),
            |(d, c), e| (d + e.debit, c + e.credit),
        )
    }

    /// Removes the invoice-document rows of an invoice
    ///
    /// Receipt rows (those linked to a voucher) are left untouched.
    /// Returns the number of rows removed.
    pub fn remove_invoice_entries(&mut self, invoice_id: InvoiceId) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.invoice_id == Some(invoice_id) && e.voucher_id.is_none()));
        before - self.entries.len()
    }

    /// Removes every row tied to a voucher; returns the number removed
    pub fn remove_voucher_entries(&mut self, voucher_id: VoucherId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.voucher_id != Some(voucher_id));
        before - self.entries.len()
    }

    /// Drops rows matching a predicate, for corruption simulation in tests
    #[cfg(test)]
    pub(crate) fn discard_entries_where(&mut self, predicate: impl Fn(&LedgerEntry) -> bool) {
        self.entries.retain(|e| !predicate(e));
    }

    /// Computes an account's balance from its rows
    ///
    /// Debit-normal accounts grow with debits; credit-normal accounts
    /// grow with credits.
    pub fn account_balance(&self, account_id: &AccountId) -> Option<Money> {
        let account = self.accounts.get(account_id)?;
        let zero = Money::zero(self.currency);

        let balance = self
            .entries
            .iter()
            .filter(|e| &e.account_id == account_id)
            .fold(zero, |acc, e| {
                if account.account_type.is_debit_normal() {
                    acc + e.debit - e.credit
                } else {
                    acc + e.credit - e.debit
                }
            });

        Some(balance)
    }

    /// Generates a trial balance across all accounts
    ///
    /// Used to validate the posting invariant; full financial reporting
    /// lives outside this core.
    pub fn trial_balance(&self) -> TrialBalance {
        let zero = Money::zero(self.currency);
        let mut entries = Vec::new();
        let mut total_debits = zero;
        let mut total_credits = zero;

        for (account_id, account) in &self.accounts {
            let balance = self.account_balance(account_id).unwrap_or(zero);
            if balance.is_zero() {
                continue;
            }

            let (debit, credit) = if account.account_type.is_debit_normal() {
                (balance.abs(), zero)
            } else {
                (zero, balance.abs())
            };

            total_debits = total_debits + debit;
            total_credits = total_credits + credit;
            entries.push(TrialBalanceEntry {
                account_id: *account_id,
                account_name: account.name.clone(),
                debit,
                credit,
            });
        }

        TrialBalance {
            is_balanced: total_debits == total_credits,
            entries,
            total_debits,
            total_credits,
        }
    }
}

/// Trial balance report
#[derive(Debug)]
pub struct TrialBalance {
    /// Individual account entries
    pub entries: Vec<TrialBalanceEntry>,
    /// Total debits
    pub total_debits: Money,
    /// Total credits
    pub total_credits: Money,
    /// Whether the trial balance is balanced
    pub is_balanced: bool,
}

/// A single entry in the trial balance
#[derive(Debug)]
pub struct TrialBalanceEntry {
    /// Account ID
    pub account_id: AccountId,
    /// Account name
    pub account_name: String,
    /// Debit balance
    pub debit: Money,
    /// Credit balance
    pub credit: Money,
}
