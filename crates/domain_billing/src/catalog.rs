//! Customer, service, and company-settings collaborators
//!
//! These records are owned by the surrounding CRUD application; the core
//! reads them for price, tax, and account resolution. The single
//! exception is `Customer::ledger_account`, which the posting machine
//! back-fills the first time a receipt resolves it from an invoice.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, CustomerId, Money, Rate, ServiceId};

/// A customer of the services business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: CustomerId,
    /// Display name
    pub name: String,
    /// The customer's receivable account in the ledger
    pub ledger_account: Option<AccountId>,
    /// Negotiated per-service prices, overriding service defaults
    pub negotiated_prices: HashMap<ServiceId, Money>,
}

impl Customer {
    /// Creates a new customer with no ledger mapping
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CustomerId::new_v7(),
            name: name.into(),
            ledger_account: None,
            negotiated_prices: HashMap::new(),
        }
    }

    /// Sets the receivable account mapping
    pub fn with_ledger_account(mut self, account_id: AccountId) -> Self {
        self.ledger_account = Some(account_id);
        self
    }

    /// Adds a negotiated price for a service
    pub fn with_negotiated_price(mut self, service_id: ServiceId, price: Money) -> Self {
        self.negotiated_prices.insert(service_id, price);
        self
    }
}

/// A service offering sold to customers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    /// Unique identifier
    pub id: ServiceId,
    /// Display name
    pub name: String,
    /// Default price when no override applies
    pub default_price: Money,
    /// Tax rate applied to invoices for this service
    pub tax_rate: Rate,
    /// Income account invoices for this service credit
    pub income_account: Option<AccountId>,
}

impl ServiceOffering {
    /// Creates a new service offering with zero tax and no account mapping
    pub fn new(name: impl Into<String>, default_price: Money) -> Self {
        Self {
            id: ServiceId::new_v7(),
            name: name.into(),
            default_price,
            tax_rate: Rate::zero(),
            income_account: None,
        }
    }

    /// Sets the tax rate
    pub fn with_tax_rate(mut self, rate: Rate) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Sets the income account mapping
    pub fn with_income_account(mut self, account_id: AccountId) -> Self {
        self.income_account = Some(account_id);
        self
    }
}

/// Where receipt money is deposited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptDeposit {
    Cash,
    Bank,
}

/// Company-wide billing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySettings {
    /// Income account used when a service has no mapping of its own
    pub default_income_account: Option<AccountId>,
    /// Cash account for receipts
    pub cash_account: Option<AccountId>,
    /// Bank account for receipts
    pub bank_account: Option<AccountId>,
    /// Preferred deposit side for receipts
    pub receipt_deposit: ReceiptDeposit,
    /// Days until a generated invoice falls due
    pub invoice_due_days: u32,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            default_income_account: None,
            cash_account: None,
            bank_account: None,
            receipt_deposit: ReceiptDeposit::Bank,
            invoice_due_days: 15,
        }
    }
}

impl CompanySettings {
    /// Resolves the deposit account for receipts
    ///
    /// Falls back to the other account when the preferred one is not
    /// configured.
    pub fn receipt_account(&self) -> Option<AccountId> {
        let (preferred, fallback) = match self.receipt_deposit {
            ReceiptDeposit::Cash => (self.cash_account, self.bank_account),
            ReceiptDeposit::Bank => (self.bank_account, self.cash_account),
        };
        if preferred.is_none() && fallback.is_some() {
            tracing::warn!("preferred receipt account not configured, using fallback");
        }
        preferred.or(fallback)
    }
}
