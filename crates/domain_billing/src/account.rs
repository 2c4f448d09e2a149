//! Account types for the chart of accounts
//!
//! Defines the account structure for double-entry bookkeeping in a
//! services business.

use serde::{Deserialize, Serialize};

use core_kernel::AccountId;

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Revenue accounts (credit normal balance)
    Revenue,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

/// Category of account for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountCategory {
    /// Cash on hand
    Cash,
    /// Bank accounts
    Bank,
    /// Customer receivables
    Receivables,
    /// Service income
    ServiceIncome,
    /// Taxes collected and payable
    TaxPayable,
    /// Operating expense
    OperatingExpense,
    /// Other
    Other,
}

/// An account in the chart of accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Account code (e.g., "1000")
    pub code: String,
    /// Account name
    pub name: String,
    /// Account type
    pub account_type: AccountType,
    /// Account category
    pub category: Option<AccountCategory>,
    /// Description
    pub description: Option<String>,
    /// Whether account is active
    pub is_active: bool,
}

impl Account {
    /// Creates a new account
    pub fn new(
        id: AccountId,
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            account_type,
            category: None,
            description: None,
            is_active: true,
        }
    }

    /// Sets the account category
    pub fn with_category(mut self, category: AccountCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Standard chart of accounts for a services firm
pub struct ServicesChartOfAccounts;

impl ServicesChartOfAccounts {
    /// Creates the standard accounts
    pub fn create_standard_accounts() -> Vec<Account> {
        vec![
            // Assets
            Account::new(AccountId::new(), "1000", "Cash", AccountType::Asset)
                .with_category(AccountCategory::Cash),
            Account::new(AccountId::new(), "1100", "Bank", AccountType::Asset)
                .with_category(AccountCategory::Bank),
            Account::new(AccountId::new(), "1200", "Accounts Receivable", AccountType::Asset)
                .with_category(AccountCategory::Receivables),
            // Liabilities
            Account::new(AccountId::new(), "2000", "Tax Payable", AccountType::Liability)
                .with_category(AccountCategory::TaxPayable),
            // Equity
            Account::new(AccountId::new(), "3000", "Retained Earnings", AccountType::Equity),
            // Revenue
            Account::new(AccountId::new(), "4000", "Service Income", AccountType::Revenue)
                .with_category(AccountCategory::ServiceIncome),
            // Expenses
            Account::new(AccountId::new(), "5000", "Operating Expense", AccountType::Expense)
                .with_category(AccountCategory::OperatingExpense),
        ]
    }
}
