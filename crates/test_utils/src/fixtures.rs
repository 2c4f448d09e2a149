//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the engagement
//! billing core. Designed to be consistent and predictable for unit
//! tests.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{AccountId, Currency, Money, Rate};
use domain_billing::{
    Account, AccountType, CompanySettings, Customer, Ledger, ReceiptDeposit, ServiceOffering,
};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard USD amount
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    /// Typical monthly service fee
    pub fn usd_fee() -> Money {
        Money::new(dec!(500.00), Currency::USD)
    }

    /// Zero USD
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }
}

/// Fixture for calendar test data
pub struct DateFixtures;

impl DateFixtures {
    /// Standard engagement start (Aug 1, 2025)
    pub fn engagement_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date")
    }

    /// A "today" two full months after the engagement start
    pub fn mid_october() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid date")
    }

    /// Builds an arbitrary date
    pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }
}

/// A fully mapped billing world: ledger with accounts, a customer with a
/// receivable, a taxed service with an income account, and settings with
/// a bank deposit account.
pub struct BillingWorld {
    pub ledger: Ledger,
    pub customer: Customer,
    pub service: ServiceOffering,
    pub settings: CompanySettings,
    pub receivable: AccountId,
    pub income: AccountId,
    pub bank: AccountId,
}

impl BillingWorld {
    /// Creates the standard world in USD with an 18% service tax
    pub fn standard() -> Self {
        let mut ledger = Ledger::new(Currency::USD);
        let receivable = AccountId::new();
        let income = AccountId::new();
        let bank = AccountId::new();
        ledger
            .add_account(Account::new(receivable, "1201", "Acme Traders", AccountType::Asset))
            .expect("fresh ledger");
        ledger
            .add_account(Account::new(income, "4000", "Service Income", AccountType::Revenue))
            .expect("fresh ledger");
        ledger
            .add_account(Account::new(bank, "1100", "Bank", AccountType::Asset))
            .expect("fresh ledger");

        let customer = Customer::new("Acme Traders").with_ledger_account(receivable);
        let service = ServiceOffering::new("GST Compliance", MoneyFixtures::usd_fee())
            .with_tax_rate(Rate::from_percentage(dec!(18)))
            .with_income_account(income);
        let settings = CompanySettings {
            bank_account: Some(bank),
            receipt_deposit: ReceiptDeposit::Bank,
            ..CompanySettings::default()
        };

        Self {
            ledger,
            customer,
            service,
            settings,
            receivable,
            income,
            bank,
        }
    }
}
