//! Invoice records
//!
//! Invoices are generated by the billing generator in draft status; the
//! posting state machine reacts to externally driven status changes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AccountId, CustomerId, InvoiceId, Money, PeriodId, Rate, WorkId};

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted; nothing posted
    Draft,
    /// Issued to the customer; posted to the ledger
    Sent,
    /// Fully paid; receipt voucher exists
    Paid,
    /// Voided; nothing posted
    Cancelled,
}

impl InvoiceStatus {
    /// Returns true for statuses whose ledger rows must exist
    pub fn is_posted_state(&self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Paid)
    }
}

/// A generated billing document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Invoice number (human-readable)
    pub invoice_number: String,
    /// Customer billed
    pub customer_id: CustomerId,
    /// Work this invoice bills
    pub work_id: WorkId,
    /// Period this invoice bills; None for non-recurring works
    pub period_id: Option<PeriodId>,
    /// Invoice date
    pub invoice_date: NaiveDate,
    /// Due date
    pub due_date: NaiveDate,
    /// Line items
    pub lines: Vec<InvoiceLine>,
    /// Sum of line totals before tax
    pub subtotal: Money,
    /// Tax on the subtotal
    pub tax_amount: Money,
    /// Subtotal plus tax
    pub total_amount: Money,
    /// Status
    pub status: InvoiceStatus,
    /// Income account resolved at generation time
    pub income_account: Option<AccountId>,
    /// Customer receivable account resolved at generation time
    pub customer_account: Option<AccountId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new empty draft invoice
    pub fn new(
        customer_id: CustomerId,
        work_id: WorkId,
        period_id: Option<PeriodId>,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
        currency: core_kernel::Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            invoice_number: generate_invoice_number(),
            customer_id,
            work_id,
            period_id,
            invoice_date,
            due_date,
            lines: Vec::new(),
            subtotal: Money::zero(currency),
            tax_amount: Money::zero(currency),
            total_amount: Money::zero(currency),
            status: InvoiceStatus::Draft,
            income_account: None,
            customer_account: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a line item and recalculates totals with the given tax rate
    pub fn add_line(&mut self, line: InvoiceLine, tax_rate: Rate) {
        self.lines.push(line);
        self.recalculate_totals(tax_rate);
    }

    /// Sets the resolved ledger account mappings
    pub fn with_accounts(
        mut self,
        income_account: Option<AccountId>,
        customer_account: Option<AccountId>,
    ) -> Self {
        self.income_account = income_account;
        self.customer_account = customer_account;
        self
    }

    /// Recalculates subtotal, tax, and total from the line items
    fn recalculate_totals(&mut self, tax_rate: Rate) {
        let currency = self.subtotal.currency();
        self.subtotal = self
            .lines
            .iter()
            .fold(Money::zero(currency), |acc, line| acc + line.total());
        self.tax_amount = tax_rate.apply(&self.subtotal).round_to_currency();
        self.total_amount = self.subtotal + self.tax_amount;
        self.updated_at = Utc::now();
    }
}

/// A line item on an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Line ID
    pub id: Uuid,
    /// Description
    pub description: String,
    /// Quantity
    pub quantity: Decimal,
    /// Unit price
    pub unit_price: Money,
}

impl InvoiceLine {
    /// Creates a new single-quantity line
    pub fn new(description: impl Into<String>, unit_price: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            quantity: Decimal::ONE,
            unit_price,
        }
    }

    /// Sets the quantity
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// Calculates the total for this line
    pub fn total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Generates a unique invoice number
fn generate_invoice_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("INV-{}", duration.as_nanos() % 10_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn draft() -> Invoice {
        Invoice::new(
            CustomerId::new(),
            WorkId::new(),
            None,
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 16).unwrap(),
            Currency::USD,
        )
    }

    #[test]
    fn test_new_invoice_is_draft_with_zero_totals() {
        let invoice = draft();
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert!(invoice.subtotal.is_zero());
        assert!(invoice.total_amount.is_zero());
        assert!(invoice.invoice_number.starts_with("INV-"));
    }

    #[test]
    fn test_tax_computed_from_rate_not_hardcoded() {
        let mut invoice = draft();
        invoice.add_line(
            InvoiceLine::new("Bookkeeping", Money::new(dec!(1000), Currency::USD)),
            Rate::from_percentage(dec!(5)),
        );

        assert_eq!(invoice.subtotal.amount(), dec!(1000));
        assert_eq!(invoice.tax_amount.amount(), dec!(50));
        assert_eq!(invoice.total_amount.amount(), dec!(1050));
    }

    #[test]
    fn test_zero_rate_means_zero_tax() {
        let mut invoice = draft();
        invoice.add_line(
            InvoiceLine::new("Bookkeeping", Money::new(dec!(1000), Currency::USD)),
            Rate::zero(),
        );

        assert!(invoice.tax_amount.is_zero());
        assert_eq!(invoice.total_amount.amount(), dec!(1000));
    }

    #[test]
    fn test_line_quantity_multiplies() {
        let line = InvoiceLine::new("Hours", Money::new(dec!(150), Currency::USD))
            .with_quantity(dec!(3));
        assert_eq!(line.total().amount(), dec!(450));
    }
}
