//! Invoice generation on completion
//!
//! Fired by the cascade when a period or work transitions into completed
//! and the work has auto-billing enabled. Resolves price, tax, and ledger
//! accounts by precedence and always produces a draft invoice; posting is
//! the state machine's job, so missing account mappings defer posting
//! instead of failing generation.

use chrono::NaiveDate;

use domain_schedule::{BillingStatus, RecurringPeriod, Work};

use core_kernel::Money;

use crate::catalog::{CompanySettings, Customer, ServiceOffering};
use crate::invoice::{Invoice, InvoiceLine};

/// Read-only inputs for price, tax, and account resolution
#[derive(Debug, Clone, Copy)]
pub struct BillingContext<'a> {
    /// The customer being billed
    pub customer: &'a Customer,
    /// The service the work delivers
    pub service: &'a ServiceOffering,
    /// Company-wide defaults
    pub settings: &'a CompanySettings,
}

impl<'a> BillingContext<'a> {
    /// Resolves the billable amount by precedence:
    /// period override, then work amount, then the customer's negotiated
    /// price, then the service default
    fn resolve_amount(&self, work: &Work, period: Option<&RecurringPeriod>) -> Money {
        period
            .and_then(|p| p.amount_override)
            .or(work.billing_amount)
            .or_else(|| {
                self.customer
                    .negotiated_prices
                    .get(&work.service_id)
                    .copied()
            })
            .unwrap_or(self.service.default_price)
    }
}

/// Generates the invoice for a completed period
///
/// Returns None without side effects when the work does not auto-bill or
/// the period is already billed; duplicate prevention keyed on the
/// (work, period) pair is the caller's existence check plus the period's
/// `is_billed` flag.
pub fn generate_for_period(
    work: &mut Work,
    period: &mut RecurringPeriod,
    ctx: &BillingContext<'_>,
    today: NaiveDate,
) -> Option<Invoice> {
    if !work.auto_bill {
        tracing::debug!(work = %work.id, "auto-billing disabled, skipping invoice");
        return None;
    }
    if period.is_billed || period.invoice_id.is_some() {
        tracing::debug!(period = %period.id, "period already billed, skipping invoice");
        return None;
    }

    let amount = ctx.resolve_amount(work, Some(period));
    let description = format!(
        "{} ({} to {})",
        work.title, period.period_start, period.period_end
    );
    let invoice = build_invoice(work, Some(period), ctx, today, amount, description);

    period.invoice_id = Some(invoice.id);
    period.is_billed = true;
    work.billing_status = BillingStatus::Billed;

    Some(invoice)
}

/// Generates the invoice for a completed non-recurring work
pub fn generate_for_work(
    work: &mut Work,
    ctx: &BillingContext<'_>,
    today: NaiveDate,
) -> Option<Invoice> {
    if !work.auto_bill {
        tracing::debug!(work = %work.id, "auto-billing disabled, skipping invoice");
        return None;
    }
    if work.billing_status == BillingStatus::Billed {
        tracing::debug!(work = %work.id, "work already billed, skipping invoice");
        return None;
    }

    let amount = ctx.resolve_amount(work, None);
    let invoice = build_invoice(work, None, ctx, today, amount, work.title.clone());
    work.billing_status = BillingStatus::Billed;

    Some(invoice)
}

fn build_invoice(
    work: &Work,
    period: Option<&RecurringPeriod>,
    ctx: &BillingContext<'_>,
    today: NaiveDate,
    amount: Money,
    description: String,
) -> Invoice {
    let income_account = ctx
        .service
        .income_account
        .or(ctx.settings.default_income_account);
    if income_account.is_none() {
        tracing::warn!(
            work = %work.id,
            "no income account mapped; invoice will stay unposted until mapped"
        );
    }
    let customer_account = ctx.customer.ledger_account;
    if customer_account.is_none() {
        tracing::warn!(
            customer = %ctx.customer.id,
            "customer has no ledger account; invoice will stay unposted until mapped"
        );
    }

    let due_date = today + chrono::Duration::days(ctx.settings.invoice_due_days as i64);
    let mut invoice = Invoice::new(
        work.customer_id,
        work.id,
        period.map(|p| p.id),
        today,
        due_date,
        amount.currency(),
    )
    .with_accounts(income_account, customer_account);

    invoice.add_line(InvoiceLine::new(description, amount), ctx.service.tax_rate);

    tracing::debug!(
        invoice = %invoice.id,
        work = %work.id,
        total = %invoice.total_amount,
        "generated draft invoice"
    );
    invoice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceStatus;
    use core_kernel::{AccountId, Currency, Rate};
    use domain_schedule::{PeriodBounds, RecurrencePattern};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn fixture() -> (Work, RecurringPeriod, Customer, ServiceOffering, CompanySettings) {
        let service = ServiceOffering::new("Bookkeeping", usd(dec!(500)))
            .with_tax_rate(Rate::from_percentage(dec!(5)))
            .with_income_account(AccountId::new());
        let customer = Customer::new("Acme Traders").with_ledger_account(AccountId::new());
        let work = Work::new(customer.id, service.id, "Monthly bookkeeping", d(2025, 8, 1))
            .recurring(RecurrencePattern::Monthly)
            .with_auto_bill();
        let bounds = PeriodBounds::containing(d(2025, 8, 1), RecurrencePattern::Monthly, 1);
        let period = RecurringPeriod::new(work.id, bounds);
        (work, period, customer, service, CompanySettings::default())
    }

    #[test]
    fn test_invoice_uses_service_default_price_and_tax() {
        let (mut work, mut period, customer, service, settings) = fixture();
        let ctx = BillingContext {
            customer: &customer,
            service: &service,
            settings: &settings,
        };

        let invoice = generate_for_period(&mut work, &mut period, &ctx, d(2025, 9, 1)).unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.subtotal.amount(), dec!(500));
        assert_eq!(invoice.tax_amount.amount(), dec!(25));
        assert_eq!(invoice.total_amount.amount(), dec!(525));
        assert_eq!(invoice.lines.len(), 1);
        assert!(period.is_billed);
        assert_eq!(period.invoice_id, Some(invoice.id));
        assert_eq!(work.billing_status, BillingStatus::Billed);
    }

    #[test]
    fn test_amount_precedence_period_override_wins() {
        let (mut work, mut period, mut customer, service, settings) = fixture();
        work.billing_amount = Some(usd(dec!(450)));
        customer = customer.with_negotiated_price(service.id, usd(dec!(400)));
        period.amount_override = Some(usd(dec!(475)));
        let ctx = BillingContext {
            customer: &customer,
            service: &service,
            settings: &settings,
        };

        let invoice = generate_for_period(&mut work, &mut period, &ctx, d(2025, 9, 1)).unwrap();
        assert_eq!(invoice.subtotal.amount(), dec!(475));
    }

    #[test]
    fn test_amount_precedence_work_then_customer() {
        let (mut work, mut period, customer, service, settings) = fixture();
        let customer = customer.with_negotiated_price(service.id, usd(dec!(400)));
        work.billing_amount = Some(usd(dec!(450)));
        let ctx = BillingContext {
            customer: &customer,
            service: &service,
            settings: &settings,
        };
        let invoice = generate_for_period(&mut work, &mut period, &ctx, d(2025, 9, 1)).unwrap();
        assert_eq!(invoice.subtotal.amount(), dec!(450));

        // Without the work amount, the negotiated price applies.
        let (mut work, mut period, customer, service, settings) = fixture();
        let customer = customer.with_negotiated_price(service.id, usd(dec!(400)));
        let ctx = BillingContext {
            customer: &customer,
            service: &service,
            settings: &settings,
        };
        let invoice = generate_for_period(&mut work, &mut period, &ctx, d(2025, 9, 1)).unwrap();
        assert_eq!(invoice.subtotal.amount(), dec!(400));
    }

    #[test]
    fn test_no_auto_bill_generates_nothing() {
        let (mut work, mut period, customer, service, settings) = fixture();
        work.auto_bill = false;
        let ctx = BillingContext {
            customer: &customer,
            service: &service,
            settings: &settings,
        };

        assert!(generate_for_period(&mut work, &mut period, &ctx, d(2025, 9, 1)).is_none());
        assert!(!period.is_billed);
    }

    #[test]
    fn test_billed_period_is_not_billed_twice() {
        let (mut work, mut period, customer, service, settings) = fixture();
        let ctx = BillingContext {
            customer: &customer,
            service: &service,
            settings: &settings,
        };

        assert!(generate_for_period(&mut work, &mut period, &ctx, d(2025, 9, 1)).is_some());
        assert!(generate_for_period(&mut work, &mut period, &ctx, d(2025, 9, 1)).is_none());
    }

    #[test]
    fn test_unmapped_accounts_still_produce_draft_invoice() {
        let (mut work, mut period, _, service, settings) = fixture();
        let customer = Customer::new("No mapping yet");
        let service = ServiceOffering::new("Bookkeeping", service.default_price);
        let ctx = BillingContext {
            customer: &customer,
            service: &service,
            settings: &settings,
        };

        let invoice = generate_for_period(&mut work, &mut period, &ctx, d(2025, 9, 1)).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert!(invoice.income_account.is_none());
        assert!(invoice.customer_account.is_none());
    }

    #[test]
    fn test_company_default_income_account_fallback() {
        let (mut work, mut period, customer, service, mut settings) = fixture();
        let service = ServiceOffering::new("Bookkeeping", service.default_price);
        let company_income = AccountId::new();
        settings.default_income_account = Some(company_income);
        let ctx = BillingContext {
            customer: &customer,
            service: &service,
            settings: &settings,
        };

        let invoice = generate_for_period(&mut work, &mut period, &ctx, d(2025, 9, 1)).unwrap();
        assert_eq!(invoice.income_account, Some(company_income));
    }

    #[test]
    fn test_non_recurring_work_invoice_has_no_period() {
        let (_, _, customer, service, settings) = fixture();
        let mut work = Work::new(customer.id, service.id, "One-off audit", d(2025, 8, 1))
            .with_auto_bill()
            .with_billing_amount(usd(dec!(2000)));
        let ctx = BillingContext {
            customer: &customer,
            service: &service,
            settings: &settings,
        };

        let invoice = generate_for_work(&mut work, &ctx, d(2025, 9, 1)).unwrap();
        assert!(invoice.period_id.is_none());
        assert_eq!(invoice.subtotal.amount(), dec!(2000));
        assert_eq!(work.billing_status, BillingStatus::Billed);

        assert!(generate_for_work(&mut work, &ctx, d(2025, 9, 1)).is_none());
    }
}
