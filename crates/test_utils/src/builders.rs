//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for
//! everything else.

use chrono::NaiveDate;

use core_kernel::{CustomerId, Money, ServiceId};
use domain_schedule::{
    DueRule, RecurrencePattern, ServiceTaskTemplate, TaskPriority, TaskRecurrence, Work,
};

use crate::fixtures::DateFixtures;

/// Builder for test works
pub struct TestWorkBuilder {
    customer_id: CustomerId,
    service_id: ServiceId,
    title: String,
    start_date: NaiveDate,
    recurrence: Option<RecurrencePattern>,
    fiscal_year_start_month: u32,
    auto_bill: bool,
    billing_amount: Option<Money>,
}

impl Default for TestWorkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkBuilder {
    /// Creates a builder for a monthly recurring work starting Aug 2025
    pub fn new() -> Self {
        Self {
            customer_id: CustomerId::new(),
            service_id: ServiceId::new(),
            title: "Monthly bookkeeping".to_string(),
            start_date: DateFixtures::engagement_start(),
            recurrence: Some(RecurrencePattern::Monthly),
            fiscal_year_start_month: 1,
            auto_bill: false,
            billing_amount: None,
        }
    }

    /// Sets the customer
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    /// Sets the service
    pub fn with_service(mut self, service_id: ServiceId) -> Self {
        self.service_id = service_id;
        self
    }

    /// Sets the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the start date
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// Sets the recurrence pattern
    pub fn with_recurrence(mut self, pattern: RecurrencePattern) -> Self {
        self.recurrence = Some(pattern);
        self
    }

    /// Makes the work non-recurring
    pub fn non_recurring(mut self) -> Self {
        self.recurrence = None;
        self
    }

    /// Sets the fiscal year start month
    pub fn with_fiscal_year_start(mut self, month: u32) -> Self {
        self.fiscal_year_start_month = month;
        self
    }

    /// Enables auto-billing
    pub fn auto_billed(mut self) -> Self {
        self.auto_bill = true;
        self
    }

    /// Sets a work-level billing amount
    pub fn with_billing_amount(mut self, amount: Money) -> Self {
        self.billing_amount = Some(amount);
        self
    }

    /// Builds the work
    pub fn build(self) -> Work {
        let mut work = Work::new(self.customer_id, self.service_id, self.title, self.start_date)
            .with_fiscal_year_start(self.fiscal_year_start_month);
        if let Some(pattern) = self.recurrence {
            work = work.recurring(pattern);
        }
        if self.auto_bill {
            work = work.with_auto_bill();
        }
        if let Some(amount) = self.billing_amount {
            work = work.with_billing_amount(amount);
        }
        work
    }
}

/// Builder for service task templates
pub struct TestTemplateBuilder {
    service_id: ServiceId,
    title: String,
    recurrence: TaskRecurrence,
    due_rule: Option<DueRule>,
    priority: TaskPriority,
    sort_order: u32,
}

impl TestTemplateBuilder {
    /// Creates a builder for a monthly template on the given service
    pub fn new(service_id: ServiceId) -> Self {
        Self {
            service_id,
            title: "Close books".to_string(),
            recurrence: TaskRecurrence::Monthly,
            due_rule: None,
            priority: TaskPriority::Medium,
            sort_order: 0,
        }
    }

    /// Sets the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the task recurrence
    pub fn with_recurrence(mut self, recurrence: TaskRecurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Sets the due rule
    pub fn with_due_rule(mut self, rule: DueRule) -> Self {
        self.due_rule = Some(rule);
        self
    }

    /// Sets the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the sort order
    pub fn with_sort_order(mut self, order: u32) -> Self {
        self.sort_order = order;
        self
    }

    /// Builds the template
    pub fn build(self) -> ServiceTaskTemplate {
        let mut template = ServiceTaskTemplate::new(self.service_id, self.title, self.recurrence)
            .with_priority(self.priority)
            .with_sort_order(self.sort_order);
        if let Some(rule) = self.due_rule {
            template = template.with_due_rule(rule);
        }
        template
    }
}
