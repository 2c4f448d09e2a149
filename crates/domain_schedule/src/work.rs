//! Billable engagements (works) and direct work tasks

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, Money, ServiceId, TaskId, WorkId};

use crate::period::TaskStatus;
use crate::recurrence::RecurrencePattern;
use crate::template::TaskPriority;

/// Status of a work engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Pending,
    InProgress,
    Completed,
}

/// Billing status of a work engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Unbilled,
    Billed,
}

/// A billable engagement for a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    /// Unique identifier
    pub id: WorkId,
    /// Customer being served
    pub customer_id: CustomerId,
    /// Service offering this work delivers
    pub service_id: ServiceId,
    /// Title
    pub title: String,
    /// Whether periods are generated for this work
    pub is_recurring: bool,
    /// Recurrence pattern; meaningful only when recurring
    pub recurrence_pattern: RecurrencePattern,
    /// Engagement start date; backfill begins at the period containing it
    pub start_date: NaiveDate,
    /// Month (1-12) the customer's fiscal year starts in
    pub fiscal_year_start_month: u32,
    /// Whether completion auto-generates invoices
    pub auto_bill: bool,
    /// Status, derived by the completion aggregator
    pub status: WorkStatus,
    /// Work-level billing amount override
    pub billing_amount: Option<Money>,
    /// Billing status, set by invoice generation
    pub billing_status: BillingStatus,
    /// Set on the transition into Completed, cleared on reversion
    pub completion_date: Option<NaiveDate>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Work {
    /// Creates a new non-recurring pending work
    pub fn new(
        customer_id: CustomerId,
        service_id: ServiceId,
        title: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: WorkId::new_v7(),
            customer_id,
            service_id,
            title: title.into(),
            is_recurring: false,
            recurrence_pattern: RecurrencePattern::Monthly,
            start_date,
            fiscal_year_start_month: 1,
            auto_bill: false,
            status: WorkStatus::Pending,
            billing_amount: None,
            billing_status: BillingStatus::Unbilled,
            completion_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Makes the work recurring with the given pattern
    pub fn recurring(mut self, pattern: RecurrencePattern) -> Self {
        self.is_recurring = true;
        self.recurrence_pattern = pattern;
        self
    }

    /// Sets the fiscal-year start month (1-12)
    pub fn with_fiscal_year_start(mut self, month: u32) -> Self {
        self.fiscal_year_start_month = month;
        self
    }

    /// Enables automatic invoice generation on completion
    pub fn with_auto_bill(mut self) -> Self {
        self.auto_bill = true;
        self
    }

    /// Sets a work-level billing amount
    pub fn with_billing_amount(mut self, amount: Money) -> Self {
        self.billing_amount = Some(amount);
        self
    }
}

/// A task attached directly to a non-recurring work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkTask {
    /// Unique identifier
    pub id: TaskId,
    /// Owning work
    pub work_id: WorkId,
    /// Title
    pub title: String,
    /// Due date, if any
    pub due_date: Option<NaiveDate>,
    /// Status, driven by the external caller
    pub status: TaskStatus,
    /// Priority
    pub priority: TaskPriority,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl WorkTask {
    /// Creates a new pending work task
    pub fn new(work_id: WorkId, title: impl Into<String>) -> Self {
        Self {
            id: TaskId::new_v7(),
            work_id,
            title: title.into(),
            due_date: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            created_at: Utc::now(),
        }
    }

    /// Sets the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}
