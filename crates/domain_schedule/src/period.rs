//! Recurring periods and their instantiated tasks

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceId, Money, PeriodId, TaskId, TemplateId, WorkId};

use crate::recurrence::PeriodBounds;
use crate::template::TaskPriority;

/// Status of a recurring period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Open; not all tasks are completed
    Pending,
    /// Every task in the period is completed
    Completed,
}

/// Status of an instantiated task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

/// One calendar period instance of a recurring work
///
/// Unique per (work, period_start, period_end); regenerating the same
/// boundaries is a no-op, never a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringPeriod {
    /// Unique identifier
    pub id: PeriodId,
    /// Owning work
    pub work_id: WorkId,
    /// First day of the period
    pub period_start: NaiveDate,
    /// Last day of the period
    pub period_end: NaiveDate,
    /// When the period as a whole falls due
    pub due_date: NaiveDate,
    /// Derived status
    pub status: PeriodStatus,
    /// Number of task instances in the period
    pub total_tasks: u32,
    /// Number of completed task instances
    pub completed_tasks: u32,
    /// True when total_tasks > 0 and all are completed
    pub all_tasks_completed: bool,
    /// Period-specific billing override, highest amount precedence
    pub amount_override: Option<Money>,
    /// Invoice generated for this period, if any
    pub invoice_id: Option<InvoiceId>,
    /// Whether billing has run for this period
    pub is_billed: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl RecurringPeriod {
    /// Creates a new pending period for the given boundaries
    pub fn new(work_id: WorkId, bounds: PeriodBounds) -> Self {
        Self {
            id: PeriodId::new_v7(),
            work_id,
            period_start: bounds.start,
            period_end: bounds.end,
            due_date: bounds.end,
            status: PeriodStatus::Pending,
            total_tasks: 0,
            completed_tasks: 0,
            all_tasks_completed: false,
            amount_override: None,
            invoice_id: None,
            is_billed: false,
            created_at: Utc::now(),
        }
    }

    /// Returns the period boundaries
    pub fn bounds(&self) -> PeriodBounds {
        PeriodBounds {
            start: self.period_start,
            end: self.period_end,
        }
    }

    /// Sets a period-specific billing override
    pub fn with_amount_override(mut self, amount: Money) -> Self {
        self.amount_override = Some(amount);
        self
    }
}

/// An instantiated task inside a period
///
/// Unique per (period, template, due_date) so repeated backfill runs
/// cannot duplicate instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodTask {
    /// Unique identifier
    pub id: TaskId,
    /// Owning period
    pub period_id: PeriodId,
    /// Template this instance came from
    pub template_id: TemplateId,
    /// Title, month-suffixed for per-month instances
    pub title: String,
    /// Resolved due date
    pub due_date: NaiveDate,
    /// Status, driven by the external caller
    pub status: TaskStatus,
    /// Priority copied from the template
    pub priority: TaskPriority,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl PeriodTask {
    /// Creates a new pending task instance
    pub fn new(
        period_id: PeriodId,
        template_id: TemplateId,
        title: impl Into<String>,
        due_date: NaiveDate,
        priority: TaskPriority,
    ) -> Self {
        Self {
            id: TaskId::new_v7(),
            period_id,
            template_id,
            title: title.into(),
            due_date,
            status: TaskStatus::Pending,
            priority,
            created_at: Utc::now(),
        }
    }

    /// Returns the deduplication key for this instance
    pub fn instance_key(&self) -> (PeriodId, TemplateId, NaiveDate) {
        (self.period_id, self.template_id, self.due_date)
    }
}
