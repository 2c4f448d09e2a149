//! Service task templates and due-date resolution
//!
//! A template describes one unit of recurring work attached to a service
//! offering. Its recurrence granularity is independent of the owning
//! engagement's pattern: a monthly bookkeeping task can live inside a
//! quarterly compliance engagement.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ServiceId, TemplateId};

use crate::recurrence::last_day_of_month;

/// Recurrence granularity of a task template
///
/// Independent of the owning work's recurrence pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskRecurrence {
    Monthly,
    Quarterly,
    Yearly,
}

impl TaskRecurrence {
    /// Returns the number of months between task instances
    pub fn span_months(&self) -> u32 {
        match self {
            TaskRecurrence::Monthly => 1,
            TaskRecurrence::Quarterly => 3,
            TaskRecurrence::Yearly => 12,
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Rule determining when a task instance falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueRule {
    /// An absolute calendar date, ignoring the period entirely
    ExactDate(NaiveDate),
    /// Days after the period end (negative values fall before it)
    OffsetDays(i64),
    /// Whole months after the period end
    OffsetMonths(u32),
    /// A fixed day within the period-end month, clamped to month length
    DayOfMonth(u32),
}

/// A reusable task definition attached to a service offering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTaskTemplate {
    /// Unique identifier
    pub id: TemplateId,
    /// Owning service
    pub service_id: ServiceId,
    /// Task title; month-suffixed when instantiated per-month
    pub title: String,
    /// How often instances recur
    pub recurrence: TaskRecurrence,
    /// Due-date rule; None means the period end
    pub due_rule: Option<DueRule>,
    /// Priority copied onto instances
    pub priority: TaskPriority,
    /// Estimated effort in hours
    pub estimated_hours: Option<Decimal>,
    /// Display ordering within the service
    pub sort_order: u32,
}

impl ServiceTaskTemplate {
    /// Creates a new template with default priority and no due rule
    pub fn new(
        service_id: ServiceId,
        title: impl Into<String>,
        recurrence: TaskRecurrence,
    ) -> Self {
        Self {
            id: TemplateId::new_v7(),
            service_id,
            title: title.into(),
            recurrence,
            due_rule: None,
            priority: TaskPriority::Medium,
            estimated_hours: None,
            sort_order: 0,
        }
    }

    /// Sets the due-date rule
    pub fn with_due_rule(mut self, rule: DueRule) -> Self {
        self.due_rule = Some(rule);
        self
    }

    /// Sets the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the estimated hours
    pub fn with_estimated_hours(mut self, hours: Decimal) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Sets the sort order
    pub fn with_sort_order(mut self, order: u32) -> Self {
        self.sort_order = order;
        self
    }

    /// Resolves the due date for an instance anchored at `period_end`
    ///
    /// Precedence: exact date (absolute) over offset rules over the
    /// period end itself. Deterministic, so repeated materialization
    /// produces identical instances.
    pub fn due_date(&self, period_end: NaiveDate) -> NaiveDate {
        match self.due_rule {
            Some(DueRule::ExactDate(date)) => date,
            Some(DueRule::OffsetDays(days)) => period_end + chrono::Duration::days(days),
            Some(DueRule::OffsetMonths(months)) => period_end
                .checked_add_months(Months::new(months))
                .unwrap_or(period_end),
            Some(DueRule::DayOfMonth(day)) => {
                let last = last_day_of_month(period_end.year(), period_end.month());
                let clamped = day.clamp(1, last.day());
                NaiveDate::from_ymd_opt(period_end.year(), period_end.month(), clamped)
                    .unwrap_or(last)
            }
            None => period_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn template() -> ServiceTaskTemplate {
        ServiceTaskTemplate::new(ServiceId::new(), "GST filing", TaskRecurrence::Monthly)
    }

    #[test]
    fn test_no_rule_falls_back_to_period_end() {
        assert_eq!(template().due_date(d(2025, 8, 31)), d(2025, 8, 31));
    }

    #[test]
    fn test_exact_date_ignores_period() {
        let t = template().with_due_rule(DueRule::ExactDate(d(2026, 3, 31)));
        assert_eq!(t.due_date(d(2025, 8, 31)), d(2026, 3, 31));
    }

    #[test]
    fn test_offset_days_after_period_end() {
        let t = template().with_due_rule(DueRule::OffsetDays(10));
        assert_eq!(t.due_date(d(2025, 8, 31)), d(2025, 9, 10));
    }

    #[test]
    fn test_offset_months_clamps_day() {
        let t = template().with_due_rule(DueRule::OffsetMonths(1));
        // Aug 31 + 1 month clamps to Sep 30
        assert_eq!(t.due_date(d(2025, 8, 31)), d(2025, 9, 30));
    }

    #[test]
    fn test_day_of_month_clamped_to_month_length() {
        let t = template().with_due_rule(DueRule::DayOfMonth(31));
        assert_eq!(t.due_date(d(2025, 9, 30)), d(2025, 9, 30));
        assert_eq!(t.due_date(d(2024, 2, 29)), d(2024, 2, 29));
        assert_eq!(t.due_date(d(2025, 8, 31)), d(2025, 8, 31));
    }

    #[test]
    fn test_day_of_month_within_month() {
        let t = template().with_due_rule(DueRule::DayOfMonth(20));
        assert_eq!(t.due_date(d(2025, 9, 30)), d(2025, 9, 20));
    }

    #[test]
    fn test_builder_fields() {
        let t = template()
            .with_priority(TaskPriority::High)
            .with_estimated_hours(dec!(2.5))
            .with_sort_order(3);

        assert_eq!(t.priority, TaskPriority::High);
        assert_eq!(t.estimated_hours, Some(dec!(2.5)));
        assert_eq!(t.sort_order, 3);
    }
}
