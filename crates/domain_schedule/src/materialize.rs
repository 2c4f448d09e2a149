//! Period and task materialization
//!
//! Turns a period boundary into a stored [`RecurringPeriod`] plus the task
//! instances the service templates call for. Nested recurrence is handled
//! here: a monthly template inside a yearly period produces twelve
//! month-suffixed instances.
//!
//! Materialization is idempotent: existing periods are reused and task
//! instances deduplicate on (period, template, due_date), so it is safe
//! to run on every backfill pass.

use chrono::NaiveDate;

use core_kernel::PeriodId;

use crate::error::ScheduleError;
use crate::period::{PeriodTask, RecurringPeriod};
use crate::recurrence::PeriodBounds;
use crate::schedule::WorkSchedule;
use crate::template::{ServiceTaskTemplate, TaskPriority};

/// A task instance the materializer intends to create
#[derive(Debug, Clone)]
pub(crate) struct PlannedTask {
    pub template_id: core_kernel::TemplateId,
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub template_span: u32,
}

/// Plans the task instances for one period without touching storage
///
/// Template granularity versus period span decides the fan-out:
/// - equal span: one instance anchored at the period end;
/// - monthly template in a multi-month period: one instance per contained
///   month, title suffixed with the month name;
/// - quarterly template in a half-yearly or yearly period: one instance
///   per contained quarter, anchored at the quarter's last month;
/// - a template wider than the period is skipped (documented limitation).
pub(crate) fn plan_tasks(
    templates: &[ServiceTaskTemplate],
    bounds: PeriodBounds,
) -> Vec<PlannedTask> {
    let period_span = bounds.span_months();
    let mut sorted: Vec<&ServiceTaskTemplate> = templates.iter().collect();
    sorted.sort_by_key(|t| t.sort_order);

    let mut planned = Vec::new();
    for template in sorted {
        let template_span = template.recurrence.span_months();

        if template_span == period_span {
            planned.push(PlannedTask {
                template_id: template.id,
                title: template.title.clone(),
                due_date: template.due_date(bounds.end),
                priority: template.priority,
                template_span,
            });
        } else if template_span == 1 && period_span > 1 {
            for month_end in bounds.month_ends() {
                planned.push(PlannedTask {
                    template_id: template.id,
                    title: format!("{} - {}", template.title, month_end.format("%B")),
                    due_date: template.due_date(month_end),
                    priority: template.priority,
                    template_span,
                });
            }
        } else if template_span == 3 && period_span > 3 && period_span % 3 == 0 {
            for quarter_end in bounds.quarter_ends() {
                planned.push(PlannedTask {
                    template_id: template.id,
                    title: template.title.clone(),
                    due_date: template.due_date(quarter_end),
                    priority: template.priority,
                    template_span,
                });
            }
        } else {
            // Wider than the period, or not dividing it evenly.
            tracing::debug!(
                template = %template.id,
                template_span,
                period_span,
                "template granularity does not fit period, skipping"
            );
        }
    }

    planned
}

/// Materializes the period for `bounds` and its eligible task instances
///
/// Creates the period record if absent, instantiates planned tasks that
/// do not already exist, and recomputes the period's task counters.
///
/// # Errors
///
/// Returns an error only for genuine storage inconsistencies; duplicate
/// periods and tasks are silent no-ops.
pub fn materialize_period(
    schedule: &mut WorkSchedule,
    templates: &[ServiceTaskTemplate],
    bounds: PeriodBounds,
) -> Result<PeriodId, ScheduleError> {
    let period_id = match schedule.period_for_bounds(bounds) {
        Some(existing) => {
            tracing::debug!(period = %existing.id, "period already materialized");
            existing.id
        }
        None => schedule.insert_period(RecurringPeriod::new(schedule.work.id, bounds))?,
    };

    for plan in plan_tasks(templates, bounds) {
        let task = PeriodTask::new(
            period_id,
            plan.template_id,
            plan.title,
            plan.due_date,
            plan.priority,
        );
        if !schedule.insert_task(task) {
            tracing::debug!(
                period = %period_id,
                template = %plan.template_id,
                due = %plan.due_date,
                "task instance already exists"
            );
        }
    }

    schedule.refresh_period_counters(period_id);
    Ok(period_id)
}
