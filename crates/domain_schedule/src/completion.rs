//! Completion aggregation
//!
//! Rolls task status changes up through periods to the owning work.
//! Every recomputation compares old status against new status and only
//! reports genuine transitions, so downstream effects (invoice
//! generation) fire at most once per transition and the aggregator's own
//! writes can never feed back into themselves.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{PeriodId, TaskId, WorkId};

use crate::error::ScheduleError;
use crate::period::{PeriodStatus, TaskStatus};
use crate::schedule::WorkSchedule;
use crate::work::WorkStatus;

/// A state transition produced by one aggregation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionEffect {
    /// A period's tasks all became completed
    PeriodCompleted(PeriodId),
    /// A completed period had a task reopened
    PeriodReopened(PeriodId),
    /// Every period of the work became fully completed
    WorkCompleted(WorkId),
    /// A completed work regressed
    WorkReopened(WorkId),
}

/// Applies a status change to a period task and aggregates upward
///
/// Setting a task to its current status is a no-op and produces no
/// effects. Otherwise the owning period's counters are recomputed, its
/// status flipped on the all-tasks-completed condition changing, and the
/// work status derived from all of its periods.
///
/// # Errors
///
/// Returns [`ScheduleError::TaskNotFound`] for an unknown task id.
pub fn set_task_status(
    schedule: &mut WorkSchedule,
    task_id: TaskId,
    new_status: TaskStatus,
    today: NaiveDate,
) -> Result<Vec<CompletionEffect>, ScheduleError> {
    let task = schedule
        .task_mut(task_id)
        .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;

    if task.status == new_status {
        return Ok(Vec::new());
    }
    task.status = new_status;
    let period_id = task.period_id;

    let mut effects = Vec::new();

    let was_complete = schedule
        .period(period_id)
        .map(|p| p.all_tasks_completed)
        .unwrap_or(false);
    schedule.refresh_period_counters(period_id);

    let period = schedule
        .period_mut(period_id)
        .ok_or_else(|| ScheduleError::PeriodNotFound(period_id.to_string()))?;

    if period.all_tasks_completed && !was_complete {
        period.status = PeriodStatus::Completed;
        effects.push(CompletionEffect::PeriodCompleted(period_id));
    } else if !period.all_tasks_completed && was_complete {
        period.status = PeriodStatus::Pending;
        effects.push(CompletionEffect::PeriodReopened(period_id));
    }

    effects.extend(aggregate_work(schedule, today));
    Ok(effects)
}

/// Applies a status change to a direct task of a non-recurring work
///
/// The same all-or-nothing rule as for periods, applied to the work's
/// own task set.
pub fn set_work_task_status(
    schedule: &mut WorkSchedule,
    task_id: TaskId,
    new_status: TaskStatus,
    today: NaiveDate,
) -> Result<Vec<CompletionEffect>, ScheduleError> {
    let task = schedule
        .work_task_mut(task_id)
        .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;

    if task.status == new_status {
        return Ok(Vec::new());
    }
    task.status = new_status;

    Ok(aggregate_work(schedule, today))
}

/// Derives the work status from its periods or direct tasks
fn aggregate_work(schedule: &mut WorkSchedule, today: NaiveDate) -> Vec<CompletionEffect> {
    let complete = if schedule.work.is_recurring {
        !schedule.periods().is_empty()
            && schedule.periods().iter().all(|p| p.all_tasks_completed)
    } else {
        !schedule.work_tasks().is_empty()
            && schedule
                .work_tasks()
                .iter()
                .all(|t| t.status == TaskStatus::Completed)
    };

    let work = &mut schedule.work;
    let mut effects = Vec::new();

    if complete && work.status != WorkStatus::Completed {
        work.status = WorkStatus::Completed;
        work.completion_date = Some(today);
        work.updated_at = chrono::Utc::now();
        effects.push(CompletionEffect::WorkCompleted(work.id));
    } else if !complete && work.status == WorkStatus::Completed {
        work.status = WorkStatus::InProgress;
        work.completion_date = None;
        work.updated_at = chrono::Utc::now();
        effects.push(CompletionEffect::WorkReopened(work.id));
    }

    effects
}
