//! Per-work schedule aggregate
//!
//! Holds a work together with its periods and task instances, enforcing
//! the two natural-key uniqueness invariants:
//! - one period per (work, period_start, period_end)
//! - one task instance per (period, template, due_date)

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{PeriodId, TaskId, TemplateId};

use crate::error::ScheduleError;
use crate::period::{PeriodTask, RecurringPeriod};
use crate::recurrence::PeriodBounds;
use crate::work::{Work, WorkTask};

/// A work with its materialized periods and tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSchedule {
    /// The engagement itself
    pub work: Work,
    periods: Vec<RecurringPeriod>,
    tasks: Vec<PeriodTask>,
    work_tasks: Vec<WorkTask>,
    bounds_index: HashMap<(NaiveDate, NaiveDate), PeriodId>,
    instance_keys: HashSet<(PeriodId, TemplateId, NaiveDate)>,
}

impl WorkSchedule {
    /// Creates an empty schedule for a work
    pub fn new(work: Work) -> Self {
        Self {
            work,
            periods: Vec::new(),
            tasks: Vec::new(),
            work_tasks: Vec::new(),
            bounds_index: HashMap::new(),
            instance_keys: HashSet::new(),
        }
    }

    /// Returns true if a period exists for the given boundaries
    pub fn has_period(&self, bounds: PeriodBounds) -> bool {
        self.bounds_index.contains_key(&(bounds.start, bounds.end))
    }

    /// Finds the period covering the given boundaries
    pub fn period_for_bounds(&self, bounds: PeriodBounds) -> Option<&RecurringPeriod> {
        self.bounds_index
            .get(&(bounds.start, bounds.end))
            .and_then(|id| self.period(*id))
    }

    /// Inserts a period, enforcing boundary uniqueness
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicatePeriod`] if one already covers
    /// the same boundaries.
    pub fn insert_period(&mut self, period: RecurringPeriod) -> Result<PeriodId, ScheduleError> {
        let key = (period.period_start, period.period_end);
        if self.bounds_index.contains_key(&key) {
            return Err(ScheduleError::DuplicatePeriod {
                work_id: self.work.id.to_string(),
                start: period.period_start,
                end: period.period_end,
            });
        }

        let id = period.id;
        self.bounds_index.insert(key, id);
        self.periods.push(period);
        Ok(id)
    }

    /// Inserts a task instance; returns false if its key already exists
    pub fn insert_task(&mut self, task: PeriodTask) -> bool {
        if !self.instance_keys.insert(task.instance_key()) {
            return false;
        }
        self.tasks.push(task);
        true
    }

    /// Adds a direct task to a non-recurring work
    pub fn insert_work_task(&mut self, task: WorkTask) {
        self.work_tasks.push(task);
    }

    /// Returns all periods, in insertion order
    pub fn periods(&self) -> &[RecurringPeriod] {
        &self.periods
    }

    /// Looks up a period by id
    pub fn period(&self, id: PeriodId) -> Option<&RecurringPeriod> {
        self.periods.iter().find(|p| p.id == id)
    }

    /// Looks up a period by id, mutably
    pub fn period_mut(&mut self, id: PeriodId) -> Option<&mut RecurringPeriod> {
        self.periods.iter_mut().find(|p| p.id == id)
    }

    /// Returns all task instances
    pub fn tasks(&self) -> &[PeriodTask] {
        &self.tasks
    }

    /// Returns the task instances belonging to one period
    pub fn tasks_for_period(&self, period_id: PeriodId) -> impl Iterator<Item = &PeriodTask> {
        self.tasks.iter().filter(move |t| t.period_id == period_id)
    }

    /// Looks up a task instance by id
    pub fn task(&self, id: TaskId) -> Option<&PeriodTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Looks up a task instance by id, mutably
    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut PeriodTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Splits mutable access between the work and one of its periods
    ///
    /// Billing marks both sides of the same transition, so both must be
    /// borrowed at once.
    pub fn work_and_period_mut(
        &mut self,
        id: PeriodId,
    ) -> (&mut Work, Option<&mut RecurringPeriod>) {
        let period = self.periods.iter_mut().find(|p| p.id == id);
        (&mut self.work, period)
    }

    /// Returns the direct tasks of a non-recurring work
    pub fn work_tasks(&self) -> &[WorkTask] {
        &self.work_tasks
    }

    /// Looks up a direct work task by id, mutably
    pub fn work_task_mut(&mut self, id: TaskId) -> Option<&mut WorkTask> {
        self.work_tasks.iter_mut().find(|t| t.id == id)
    }

    /// Recomputes the task counters of one period from its instances
    pub(crate) fn refresh_period_counters(&mut self, period_id: PeriodId) {
        let total = self.tasks.iter().filter(|t| t.period_id == period_id).count() as u32;
        let completed = self
            .tasks
            .iter()
            .filter(|t| {
                t.period_id == period_id && t.status == crate::period::TaskStatus::Completed
            })
            .count() as u32;

        if let Some(period) = self.period_mut(period_id) {
            period.total_tasks = total;
            period.completed_tasks = completed;
            period.all_tasks_completed = total > 0 && completed == total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::RecurrencePattern;
    use core_kernel::{CustomerId, ServiceId};

    fn schedule() -> WorkSchedule {
        let work = Work::new(
            CustomerId::new(),
            ServiceId::new(),
            "Monthly bookkeeping",
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
        )
        .recurring(RecurrencePattern::Monthly);
        WorkSchedule::new(work)
    }

    fn aug_bounds() -> PeriodBounds {
        PeriodBounds::containing(
            NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
            RecurrencePattern::Monthly,
            1,
        )
    }

    #[test]
    fn test_duplicate_period_rejected() {
        let mut schedule = schedule();
        let work_id = schedule.work.id;

        schedule
            .insert_period(RecurringPeriod::new(work_id, aug_bounds()))
            .unwrap();
        let result = schedule.insert_period(RecurringPeriod::new(work_id, aug_bounds()));

        assert!(matches!(result, Err(ScheduleError::DuplicatePeriod { .. })));
        assert_eq!(schedule.periods().len(), 1);
    }

    #[test]
    fn test_duplicate_task_instance_rejected() {
        let mut schedule = schedule();
        let work_id = schedule.work.id;
        let period_id = schedule
            .insert_period(RecurringPeriod::new(work_id, aug_bounds()))
            .unwrap();

        let template_id = TemplateId::new();
        let due = NaiveDate::from_ymd_opt(2025, 8, 31).unwrap();
        let task = PeriodTask::new(
            period_id,
            template_id,
            "GST filing",
            due,
            crate::template::TaskPriority::Medium,
        );
        assert!(schedule.insert_task(task));

        let dup = PeriodTask::new(
            period_id,
            template_id,
            "GST filing",
            due,
            crate::template::TaskPriority::Medium,
        );
        assert!(!schedule.insert_task(dup));
        assert_eq!(schedule.tasks().len(), 1);
    }
}
