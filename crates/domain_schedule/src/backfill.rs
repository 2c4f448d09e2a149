//! Recurrence backfill engine
//!
//! Walks candidate periods from the period containing a work's start date
//! up to "today" and materializes the eligible ones. Safe to invoke
//! repeatedly: existing periods are topped up, never duplicated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::materialize::{materialize_period, plan_tasks};
use crate::recurrence::PeriodBounds;
use crate::schedule::WorkSchedule;
use crate::template::ServiceTaskTemplate;

/// When a candidate period becomes eligible for materialization
///
/// Both policies existed in production at different times; the choice is
/// explicit configuration, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityPolicy {
    /// Create every period whose start date is on or before today
    AlwaysMaterialize,
    /// Create a period only once the earliest due date among its first
    /// tasks has strictly elapsed, avoiding empty or premature periods
    TaskDriven,
}

/// Result of one backfill pass over a work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillOutcome {
    /// Periods newly created in this pass
    pub periods_created: usize,
    /// Candidate periods examined
    pub periods_visited: usize,
    /// True when the iteration cap stopped the pass early; indicates
    /// misconfigured recurrence data and must be surfaced to the operator
    pub cap_exceeded: bool,
}

/// Runs one backfill pass over a recurring work
///
/// Starting at the period containing `work.start_date`, advances one span
/// at a time while the period start is on or before `today`. Each
/// candidate is checked against the eligibility policy; already-existing
/// periods are re-materialized only to pick up task instances added to
/// the service templates since the last pass.
///
/// The `cap` bounds the number of candidate periods visited in a single
/// invocation. Hitting it is not silent truncation of valid data: it is
/// reported through [`BackfillOutcome::cap_exceeded`] and logged as an
/// error, since it indicates broken recurrence configuration.
pub fn backfill(
    schedule: &mut WorkSchedule,
    templates: &[ServiceTaskTemplate],
    today: NaiveDate,
    policy: EligibilityPolicy,
    cap: usize,
) -> BackfillOutcome {
    let mut outcome = BackfillOutcome {
        periods_created: 0,
        periods_visited: 0,
        cap_exceeded: false,
    };

    let work = &schedule.work;
    if !work.is_recurring {
        tracing::debug!(work = %work.id, "work is not recurring, nothing to backfill");
        return outcome;
    }

    let mut bounds = PeriodBounds::containing(
        work.start_date,
        work.recurrence_pattern,
        work.fiscal_year_start_month,
    );

    while bounds.start <= today {
        if outcome.periods_visited >= cap {
            outcome.cap_exceeded = true;
            tracing::error!(
                work = %schedule.work.id,
                cap,
                "backfill iteration cap exceeded; recurrence data is misconfigured"
            );
            break;
        }
        outcome.periods_visited += 1;

        let exists = schedule.has_period(bounds);
        if exists || is_eligible(policy, templates, bounds, today) {
            // Errors here can only be duplicate periods, which the
            // existence check already rules out.
            if let Ok(period_id) = materialize_period(schedule, templates, bounds) {
                if !exists {
                    outcome.periods_created += 1;
                    tracing::debug!(
                        work = %schedule.work.id,
                        period = %period_id,
                        start = %bounds.start,
                        "materialized period"
                    );
                }
            }
        }

        bounds = bounds.next();
    }

    outcome
}

/// Decides whether a candidate period should be materialized yet
///
/// Under the task-driven policy, the period's "first tasks" are the
/// planned instances whose template granularity matches the period's
/// leaf granularity (the finest template span present); the period
/// becomes eligible once the earliest of their due dates has strictly
/// elapsed. A period that would hold no tasks is never eligible.
fn is_eligible(
    policy: EligibilityPolicy,
    templates: &[ServiceTaskTemplate],
    bounds: PeriodBounds,
    today: NaiveDate,
) -> bool {
    match policy {
        EligibilityPolicy::AlwaysMaterialize => true,
        EligibilityPolicy::TaskDriven => {
            let planned = plan_tasks(templates, bounds);
            let Some(leaf_span) = planned.iter().map(|t| t.template_span).min() else {
                return false;
            };
            planned
                .iter()
                .filter(|t| t.template_span == leaf_span)
                .map(|t| t.due_date)
                .min()
                .map(|first_due| first_due < today)
                .unwrap_or(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::RecurrencePattern;
    use crate::template::TaskRecurrence;
    use crate::work::Work;
    use core_kernel::{CustomerId, ServiceId};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly_schedule(start: NaiveDate) -> WorkSchedule {
        let work = Work::new(CustomerId::new(), ServiceId::new(), "Bookkeeping", start)
            .recurring(RecurrencePattern::Monthly);
        WorkSchedule::new(work)
    }

    fn monthly_template(service_id: ServiceId) -> ServiceTaskTemplate {
        ServiceTaskTemplate::new(service_id, "Close books", TaskRecurrence::Monthly)
    }

    #[test]
    fn test_always_policy_creates_every_elapsed_period() {
        let mut schedule = monthly_schedule(d(2025, 8, 1));
        let templates = vec![monthly_template(schedule.work.service_id)];

        let outcome = backfill(
            &mut schedule,
            &templates,
            d(2025, 10, 15),
            EligibilityPolicy::AlwaysMaterialize,
            200,
        );

        assert_eq!(outcome.periods_created, 3);
        assert!(!outcome.cap_exceeded);
        let starts: Vec<NaiveDate> = schedule.periods().iter().map(|p| p.period_start).collect();
        assert_eq!(starts, vec![d(2025, 8, 1), d(2025, 9, 1), d(2025, 10, 1)]);
    }

    #[test]
    fn test_second_pass_creates_nothing() {
        let mut schedule = monthly_schedule(d(2025, 8, 1));
        let templates = vec![monthly_template(schedule.work.service_id)];

        backfill(
            &mut schedule,
            &templates,
            d(2025, 10, 15),
            EligibilityPolicy::AlwaysMaterialize,
            200,
        );
        let second = backfill(
            &mut schedule,
            &templates,
            d(2025, 10, 15),
            EligibilityPolicy::AlwaysMaterialize,
            200,
        );

        assert_eq!(second.periods_created, 0);
        assert_eq!(schedule.periods().len(), 3);
        assert_eq!(schedule.tasks().len(), 3);
    }

    #[test]
    fn test_task_driven_policy_waits_for_first_due_date() {
        let mut schedule = monthly_schedule(d(2025, 8, 1));
        let templates = vec![monthly_template(schedule.work.service_id)];

        // October's task falls due on Oct 31, which has not elapsed.
        let outcome = backfill(
            &mut schedule,
            &templates,
            d(2025, 10, 15),
            EligibilityPolicy::TaskDriven,
            200,
        );

        assert_eq!(outcome.periods_created, 2);
        let starts: Vec<NaiveDate> = schedule.periods().iter().map(|p| p.period_start).collect();
        assert_eq!(starts, vec![d(2025, 8, 1), d(2025, 9, 1)]);
    }

    #[test]
    fn test_task_driven_due_date_must_strictly_elapse() {
        let mut schedule = monthly_schedule(d(2025, 8, 1));
        let templates = vec![monthly_template(schedule.work.service_id)];

        // Exactly on the due date: not yet elapsed.
        let outcome = backfill(
            &mut schedule,
            &templates,
            d(2025, 8, 31),
            EligibilityPolicy::TaskDriven,
            200,
        );
        assert_eq!(outcome.periods_created, 0);

        // One day later it is.
        let outcome = backfill(
            &mut schedule,
            &templates,
            d(2025, 9, 1),
            EligibilityPolicy::TaskDriven,
            200,
        );
        assert_eq!(outcome.periods_created, 1);
    }

    #[test]
    fn test_task_driven_without_templates_creates_nothing() {
        let mut schedule = monthly_schedule(d(2025, 8, 1));

        let outcome = backfill(
            &mut schedule,
            &[],
            d(2025, 10, 15),
            EligibilityPolicy::TaskDriven,
            200,
        );

        assert_eq!(outcome.periods_created, 0);
    }

    #[test]
    fn test_cap_trip_is_reported() {
        // A decade of monthly periods against a cap of 24.
        let mut schedule = monthly_schedule(d(2015, 1, 1));
        let templates = vec![monthly_template(schedule.work.service_id)];

        let outcome = backfill(
            &mut schedule,
            &templates,
            d(2025, 1, 1),
            EligibilityPolicy::AlwaysMaterialize,
            24,
        );

        assert!(outcome.cap_exceeded);
        assert_eq!(outcome.periods_created, 24);
    }

    #[test]
    fn test_monthly_templates_are_first_tasks_inside_quarterly_period() {
        let work = Work::new(
            CustomerId::new(),
            ServiceId::new(),
            "Quarterly compliance",
            d(2025, 7, 1),
        )
        .recurring(RecurrencePattern::Quarterly);
        let service_id = work.service_id;
        let mut schedule = WorkSchedule::new(work);
        let templates = vec![
            ServiceTaskTemplate::new(service_id, "Quarterly return", TaskRecurrence::Quarterly),
            monthly_template(service_id),
        ];

        // Jul-Sep period: quarterly task due Sep 30, but the July monthly
        // task (due Jul 31) is the first task and has elapsed by Aug 5.
        let outcome = backfill(
            &mut schedule,
            &templates,
            d(2025, 8, 5),
            EligibilityPolicy::TaskDriven,
            200,
        );

        assert_eq!(outcome.periods_created, 1);
        assert_eq!(schedule.periods()[0].period_start, d(2025, 7, 1));
    }
}
