//! Integration tests for the schedule domain

use chrono::NaiveDate;

use core_kernel::{CustomerId, ServiceId, TaskId};
use domain_schedule::{
    backfill, materialize_period, set_task_status, CompletionEffect, DueRule, EligibilityPolicy,
    PeriodBounds, RecurrencePattern, ServiceTaskTemplate, TaskRecurrence, TaskStatus, Work,
    WorkSchedule,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

mod backfill_tests {
    use super::*;

    #[test]
    fn test_monthly_work_backfills_three_periods_and_stays_idempotent() {
        // Monthly work starting 2025-08-01 evaluated on 2025-10-15 must
        // produce exactly Aug, Sep, and Oct periods.
        let work = Work::new(
            CustomerId::new(),
            ServiceId::new(),
            "Monthly bookkeeping",
            d(2025, 8, 1),
        )
        .recurring(RecurrencePattern::Monthly);
        let templates = vec![ServiceTaskTemplate::new(
            work.service_id,
            "Close books",
            TaskRecurrence::Monthly,
        )];
        let mut schedule = WorkSchedule::new(work);

        let first = backfill(
            &mut schedule,
            &templates,
            d(2025, 10, 15),
            EligibilityPolicy::AlwaysMaterialize,
            200,
        );
        assert_eq!(first.periods_created, 3);

        let second = backfill(
            &mut schedule,
            &templates,
            d(2025, 10, 15),
            EligibilityPolicy::AlwaysMaterialize,
            200,
        );
        assert_eq!(second.periods_created, 0);
        assert_eq!(schedule.periods().len(), 3);

        let bounds: Vec<(NaiveDate, NaiveDate)> = schedule
            .periods()
            .iter()
            .map(|p| (p.period_start, p.period_end))
            .collect();
        assert_eq!(
            bounds,
            vec![
                (d(2025, 8, 1), d(2025, 8, 31)),
                (d(2025, 9, 1), d(2025, 9, 30)),
                (d(2025, 10, 1), d(2025, 10, 31)),
            ]
        );
    }

    #[test]
    fn test_quarterly_work_with_april_fiscal_year() {
        let work = Work::new(
            CustomerId::new(),
            ServiceId::new(),
            "Quarterly compliance",
            d(2025, 5, 20),
        )
        .recurring(RecurrencePattern::Quarterly)
        .with_fiscal_year_start(4);
        let templates = vec![ServiceTaskTemplate::new(
            work.service_id,
            "Quarterly filing",
            TaskRecurrence::Quarterly,
        )];
        let mut schedule = WorkSchedule::new(work);

        backfill(
            &mut schedule,
            &templates,
            d(2025, 11, 1),
            EligibilityPolicy::AlwaysMaterialize,
            200,
        );

        // Fiscal quarters: Apr-Jun, Jul-Sep, Oct-Dec.
        let starts: Vec<NaiveDate> = schedule.periods().iter().map(|p| p.period_start).collect();
        assert_eq!(starts, vec![d(2025, 4, 1), d(2025, 7, 1), d(2025, 10, 1)]);
    }

    #[test]
    fn test_task_driven_policy_creates_zero_periods_before_first_due() {
        let work = Work::new(
            CustomerId::new(),
            ServiceId::new(),
            "Quarterly filing",
            d(2025, 10, 1),
        )
        .recurring(RecurrencePattern::Quarterly);
        // Filing due 15 days after quarter end, i.e. Jan 15.
        let templates = vec![ServiceTaskTemplate::new(
            work.service_id,
            "File quarterly return",
            TaskRecurrence::Quarterly,
        )
        .with_due_rule(DueRule::OffsetDays(15))];
        let mut schedule = WorkSchedule::new(work);

        let outcome = backfill(
            &mut schedule,
            &templates,
            d(2025, 12, 20),
            EligibilityPolicy::TaskDriven,
            200,
        );
        assert_eq!(outcome.periods_created, 0);
        assert!(schedule.periods().is_empty());

        let outcome = backfill(
            &mut schedule,
            &templates,
            d(2026, 1, 16),
            EligibilityPolicy::TaskDriven,
            200,
        );
        assert_eq!(outcome.periods_created, 1);
    }
}

mod nested_recurrence_tests {
    use super::*;

    #[test]
    fn test_monthly_tasks_inside_quarterly_period_are_month_suffixed() {
        let work = Work::new(
            CustomerId::new(),
            ServiceId::new(),
            "Quarterly engagement",
            d(2025, 7, 1),
        )
        .recurring(RecurrencePattern::Quarterly);
        let service_id = work.service_id;
        let templates = vec![
            ServiceTaskTemplate::new(service_id, "GST filing", TaskRecurrence::Monthly)
                .with_due_rule(DueRule::OffsetDays(20)),
            ServiceTaskTemplate::new(service_id, "Quarterly review", TaskRecurrence::Quarterly),
        ];
        let mut schedule = WorkSchedule::new(work);

        let bounds = PeriodBounds::containing(d(2025, 7, 1), RecurrencePattern::Quarterly, 1);
        materialize_period(&mut schedule, &templates, bounds).unwrap();

        let titles: Vec<&str> = schedule.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "GST filing - July",
                "GST filing - August",
                "GST filing - September",
                "Quarterly review",
            ]
        );
        assert_eq!(schedule.periods()[0].total_tasks, 4);

        // Monthly due dates anchor at each month end, quarterly at period end.
        assert_eq!(schedule.tasks()[0].due_date, d(2025, 8, 20));
        assert_eq!(schedule.tasks()[2].due_date, d(2025, 10, 20));
        assert_eq!(schedule.tasks()[3].due_date, d(2025, 9, 30));
    }
}

mod completion_tests {
    use super::*;

    #[test]
    fn test_completion_cascades_from_tasks_through_periods_to_work() {
        let work = Work::new(
            CustomerId::new(),
            ServiceId::new(),
            "Monthly bookkeeping",
            d(2025, 8, 1),
        )
        .recurring(RecurrencePattern::Monthly);
        let work_id = work.id;
        let templates = vec![ServiceTaskTemplate::new(
            work.service_id,
            "Close books",
            TaskRecurrence::Monthly,
        )];
        let mut schedule = WorkSchedule::new(work);
        backfill(
            &mut schedule,
            &templates,
            d(2025, 9, 15),
            EligibilityPolicy::AlwaysMaterialize,
            200,
        );
        assert_eq!(schedule.periods().len(), 2);

        let task_ids: Vec<TaskId> = schedule.tasks().iter().map(|t| t.id).collect();
        let first_period = schedule.periods()[0].id;
        let second_period = schedule.periods()[1].id;

        let effects =
            set_task_status(&mut schedule, task_ids[0], TaskStatus::Completed, d(2025, 9, 16))
                .unwrap();
        assert_eq!(effects, vec![CompletionEffect::PeriodCompleted(first_period)]);

        let effects =
            set_task_status(&mut schedule, task_ids[1], TaskStatus::Completed, d(2025, 9, 17))
                .unwrap();
        assert_eq!(
            effects,
            vec![
                CompletionEffect::PeriodCompleted(second_period),
                CompletionEffect::WorkCompleted(work_id),
            ]
        );
    }
}
