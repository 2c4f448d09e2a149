//! Schedule Domain - Recurring Engagement Calendar
//!
//! This crate implements the scheduling half of the billing core: it maps
//! recurring engagements onto calendar-aligned periods, materializes tasks
//! from service templates, and tracks completion from task to period to
//! engagement.
//!
//! # Pipeline
//!
//! 1. [`recurrence`] computes calendar-truncated period boundaries.
//! 2. [`template`] resolves task due dates from template rules.
//! 3. [`backfill`] walks candidate periods from the engagement start date
//!    to "today" and decides which are eligible.
//! 4. [`materialize`] creates period records and instantiates task rows,
//!    including nested recurrence (monthly tasks inside a yearly period).
//! 5. [`completion`] aggregates task status up to periods and works and
//!    reports the transitions that downstream billing reacts to.
//!
//! All functions take "today" as an explicit parameter; nothing in this
//! crate reads the wall clock for business decisions.

pub mod backfill;
pub mod completion;
pub mod error;
pub mod materialize;
pub mod period;
pub mod recurrence;
pub mod schedule;
pub mod template;
pub mod work;

pub use backfill::{backfill, BackfillOutcome, EligibilityPolicy};
pub use completion::{set_task_status, set_work_task_status, CompletionEffect};
pub use error::ScheduleError;
pub use materialize::materialize_period;
pub use period::{PeriodStatus, PeriodTask, RecurringPeriod, TaskStatus};
pub use recurrence::{PeriodBounds, RecurrencePattern};
pub use schedule::WorkSchedule;
pub use template::{DueRule, ServiceTaskTemplate, TaskPriority, TaskRecurrence};
pub use work::{BillingStatus, Work, WorkStatus, WorkTask};
