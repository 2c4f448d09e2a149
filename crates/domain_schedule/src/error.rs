//! Schedule domain errors

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in the schedule domain
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A period already exists for the same work and boundaries
    #[error("Period already exists for work {work_id} ({start} - {end})")]
    DuplicatePeriod {
        work_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Period not found
    #[error("Period not found: {0}")]
    PeriodNotFound(String),

    /// Task not found
    #[error("Task not found: {0}")]
    TaskNotFound(String),
}
