//! Period boundary calculation
//!
//! Maps an anchor date and a recurrence pattern onto calendar-truncated
//! period boundaries. Quarterly and longer buckets align to the fiscal-year
//! start month, not necessarily January: with a fiscal year starting in
//! April, the quarters begin in April, July, October, and January.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// How often a recurring work repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl RecurrencePattern {
    /// Returns the number of months in one period of this pattern
    pub fn span_months(&self) -> u32 {
        match self {
            RecurrencePattern::Monthly => 1,
            RecurrencePattern::Quarterly => 3,
            RecurrencePattern::HalfYearly => 6,
            RecurrencePattern::Yearly => 12,
        }
    }

    /// Parses a pattern from its wire representation
    ///
    /// Unknown patterns fall back to monthly. This is deliberate policy:
    /// a misspelled pattern on an engagement should degrade to the
    /// smallest period rather than abort schedule generation.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => RecurrencePattern::Monthly,
            "quarterly" => RecurrencePattern::Quarterly,
            "half_yearly" | "half-yearly" => RecurrencePattern::HalfYearly,
            "yearly" | "annual" => RecurrencePattern::Yearly,
            other => {
                tracing::warn!(pattern = other, "unknown recurrence pattern, using monthly");
                RecurrencePattern::Monthly
            }
        }
    }
}

/// Inclusive start/end boundaries of one calendar period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodBounds {
    /// First day of the period
    pub start: NaiveDate,
    /// Last day of the period (one day before the next bucket)
    pub end: NaiveDate,
}

impl PeriodBounds {
    /// Computes the period containing `anchor` for the given pattern
    ///
    /// The start is the first day of the containing bucket, where buckets
    /// of `span_months` begin at the fiscal-year start month and repeat
    /// every span. The end is the day before the next bucket starts.
    ///
    /// # Arguments
    ///
    /// * `anchor` - Any date inside the desired period
    /// * `pattern` - Recurrence pattern defining the bucket width
    /// * `fiscal_year_start_month` - 1-12; out-of-range values are treated
    ///   as January
    pub fn containing(
        anchor: NaiveDate,
        pattern: RecurrencePattern,
        fiscal_year_start_month: u32,
    ) -> Self {
        let fiscal_start = if (1..=12).contains(&fiscal_year_start_month) {
            fiscal_year_start_month
        } else {
            tracing::warn!(
                month = fiscal_year_start_month,
                "fiscal year start month out of range, using January"
            );
            1
        };

        let span = pattern.span_months() as i32;
        let anchor_index = month_index(anchor);
        let base = fiscal_start as i32 - 1;
        let start_index = base + (anchor_index - base).div_euclid(span) * span;

        let start = first_day_of_index(start_index);
        let end = first_day_of_index(start_index + span)
            .pred_opt()
            .expect("period end before year 262143");

        Self { start, end }
    }

    /// Returns the period immediately following this one
    pub fn next(&self) -> Self {
        let span = self.span_months() as i32;
        let start_index = month_index(self.start) + span;

        Self {
            start: first_day_of_index(start_index),
            end: first_day_of_index(start_index + span)
                .pred_opt()
                .expect("period end before year 262143"),
        }
    }

    /// Returns the number of calendar months covered by these bounds
    pub fn span_months(&self) -> u32 {
        (month_index(self.end) - month_index(self.start) + 1) as u32
    }

    /// Returns the last day of each calendar month contained in the period
    pub fn month_ends(&self) -> Vec<NaiveDate> {
        let first = month_index(self.start);
        let last = month_index(self.end);
        (first..=last).map(last_day_of_index).collect()
    }

    /// Returns the last day of each full quarter contained in the period
    ///
    /// Quarters are counted from the period start, which is already
    /// fiscal-aligned. Only whole quarters are returned.
    pub fn quarter_ends(&self) -> Vec<NaiveDate> {
        let first = month_index(self.start);
        let last = month_index(self.end);
        (first..=last)
            .skip(2)
            .step_by(3)
            .map(last_day_of_index)
            .collect()
    }
}

/// Returns the last day of the given month
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    last_day_of_index(year * 12 + month as i32 - 1)
}

fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

fn first_day_of_index(index: i32) -> NaiveDate {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is always valid")
}

fn last_day_of_index(index: i32) -> NaiveDate {
    first_day_of_index(index + 1)
        .pred_opt()
        .expect("month end before year 262143")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_monthly_bounds() {
        let bounds = PeriodBounds::containing(d(2025, 8, 15), RecurrencePattern::Monthly, 1);
        assert_eq!(bounds.start, d(2025, 8, 1));
        assert_eq!(bounds.end, d(2025, 8, 31));
    }

    #[test]
    fn test_quarterly_bounds_calendar_fiscal_year() {
        let bounds = PeriodBounds::containing(d(2025, 8, 15), RecurrencePattern::Quarterly, 1);
        assert_eq!(bounds.start, d(2025, 7, 1));
        assert_eq!(bounds.end, d(2025, 9, 30));
    }

    #[test]
    fn test_quarterly_bounds_april_fiscal_year() {
        // April fiscal year: quarters start Apr, Jul, Oct, Jan
        let bounds = PeriodBounds::containing(d(2025, 3, 10), RecurrencePattern::Quarterly, 4);
        assert_eq!(bounds.start, d(2025, 1, 1));
        assert_eq!(bounds.end, d(2025, 3, 31));

        let bounds = PeriodBounds::containing(d(2025, 5, 10), RecurrencePattern::Quarterly, 4);
        assert_eq!(bounds.start, d(2025, 4, 1));
        assert_eq!(bounds.end, d(2025, 6, 30));
    }

    #[test]
    fn test_yearly_bounds_april_fiscal_year() {
        let bounds = PeriodBounds::containing(d(2025, 2, 1), RecurrencePattern::Yearly, 4);
        assert_eq!(bounds.start, d(2024, 4, 1));
        assert_eq!(bounds.end, d(2025, 3, 31));
    }

    #[test]
    fn test_half_yearly_bounds() {
        let bounds = PeriodBounds::containing(d(2025, 10, 20), RecurrencePattern::HalfYearly, 1);
        assert_eq!(bounds.start, d(2025, 7, 1));
        assert_eq!(bounds.end, d(2025, 12, 31));
    }

    #[test]
    fn test_next_advances_one_span() {
        let bounds = PeriodBounds::containing(d(2025, 11, 5), RecurrencePattern::Quarterly, 1);
        let next = bounds.next();
        assert_eq!(next.start, d(2026, 1, 1));
        assert_eq!(next.end, d(2026, 3, 31));
    }

    #[test]
    fn test_month_ends_in_quarter() {
        let bounds = PeriodBounds::containing(d(2025, 8, 15), RecurrencePattern::Quarterly, 1);
        assert_eq!(
            bounds.month_ends(),
            vec![d(2025, 7, 31), d(2025, 8, 31), d(2025, 9, 30)]
        );
    }

    #[test]
    fn test_quarter_ends_in_year() {
        let bounds = PeriodBounds::containing(d(2025, 6, 1), RecurrencePattern::Yearly, 4);
        assert_eq!(
            bounds.quarter_ends(),
            vec![
                d(2025, 6, 30),
                d(2025, 9, 30),
                d(2025, 12, 31),
                d(2026, 3, 31)
            ]
        );
    }

    #[test]
    fn test_unknown_pattern_falls_back_to_monthly() {
        assert_eq!(RecurrencePattern::parse("fortnightly"), RecurrencePattern::Monthly);
        assert_eq!(RecurrencePattern::parse("Quarterly"), RecurrencePattern::Quarterly);
        assert_eq!(RecurrencePattern::parse("half_yearly"), RecurrencePattern::HalfYearly);
    }

    #[test]
    fn test_last_day_of_month_handles_leap_years() {
        assert_eq!(last_day_of_month(2024, 2), d(2024, 2, 29));
        assert_eq!(last_day_of_month(2025, 2), d(2025, 2, 28));
    }
}
