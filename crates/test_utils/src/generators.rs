//! Property-Based Test Generators
//!
//! Proptest strategies for generating random test data that maintains
//! domain invariants.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, Rate};
use domain_schedule::RecurrencePattern;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::INR),
        Just(Currency::AUD),
        Just(Currency::CAD),
        Just(Currency::SGD),
    ]
}

/// Strategy for generating positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(minor, currency)| Money::from_minor(minor, currency))
}

/// Strategy for generating positive USD Money values
pub fn positive_usd_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::USD))
}

/// Strategy for generating tax rates between 0% and 30%
pub fn tax_rate_strategy() -> impl Strategy<Value = Rate> {
    (0i64..=3000).prop_map(|basis_points| Rate::from_percentage(Decimal::new(basis_points, 2)))
}

/// Strategy for generating valid calendar dates between 2015 and 2035
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2015i32..=2035, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d).expect("day <= 28 is valid in every month")
    })
}

/// Strategy for generating recurrence patterns
pub fn recurrence_strategy() -> impl Strategy<Value = RecurrencePattern> {
    prop_oneof![
        Just(RecurrencePattern::Monthly),
        Just(RecurrencePattern::Quarterly),
        Just(RecurrencePattern::HalfYearly),
        Just(RecurrencePattern::Yearly),
    ]
}

/// Strategy for generating fiscal year start months
pub fn fiscal_month_strategy() -> impl Strategy<Value = u32> {
    1u32..=12
}
