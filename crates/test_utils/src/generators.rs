//! Property-Based Test Generators
//!
//! proptest strategies for settlement inputs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Amounts with two decimal places, up to ten million
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Percentages in `[0, 100]` with up to two decimal places
pub fn percent_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Raw commission inputs, including values outside `[0, 100]`
pub fn raw_percent_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1_000.0f64..1_000.0f64,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

/// Stay windows from same-day to a month, starting in 2026
pub fn stay_window_strategy() -> impl Strategy<Value = (DateTime<Utc>, DateTime<Utc>)> {
    (0i64..365i64, 0i64..(31 * 24)).prop_map(|(start_day, hours)| {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 14, 0, 0).unwrap() + Duration::days(start_day);
        (start, start + Duration::hours(hours))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::assert_two_places;
    use crate::builders::BookingBuilder;
    use core_kernel::Percentage;
    use domain_billing::split;

    proptest! {
        #[test]
        fn split_of_generated_inputs_stays_in_cents(base in amount_strategy(), pct in percent_strategy()) {
            let result = split(base, Percentage::clamped(pct));
            assert_two_places(result.total);
            assert_two_places(result.commission);
            prop_assert!(result.total >= result.commission);
        }

        #[test]
        fn generated_stays_bill_at_least_one_night((check_in, check_out) in stay_window_strategy()) {
            let booking = BookingBuilder::new().with_dates(check_in, check_out).build();
            prop_assert!(booking.nights() >= 1);
        }

        #[test]
        fn raw_percentages_clamp(raw in raw_percent_strategy()) {
            let pct = domain_billing::pricing::percentage_or_zero(raw);
            prop_assert!(pct.value() >= Decimal::ZERO && pct.value() <= Decimal::ONE_HUNDRED);
        }
    }
}
