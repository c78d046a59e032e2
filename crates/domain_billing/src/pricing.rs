//! Price split arithmetic
//!
//! Splits an accommodation charge into the customer-facing total and the
//! platform commission. The split never fails: out-of-range or non-finite
//! inputs degrade to the zero or no-commission cases.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{finite_decimal, round_amount, Percentage};
use core_kernel::money::non_negative_decimal;
use domain_booking::{Booking, Property};

/// Result of applying a commission to a base amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceSplit {
    /// What the customer pays, commission included
    pub total: Decimal,
    /// The platform's share
    pub commission: Decimal,
}

impl PriceSplit {
    pub const ZERO: PriceSplit = PriceSplit {
        total: Decimal::ZERO,
        commission: Decimal::ZERO,
    };
}

/// Applies a commission percentage to a base amount
///
/// Both outputs are rounded to two places independently, after the
/// full-precision multiply.
///
/// # Example
///
/// ```rust
/// use core_kernel::Percentage;
/// use domain_billing::pricing::split;
/// use rust_decimal_macros::dec;
///
/// let result = split(dec!(150000), Percentage::clamped(dec!(10)));
/// assert_eq!(result.total, dec!(165000));
/// assert_eq!(result.commission, dec!(15000));
/// ```
pub fn split(base: Decimal, commission_percent: Percentage) -> PriceSplit {
    if base <= Decimal::ZERO {
        return PriceSplit::ZERO;
    }
    if commission_percent.is_zero() {
        return PriceSplit {
            total: round_amount(base),
            commission: Decimal::ZERO,
        };
    }

    let commission = base
        .checked_mul(commission_percent.value())
        .map(|scaled| scaled / Decimal::ONE_HUNDRED);
    match commission.and_then(|c| base.checked_add(c).map(|total| (total, c))) {
        Some((total, commission)) => PriceSplit {
            total: round_amount(total),
            commission: round_amount(commission),
        },
        // beyond decimal range
        None => PriceSplit {
            total: round_amount(base),
            commission: Decimal::ZERO,
        },
    }
}

/// [`split`] for raw floating point inputs
///
/// A non-finite or non-positive base yields zero; a non-finite or
/// non-positive percentage yields the base with no commission.
pub fn split_raw(base: f64, commission_percent: f64) -> PriceSplit {
    let base = match non_negative_decimal(base) {
        Ok(base) => base,
        Err(_) => return PriceSplit::ZERO,
    };
    let percent = if commission_percent > 0.0 {
        Percentage::from_f64(commission_percent).unwrap_or(Percentage::ZERO)
    } else {
        Percentage::ZERO
    };
    split(base, percent)
}

/// Every figure an invoice for one booking is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementAmounts {
    pub nights: i64,
    /// Lodging charge, no transport, no commission
    pub accommodation_subtotal: Decimal,
    pub transport_fare: Decimal,
    pub commission_percent: Percentage,
    pub commission_amount: Decimal,
    /// Lodging charge with commission
    pub accommodation_total: Decimal,
    /// What the customer pays
    pub effective_total: Decimal,
    /// What the owner receives
    pub net_payable: Decimal,
}

impl SettlementAmounts {
    /// Derives the invoice figures for a booking
    ///
    /// `Booking::total_amount` already includes rooms and transport, so the
    /// accommodation subtotal is that total minus the fare. Bookings without a
    /// total fall back to the property's nightly price times the nights.
    pub fn derive(booking: &Booking, property: &Property, commission_percent: Percentage) -> Self {
        let nights = booking.nights();
        let transport_fare = round_amount(booking.transport_fare());

        let accommodation_subtotal = match booking.total_amount.filter(|t| *t > Decimal::ZERO) {
            Some(total) => round_amount((total - transport_fare).max(Decimal::ZERO)),
            None => {
                let nightly = property
                    .base_price
                    .filter(|p| *p > Decimal::ZERO)
                    .unwrap_or(Decimal::ZERO);
                round_amount(nightly * Decimal::from(nights))
            }
        };

        let accommodation = split(accommodation_subtotal, commission_percent);

        Self {
            nights,
            accommodation_subtotal,
            transport_fare,
            commission_percent,
            commission_amount: accommodation.commission,
            accommodation_total: accommodation.total,
            effective_total: round_amount(accommodation.total + transport_fare),
            net_payable: accommodation_subtotal,
        }
    }

    /// Whether this booking should carry a commission
    pub fn expects_commission(&self) -> bool {
        self.commission_amount > Decimal::ZERO
    }

    /// Commission percent as stored on an invoice, `None` when no commission applies
    pub fn stored_commission_percent(&self) -> Option<Decimal> {
        self.expects_commission().then(|| self.commission_percent.value())
    }

    /// Commission amount as stored on an invoice, `None` when zero
    pub fn stored_commission_amount(&self) -> Option<Decimal> {
        self.expects_commission().then_some(self.commission_amount)
    }
}

/// Converts a float percentage to a clamped value, treating garbage as zero
pub fn percentage_or_zero(raw: f64) -> Percentage {
    finite_decimal(raw).map(Percentage::clamped).unwrap_or(Percentage::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pct(value: Decimal) -> Percentage {
        Percentage::clamped(value)
    }

    #[test]
    fn test_split_applies_commission() {
        let result = split(dec!(100000), pct(dec!(8)));
        assert_eq!(result.total, dec!(108000));
        assert_eq!(result.commission, dec!(8000));
    }

    #[test]
    fn test_split_rounds_after_multiply() {
        // 333.33 * 12.5% = 41.66625
        let result = split(dec!(333.33), pct(dec!(12.5)));
        assert_eq!(result.commission, dec!(41.67));
        assert_eq!(result.total, dec!(375.00));
    }

    #[test]
    fn test_fractional_percent_amount_matches_stored_percent() {
        let percent = pct(dec!(12.345678));
        let result = split(dec!(100000), percent);

        assert_eq!(percent.value(), dec!(12.3457));
        assert_eq!(result.commission, dec!(12345.70));
        assert_eq!(result.commission, round_amount(dec!(100000) * percent.value() / dec!(100)));
    }

    #[test]
    fn test_split_zero_commission_returns_base() {
        let result = split(dec!(5000), Percentage::ZERO);
        assert_eq!(result.total, dec!(5000));
        assert_eq!(result.commission, Decimal::ZERO);
    }

    #[test]
    fn test_split_non_positive_base() {
        assert_eq!(split(Decimal::ZERO, pct(dec!(10))), PriceSplit::ZERO);
        assert_eq!(split(dec!(-10), pct(dec!(10))), PriceSplit::ZERO);
    }

    #[test]
    fn test_split_full_commission() {
        let result = split(dec!(200), Percentage::MAX);
        assert_eq!(result.total, dec!(400));
        assert_eq!(result.commission, dec!(200));
    }

    #[test]
    fn test_split_raw_degenerate_inputs() {
        assert_eq!(split_raw(f64::NAN, 10.0), PriceSplit::ZERO);
        assert_eq!(split_raw(f64::INFINITY, 10.0), PriceSplit::ZERO);
        assert_eq!(split_raw(-5.0, 10.0), PriceSplit::ZERO);

        let no_commission = split_raw(1000.0, f64::NAN);
        assert_eq!(no_commission.total, dec!(1000));
        assert_eq!(no_commission.commission, Decimal::ZERO);

        assert_eq!(split_raw(1000.0, -3.0).commission, Decimal::ZERO);
        assert_eq!(split_raw(1000.0, f64::NEG_INFINITY).total, dec!(1000));
    }

    #[test]
    fn test_split_raw_clamps_percentage() {
        let result = split_raw(1000.0, 250.0);
        assert_eq!(result.commission, dec!(1000));
        assert_eq!(result.total, dec!(2000));
    }

    #[test]
    fn test_percentage_or_zero() {
        assert_eq!(percentage_or_zero(f64::NAN), Percentage::ZERO);
        assert_eq!(percentage_or_zero(140.0), Percentage::MAX);
        assert_eq!(percentage_or_zero(7.5).value(), dec!(7.5));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    proptest! {
        #[test]
        fn total_minus_commission_is_base(
            cents in 0i64..100_000_000_000i64,
            pct_hundredths in 0i64..=10_000i64,
        ) {
            let base = Decimal::new(cents, 2);
            let percent = Percentage::clamped(Decimal::new(pct_hundredths, 2));
            let result = split(base, percent);
            prop_assert!((result.total - result.commission - base).abs() <= dec!(0.01));
        }

        #[test]
        fn commission_never_exceeds_base(
            cents in 1i64..100_000_000_000i64,
            raw_pct in proptest::num::f64::ANY,
        ) {
            let base = Decimal::new(cents, 2);
            let result = split(base, percentage_or_zero(raw_pct));
            prop_assert!(result.commission >= Decimal::ZERO);
            prop_assert!(result.commission <= base);
            prop_assert!(result.total >= base);
        }

        #[test]
        fn raw_split_never_panics(base in proptest::num::f64::ANY, pct in proptest::num::f64::ANY) {
            let result = split_raw(base, pct);
            prop_assert!(result.total >= Decimal::ZERO);
            prop_assert!(result.commission >= Decimal::ZERO);
            if !(pct > 0.0) {
                prop_assert_eq!(result.commission, Decimal::ZERO);
            }
        }
    }
}
