//! Amount and percentage primitives with precise decimal arithmetic
//!
//! Every monetary figure in the settlement pipeline is a `rust_decimal::Decimal`
//! rounded to two places with half-away-from-zero rounding. Raw inputs that
//! arrive as floating point (JSON numbers, legacy columns) pass through
//! [`finite_decimal`] first so NaN and infinities never reach the arithmetic.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Decimal places used for every stored amount
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Decimal places kept on a percentage; matches the `NUMERIC(7, 4)` columns
pub const PERCENT_DECIMAL_PLACES: u32 = 4;

/// Errors that can occur when interpreting raw amounts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is not a finite number: {0}")]
    NotFinite(String),

    #[error("Amount must not be negative: {0}")]
    Negative(Decimal),
}

/// Rounds an amount to two decimal places (half away from zero)
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a float to a decimal, rejecting NaN and infinities
pub fn finite_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

/// Like [`finite_decimal`] but reports why the value was rejected
pub fn non_negative_decimal(value: f64) -> Result<Decimal, AmountError> {
    let amount = finite_decimal(value).ok_or_else(|| AmountError::NotFinite(value.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative(amount));
    }
    Ok(amount)
}

/// Formats an amount for human-readable summaries, e.g. `TZS 165000.00`
pub fn format_amount(currency: &str, amount: Decimal) -> String {
    format!("{} {:.2}", currency, round_amount(amount))
}

/// A percentage guaranteed to lie in `[0, 100]` with at most four decimals
///
/// Construction always clamps and rounds, so a `Percentage` can be handed to
/// price arithmetic without re-validating it, and the value used for the
/// amount is exactly the value that gets stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Percentage = Percentage(Decimal::ZERO);
    pub const MAX: Percentage = Percentage(Decimal::ONE_HUNDRED);

    /// Creates a percentage, clamping the value into `[0, 100]`
    pub fn clamped(value: Decimal) -> Self {
        let rounded = value.round_dp_with_strategy(
            PERCENT_DECIMAL_PLACES,
            RoundingStrategy::MidpointAwayFromZero,
        );
        Self(rounded.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Creates a clamped percentage from a float; `None` for NaN/infinite input
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        if value >= 100.0 {
            return Some(Self::MAX);
        }
        if value <= 0.0 {
            return Some(Self::ZERO);
        }
        Some(finite_decimal(value).map(Self::clamped).unwrap_or(Self::ZERO))
    }

    /// Returns the percentage value (e.g. 10 for 10%)
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the percentage as a float, for display-only consumers
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Applies the percentage to an amount at full precision (no rounding)
    pub fn of(&self, amount: Decimal) -> Decimal {
        amount * self.0 / dec!(100)
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_amount_half_away_from_zero() {
        assert_eq!(round_amount(dec!(1.005)), dec!(1.01));
        assert_eq!(round_amount(dec!(1.004)), dec!(1.00));
        assert_eq!(round_amount(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_amount(dec!(2.5)), dec!(2.50));
    }

    #[test]
    fn test_finite_decimal_rejects_non_finite() {
        assert!(finite_decimal(f64::NAN).is_none());
        assert!(finite_decimal(f64::INFINITY).is_none());
        assert!(finite_decimal(f64::NEG_INFINITY).is_none());
        assert_eq!(finite_decimal(12.5), Some(dec!(12.5)));
    }

    #[test]
    fn test_non_negative_decimal() {
        assert_eq!(non_negative_decimal(3.0), Ok(dec!(3)));
        assert!(matches!(non_negative_decimal(-1.0), Err(AmountError::Negative(_))));
        assert!(matches!(non_negative_decimal(f64::NAN), Err(AmountError::NotFinite(_))));
    }

    #[test]
    fn test_percentage_clamps() {
        assert_eq!(Percentage::clamped(dec!(150)), Percentage::MAX);
        assert_eq!(Percentage::clamped(dec!(-5)), Percentage::ZERO);
        assert_eq!(Percentage::clamped(dec!(12.5)).value(), dec!(12.5));
        assert!(Percentage::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn test_percentage_keeps_four_places() {
        assert_eq!(Percentage::clamped(dec!(12.345678)).value(), dec!(12.3457));
        assert_eq!(Percentage::clamped(dec!(7.25)).value().scale(), 2);
        assert_eq!(Percentage::from_f64(8.333333).map(|p| p.value()), Some(dec!(8.3333)));
    }

    #[test]
    fn test_percentage_of() {
        let pct = Percentage::clamped(dec!(10));
        assert_eq!(pct.of(dec!(150000)), dec!(15000));
        assert_eq!(pct.to_string(), "10%");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("TZS", dec!(165000)), "TZS 165000.00");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn percentage_is_always_within_bounds(raw in proptest::num::f64::ANY) {
            if let Some(pct) = Percentage::from_f64(raw) {
                prop_assert!(pct.value() >= Decimal::ZERO);
                prop_assert!(pct.value() <= Decimal::ONE_HUNDRED);
                prop_assert!(pct.value().scale() <= PERCENT_DECIMAL_PLACES);
            }
        }

        #[test]
        fn rounding_moves_at_most_half_a_cent(minor in -1_000_000_000i64..1_000_000_000i64) {
            let amount = Decimal::new(minor, 3);
            let diff = (round_amount(amount) - amount).abs();
            prop_assert!(diff <= dec!(0.005));
        }
    }
}
