//! Strongly-typed identifiers for marketplace records
//!
//! The data store keys every table with a positive integer. Wrapping those
//! integers in newtypes keeps a booking id from being passed where an
//! invoice id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw store key
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Wraps a raw key only if it is a valid (positive) store key
            pub fn positive(value: i64) -> Option<Self> {
                (value > 0).then_some(Self(value))
            }

            /// Returns the raw store key
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }

            /// Formats the id with its prefix, e.g. `BKG-42`
            pub fn prefixed(&self) -> String {
                format!("{}-{}", $prefix, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.trim();
                let raw = raw.strip_prefix(concat!($prefix, "-")).unwrap_or(raw);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Lodging
define_id!(BookingId, "BKG");
define_id!(PropertyId, "PRP");
define_id!(OwnerId, "OWN");

// Billing
define_id!(InvoiceId, "INV");
define_id!(CheckinCodeId, "CHK");

// Transport
define_id!(TransportBookingId, "TRP");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_display() {
        let id = BookingId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.prefixed(), "BKG-42");
    }

    #[test]
    fn test_id_parsing() {
        let parsed: InvoiceId = "INV-17".parse().unwrap();
        assert_eq!(parsed, InvoiceId::new(17));

        let bare: InvoiceId = "17".parse().unwrap();
        assert_eq!(bare, parsed);

        assert!("abc".parse::<InvoiceId>().is_err());
    }

    #[test]
    fn test_positive_rejects_zero_and_negative() {
        assert!(BookingId::positive(0).is_none());
        assert!(BookingId::positive(-3).is_none());
        assert_eq!(BookingId::positive(9), Some(BookingId::new(9)));
    }
}
