//! Pre-built Test Fixtures
//!
//! Fixed dates and amounts shared by the settlement suites. Values match
//! the worked examples in the pricing tests so failures are easy to read.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::address::en::{CityName, StateName, StreetName};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Dates of a standard two-night stay
pub struct StayFixtures;

impl StayFixtures {
    pub fn check_in() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap()
    }

    pub fn check_out() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 12, 10, 0, 0).unwrap()
    }

    /// Airport pickup on arrival day
    pub fn pickup() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 11, 30, 0).unwrap()
    }
}

/// Amounts in the property's currency
pub struct AmountFixtures;

impl AmountFixtures {
    pub fn nightly_rate() -> Decimal {
        dec!(50000)
    }

    /// Accommodation for two nights at the nightly rate
    pub fn stay_subtotal() -> Decimal {
        dec!(100000)
    }

    pub fn transport_fare() -> Decimal {
        dec!(20000)
    }

    pub fn default_commission_percent() -> Decimal {
        dec!(10)
    }
}

/// Random but plausible listing text
pub struct ListingFixtures;

impl ListingFixtures {
    pub fn title() -> String {
        format!("{} Lodge", CompanyName().fake::<String>())
    }

    pub fn street() -> String {
        StreetName().fake()
    }

    pub fn city() -> String {
        CityName().fake()
    }

    pub fn region() -> String {
        StateName().fake()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stay_dates_are_ordered() {
        assert!(StayFixtures::pickup() < StayFixtures::check_in());
        assert!(StayFixtures::check_in() < StayFixtures::check_out());
    }

    #[test]
    fn test_subtotal_matches_two_nights() {
        assert_eq!(AmountFixtures::nightly_rate() * dec!(2), AmountFixtures::stay_subtotal());
    }

    #[test]
    fn test_listing_text_is_not_empty() {
        assert!(!ListingFixtures::title().trim().is_empty());
        assert!(!ListingFixtures::city().trim().is_empty());
    }
}
