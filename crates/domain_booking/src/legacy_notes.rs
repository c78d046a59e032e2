//! Compatibility parser for transport metadata embedded in booking notes
//!
//! Bookings created before the `transport_fare` column existed recorded the
//! fare inside the free-text notes as a `[TRANSPORT_FARE:<amount>]` marker.
//! This parser is only consulted when the authoritative field is absent.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

static FARE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*TRANSPORT_FARE\s*:\s*([0-9][0-9,_]*(?:\.[0-9]+)?)\s*\]")
        .expect("transport fare marker pattern is valid")
});

/// Extracts a legacy transport fare from booking notes
///
/// Returns `None` when no marker is present or the figure does not parse.
/// Thousands separators (`,` or `_`) inside the figure are ignored.
///
/// # Example
///
/// ```rust
/// use domain_booking::parse_legacy_transport_fare;
/// use rust_decimal_macros::dec;
///
/// let notes = "Late arrival. [TRANSPORT_FARE:20,000] airport pickup";
/// assert_eq!(parse_legacy_transport_fare(notes), Some(dec!(20000)));
/// ```
pub fn parse_legacy_transport_fare(notes: &str) -> Option<Decimal> {
    let captures = FARE_MARKER.captures(notes)?;
    let figure: String = captures
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    Decimal::from_str(&figure).ok().filter(|fare| !fare.is_sign_negative())
}
