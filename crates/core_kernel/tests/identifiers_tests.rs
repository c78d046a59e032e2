//! Tests for strongly-typed store identifiers

use core_kernel::{BookingId, CheckinCodeId, InvoiceId, TransportBookingId};
use std::collections::HashSet;

#[test]
fn test_prefixes_are_distinct() {
    let prefixes: HashSet<&str> = [
        BookingId::prefix(),
        InvoiceId::prefix(),
        CheckinCodeId::prefix(),
        TransportBookingId::prefix(),
    ]
    .into_iter()
    .collect();
    assert_eq!(prefixes.len(), 4);
}

#[test]
fn test_prefixed_round_trips_through_parse() {
    let id = TransportBookingId::new(981);
    let parsed: TransportBookingId = id.prefixed().parse().unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn test_parse_trims_whitespace() {
    let parsed: BookingId = "  12 ".parse().unwrap();
    assert_eq!(parsed.value(), 12);
}

#[test]
fn test_serde_is_transparent() {
    let json = serde_json::to_string(&InvoiceId::new(5)).unwrap();
    assert_eq!(json, "5");
    let back: InvoiceId = serde_json::from_str("5").unwrap();
    assert_eq!(back, InvoiceId::new(5));
}

#[test]
fn test_conversion_to_raw() {
    let raw: i64 = BookingId::new(77).into();
    assert_eq!(raw, 77);
}
