//! Tests for bookings, properties, and trip backfill

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use core_kernel::{BookingId, OwnerId, PropertyId, TransportBookingId};
use domain_booking::{
    correlation_key, parse_correlation_key, parse_legacy_transport_fare, Booking, Property,
    PropertyServices, PropertyStatus, TransportBooking, TripBackfill, TripPaymentStatus,
    TripStatus, AUTO_NOTES_PREFIX, TRANSPORT_POLICY_NOTICE,
};

fn booking(nights: i64) -> Booking {
    let check_in = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
    Booking {
        id: BookingId::new(100),
        property_id: PropertyId::new(7),
        check_in,
        check_out: check_in + Duration::days(nights),
        rooms: 2,
        total_amount: Some(dec!(300000)),
        include_transport: true,
        transport_fare: Some(dec!(35000)),
        transport_origin_address: Some("Arusha Airport".to_string()),
        transport_vehicle_type: Some("LAND_CRUISER".to_string()),
        transport_scheduled_at: Some(check_in),
        notes: None,
        created_at: check_in,
    }
}

fn property() -> Property {
    Property {
        id: PropertyId::new(7),
        owner_id: OwnerId::new(3),
        title: "Ngorongoro Rim Camp".to_string(),
        status: PropertyStatus::Approved,
        currency: "USD".to_string(),
        street: None,
        ward: None,
        district: Some("Karatu".to_string()),
        region: Some("Arusha".to_string()),
        city: None,
        latitude: Some(-3.24),
        longitude: Some(35.49),
        base_price: Some(dec!(450)),
        services: PropertyServices::new(json!({"commissionPercent": "12"})),
        created_at: Utc::now(),
    }
}

fn trip(notes: Option<&str>) -> TransportBooking {
    let now = Utc::now();
    TransportBooking {
        id: TransportBookingId::new(55),
        correlation_key: correlation_key(BookingId::new(100)),
        property_id: None,
        vehicle_type: None,
        scheduled_at: None,
        origin_address: None,
        destination_label: None,
        destination_lat: None,
        destination_lng: None,
        amount: None,
        currency: None,
        status: TripStatus::PendingPayment,
        payment_status: TripPaymentStatus::Unpaid,
        payment_ref: None,
        payment_method: None,
        notes: notes.map(str::to_string),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_booking_figures() {
    let b = booking(4);
    assert_eq!(b.nights(), 4);
    assert_eq!(b.transport_fare(), dec!(35000));
    assert_eq!(b.correlation_key(), "BOOKING:100");
    assert_eq!(parse_correlation_key(&b.correlation_key()).unwrap(), b.id);
}

#[test]
fn test_property_commission_from_string() {
    let pct = property().services.commission_override().unwrap();
    assert_eq!(pct.value(), dec!(12));
}

#[test]
fn test_full_backfill_from_booking_and_property() {
    let plan = TripBackfill::plan(&trip(None), &booking(2), Some(&property()));

    assert_eq!(plan.property_id, Some(PropertyId::new(7)));
    assert_eq!(plan.vehicle_type.as_deref(), Some("LAND_CRUISER"));
    assert_eq!(plan.origin_address.as_deref(), Some("Arusha Airport"));
    assert_eq!(plan.destination_label.as_deref(), Some("Ngorongoro Rim Camp, Karatu, Arusha"));
    assert_eq!(plan.destination_lat, Some(-3.24));
    assert_eq!(plan.destination_lng, Some(35.49));
    assert_eq!(plan.currency.as_deref(), Some("USD"));
    assert_eq!(plan.amount, Some(dec!(35000)));
    assert_eq!(plan.notes.as_deref(), Some(TRANSPORT_POLICY_NOTICE));
}

#[test]
fn test_placeholder_notes_are_replaced() {
    let placeholder = format!("{} waiting for invoice", AUTO_NOTES_PREFIX);
    let plan = TripBackfill::plan(&trip(Some(&placeholder)), &booking(2), None);
    assert_eq!(plan.notes.as_deref(), Some(TRANSPORT_POLICY_NOTICE));

    let plan = TripBackfill::plan(&trip(Some("   ")), &booking(2), None);
    assert_eq!(plan.notes.as_deref(), Some(TRANSPORT_POLICY_NOTICE));
}

#[test]
fn test_current_notice_is_not_rewritten() {
    let plan = TripBackfill::plan(&trip(Some(TRANSPORT_POLICY_NOTICE)), &booking(2), None);
    assert!(plan.notes.is_none());
}

#[test]
fn test_booking_without_transport_backfills_no_fare() {
    let mut b = booking(2);
    b.include_transport = false;
    let plan = TripBackfill::plan(&trip(None), &b, None);
    assert!(plan.amount.is_none());
}

proptest! {
    #[test]
    fn nights_is_never_below_one(minutes in -100_000i64..100_000i64) {
        let mut b = booking(1);
        b.check_out = b.check_in + Duration::minutes(minutes);
        prop_assert!(b.nights() >= 1);
    }

    #[test]
    fn legacy_fare_round_trips_whole_amounts(fare in 0u64..10_000_000u64) {
        let notes = format!("guest notes [TRANSPORT_FARE:{}] more", fare);
        prop_assert_eq!(parse_legacy_transport_fare(&notes), Some(Decimal::from(fare)));
    }

    #[test]
    fn destination_label_is_bounded(title in ".{0,400}") {
        let mut p = property();
        p.title = title;
        if let Some(label) = p.destination_label() {
            prop_assert!(label.chars().count() <= 200);
        }
    }
}
