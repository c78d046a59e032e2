//! Accommodation bookings
//!
//! A booking is created by the public booking flow and is read-only to
//! settlement. The helpers here derive the figures settlement needs: the
//! number of nights, the transport fare and the correlation key that links
//! provisional trips back to the stay.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BookingId, PropertyId};

use crate::legacy_notes::parse_legacy_transport_fare;
use crate::transport::correlation_key;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// An accommodation reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Store key
    pub id: BookingId,
    /// Property being booked
    pub property_id: PropertyId,
    /// Check-in timestamp
    pub check_in: DateTime<Utc>,
    /// Check-out timestamp
    pub check_out: DateTime<Utc>,
    /// Number of rooms reserved
    pub rooms: i32,
    /// Accommodation plus transport, without commission
    pub total_amount: Option<Decimal>,
    /// Whether the guest asked for a ride
    pub include_transport: bool,
    /// Authoritative transport fare (bookings created after the column existed)
    pub transport_fare: Option<Decimal>,
    /// Pickup address for the ride
    pub transport_origin_address: Option<String>,
    /// Requested vehicle type
    pub transport_vehicle_type: Option<String>,
    /// Scheduled pickup
    pub transport_scheduled_at: Option<DateTime<Utc>>,
    /// Free-text notes; legacy records embed transport metadata here
    pub notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Number of nights, rounded up to whole days and never less than one
    pub fn nights(&self) -> i64 {
        let millis = (self.check_out - self.check_in).num_milliseconds();
        if millis <= 0 {
            return 1;
        }
        ((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY).max(1)
    }

    /// The authoritative fare, when transport was requested and priced
    pub fn authoritative_transport_fare(&self) -> Option<Decimal> {
        if !self.include_transport {
            return None;
        }
        self.transport_fare
            .filter(|fare| fare.is_sign_positive() && !fare.is_zero())
    }

    /// Transport fare for invoicing
    ///
    /// Prefers the authoritative column; falls back to the legacy notes marker
    /// for records that predate it. Zero when neither source has a fare.
    pub fn transport_fare(&self) -> Decimal {
        self.authoritative_transport_fare()
            .or_else(|| self.notes.as_deref().and_then(parse_legacy_transport_fare))
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether a transport leg is attached to this stay
    pub fn has_transport(&self) -> bool {
        self.include_transport || !self.transport_fare().is_zero()
    }

    /// The `BOOKING:<id>` key that trips use to reference this booking
    pub fn correlation_key(&self) -> String {
        correlation_key(self.id)
    }
}
