//! Properties and their embedded services object

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use core_kernel::{OwnerId, Percentage, PropertyId};

use crate::error::BookingError;

/// Longest destination label written onto a trip
pub const DESTINATION_LABEL_MAX_CHARS: usize = 200;

const DESTINATION_SEPARATOR: &str = ", ";

/// Review state of a property listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    /// Owner is still editing the listing
    Draft,
    /// Submitted and awaiting review
    Pending,
    /// Live on the marketplace
    Approved,
    /// Rejected during review
    Rejected,
    /// Taken down by an administrator
    Suspended,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Draft => "DRAFT",
            PropertyStatus::Pending => "PENDING",
            PropertyStatus::Approved => "APPROVED",
            PropertyStatus::Rejected => "REJECTED",
            PropertyStatus::Suspended => "SUSPENDED",
        }
    }

    /// Only approved listings can be invoiced
    pub fn is_approved(&self) -> bool {
        matches!(self, PropertyStatus::Approved)
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(PropertyStatus::Draft),
            "PENDING" => Ok(PropertyStatus::Pending),
            "APPROVED" => Ok(PropertyStatus::Approved),
            "REJECTED" => Ok(PropertyStatus::Rejected),
            "SUSPENDED" => Ok(PropertyStatus::Suspended),
            other => Err(BookingError::UnknownPropertyStatus(other.to_string())),
        }
    }
}

/// The free-form services object stored on a property
///
/// Owners and administrators write arbitrary JSON here; settlement only reads
/// the `commissionPercent` override and must tolerate anything else, including
/// a missing object or a double-encoded JSON string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyServices(pub Value);

impl PropertyServices {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Per-property commission override, clamped to `[0, 100]`
    ///
    /// Accepts a JSON number or a numeric string. Returns `None` when the field
    /// is absent, not numeric, or not finite.
    pub fn commission_override(&self) -> Option<Percentage> {
        let object = match &self.0 {
            Value::Object(map) => map.clone(),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                _ => return None,
            },
            _ => return None,
        };

        match object.get("commissionPercent")? {
            Value::Number(n) => n.as_f64().and_then(Percentage::from_f64),
            Value::String(s) => s.trim().parse::<f64>().ok().and_then(Percentage::from_f64),
            _ => None,
        }
    }
}

/// A lodging listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub owner_id: OwnerId,
    pub title: String,
    pub status: PropertyStatus,
    /// ISO currency code the listing is priced in
    pub currency: String,
    pub street: Option<String>,
    pub ward: Option<String>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Nightly price, used only by bookings that carry no total amount
    pub base_price: Option<Decimal>,
    pub services: PropertyServices,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Human-readable drop-off label for drivers
    ///
    /// Joins the non-empty title and address parts, truncated to
    /// [`DESTINATION_LABEL_MAX_CHARS`] characters.
    pub fn destination_label(&self) -> Option<String> {
        let parts: Vec<&str> = [
            Some(self.title.as_str()),
            self.street.as_deref(),
            self.ward.as_deref(),
            self.district.as_deref(),
            self.region.as_deref(),
            self.city.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            return None;
        }

        let label = parts.join(DESTINATION_SEPARATOR);
        Some(label.chars().take(DESTINATION_LABEL_MAX_CHARS).collect())
    }

    /// Drop-off coordinates, when both are known
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }
}
