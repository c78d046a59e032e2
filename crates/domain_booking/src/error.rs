//! Booking domain errors

use thiserror::Error;

/// Errors that can occur in the booking domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("Unknown property status: {0}")]
    UnknownPropertyStatus(String),

    #[error("Unknown trip status: {0}")]
    UnknownTripStatus(String),

    #[error("Unknown trip payment status: {0}")]
    UnknownTripPaymentStatus(String),

    #[error("Invalid correlation key: {0}")]
    InvalidCorrelationKey(String),
}
