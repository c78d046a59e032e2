//! Tests for kernel error types

use core_kernel::money::{non_negative_decimal, AmountError};
use core_kernel::PortError;
use std::error::Error;

#[test]
fn test_amount_error_display() {
    let err = non_negative_decimal(f64::INFINITY).unwrap_err();
    assert!(matches!(err, AmountError::NotFinite(_)));
    assert!(err.to_string().contains("not a finite number"));

    let err = non_negative_decimal(-12.5).unwrap_err();
    assert!(err.to_string().contains("-12.5"));
}

#[test]
fn test_port_error_classification() {
    let conflict = PortError::conflict("invoice for booking 7 already exists");
    assert!(conflict.is_conflict());
    assert!(!conflict.is_not_found());
    assert!(!conflict.is_transient());

    let missing = PortError::not_found("Booking", 7);
    assert!(missing.is_not_found());
    assert!(missing.to_string().contains("Booking"));

    let down = PortError::connection("pool timed out");
    assert!(down.is_transient());
}

#[test]
fn test_port_error_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let err = PortError::Connection {
        message: "redis unavailable".to_string(),
        source: Some(Box::new(io)),
    };

    assert!(err.source().is_some());
    assert_eq!(err.to_string(), "Connection error: redis unavailable");
}
