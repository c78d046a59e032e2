//! Core Kernel - Foundational types for the marketplace settlement system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Amount rounding and clamped percentages on top of rust_decimal
//! - Strongly-typed integer identifiers for store records
//! - Port infrastructure for the ports-and-adapters layout

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{round_amount, finite_decimal, format_amount, Percentage, AmountError};
pub use identifiers::{
    BookingId, PropertyId, OwnerId, InvoiceId, CheckinCodeId, TransportBookingId,
};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
