//! Settlement domain errors

use thiserror::Error;

use core_kernel::{BookingId, InvoiceId, PortError, PropertyId};
use domain_booking::PropertyStatus;

/// Errors that can occur while settling a booking
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Booking does not exist
    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// Invoice does not exist
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// The booking references a property that does not exist
    #[error("Property not found: {0}")]
    PropertyNotFound(PropertyId),

    /// Only approved properties can be invoiced
    #[error("Property is not approved for booking (status: {status})")]
    PropertyNotApproved { status: PropertyStatus },

    /// Every check-in code draw collided
    #[error("Could not allocate a unique check-in code after {attempts} attempts")]
    CodeGenerationExhausted { attempts: u32 },

    /// A uniqueness conflict that re-reading could not resolve
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store or channel failure
    #[error(transparent)]
    Port(#[from] PortError),
}

impl SettlementError {
    /// Whether the error is caused by the caller's input rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SettlementError::BookingNotFound(_)
                | SettlementError::InvoiceNotFound(_)
                | SettlementError::PropertyNotFound(_)
                | SettlementError::PropertyNotApproved { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_approved_names_status() {
        let err = SettlementError::PropertyNotApproved { status: PropertyStatus::Suspended };
        assert!(err.to_string().contains("SUSPENDED"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_port_errors_convert() {
        let err: SettlementError = PortError::connection("pool closed").into();
        assert!(matches!(err, SettlementError::Port(_)));
        assert!(!err.is_client_error());
    }
}
