//! Public invoice view
//!
//! Rebuilds a payer-facing breakdown from a stored invoice. The stored total
//! is the only source of truth: the transport share is subtracted from it
//! rather than the accommodation being repriced, and commission is never
//! shown to the payer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};

use core_kernel::{round_amount, InvoiceId};
use domain_booking::{correlation_key, TransportBooking, TripStatus};

use crate::activation::TransportActivationService;
use crate::error::SettlementError;
use crate::invoice::Invoice;
use crate::ports::{InvoicePort, LodgingPort, TransportPort};

/// Price breakdown safe to show the payer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceBreakdown {
    pub accommodation_subtotal: Decimal,
    pub transport_fare: Decimal,
    /// Always zero in the public view
    pub commission: Decimal,
    pub total: Decimal,
}

impl InvoiceBreakdown {
    /// Splits a stored total into accommodation and transport
    ///
    /// The fare is clamped to `[0, total]`.
    pub fn from_total(total: Decimal, transport_fare: Decimal) -> Self {
        let total = round_amount(total.max(Decimal::ZERO));
        let transport_fare = round_amount(transport_fare.max(Decimal::ZERO).min(total));
        Self {
            accommodation_subtotal: total - transport_fare,
            transport_fare,
            commission: Decimal::ZERO,
            total,
        }
    }
}

/// An invoice with its public breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceView {
    pub invoice: Invoice,
    pub breakdown: InvoiceBreakdown,
}

/// Fare of the first live trip that carries one
pub fn trip_fare(trips: &[TransportBooking]) -> Option<Decimal> {
    trips
        .iter()
        .filter(|t| t.status != TripStatus::Cancelled)
        .find_map(|t| t.amount)
}

/// Builds public invoice views
pub struct InvoiceProjector {
    invoices: Arc<dyn InvoicePort>,
    lodging: Arc<dyn LodgingPort>,
    transport: Arc<dyn TransportPort>,
    activation: Arc<TransportActivationService>,
}

impl InvoiceProjector {
    pub fn new(
        invoices: Arc<dyn InvoicePort>,
        lodging: Arc<dyn LodgingPort>,
        transport: Arc<dyn TransportPort>,
        activation: Arc<TransportActivationService>,
    ) -> Self {
        Self {
            invoices,
            lodging,
            transport,
            activation,
        }
    }

    /// Loads an invoice and projects its breakdown
    ///
    /// Reading a paid-like invoice also activates any trips still waiting on
    /// it; activation failures here are logged only.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn project(&self, invoice_id: InvoiceId) -> Result<InvoiceView, SettlementError> {
        let invoice = self
            .invoices
            .find_by_id(invoice_id)
            .await?
            .ok_or(SettlementError::InvoiceNotFound(invoice_id))?;

        if invoice.is_paid_like() {
            if let Err(err) = self
                .activation
                .activate(
                    invoice.booking_id,
                    Some(invoice.payment_ref.as_str()),
                    invoice.payment_method.as_deref(),
                )
                .await
            {
                warn!(error = %err, "Transport activation on read failed");
            }
        }

        let trips = self
            .transport
            .find_by_correlation(&correlation_key(invoice.booking_id))
            .await?;
        let fare = match trip_fare(&trips) {
            Some(fare) => fare,
            None => self
                .lodging
                .find_booking(invoice.booking_id)
                .await?
                .map(|booking| booking.transport_fare())
                .unwrap_or(Decimal::ZERO),
        };

        let breakdown = InvoiceBreakdown::from_total(invoice.total.unwrap_or(Decimal::ZERO), fare);
        Ok(InvoiceView { invoice, breakdown })
    }
}
