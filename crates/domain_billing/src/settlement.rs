//! Invoice settlement
//!
//! `settle` is the single entry point that turns a booking into an invoice.
//! It is idempotent: an existing invoice is returned (and refreshed if its
//! figures are stale) instead of a second one being created.
//!
//! Duplicate protection uses two read points. The first read, before any
//! write, drives the refresh decision. The second read happens inside the
//! creation transaction (see [`InvoicePort::create_once`]) and catches a
//! concurrent request that passed the first read at the same time.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::BookingId;
use domain_booking::{Booking, Property};

use crate::activation::TransportActivationService;
use crate::checkin_code::CheckinCodeGenerator;
use crate::commission::CommissionResolver;
use crate::error::SettlementError;
use crate::invoice::{Invoice, InvoiceRefresh, NewInvoice};
use crate::ports::{InvoicePort, LodgingPort};
use crate::pricing::SettlementAmounts;

/// Result of settling a booking
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementOutcome {
    pub invoice: Invoice,
    /// `false` when the invoice already existed
    pub created: bool,
}

/// Creates or refreshes the invoice for a booking
pub struct SettlementService {
    lodging: Arc<dyn LodgingPort>,
    invoices: Arc<dyn InvoicePort>,
    codes: CheckinCodeGenerator,
    commission: CommissionResolver,
    activation: Arc<TransportActivationService>,
}

impl SettlementService {
    pub fn new(
        lodging: Arc<dyn LodgingPort>,
        invoices: Arc<dyn InvoicePort>,
        codes: CheckinCodeGenerator,
        commission: CommissionResolver,
        activation: Arc<TransportActivationService>,
    ) -> Self {
        Self {
            lodging,
            invoices,
            codes,
            commission,
            activation,
        }
    }

    /// Settles a booking into exactly one invoice
    ///
    /// # Errors
    ///
    /// - [`SettlementError::BookingNotFound`] / [`SettlementError::PropertyNotFound`]
    /// - [`SettlementError::PropertyNotApproved`] naming the actual status
    /// - [`SettlementError::CodeGenerationExhausted`] when no check-in code could be allocated
    #[instrument(skip(self), fields(booking_id = %booking_id))]
    pub async fn settle(&self, booking_id: BookingId) -> Result<SettlementOutcome, SettlementError> {
        let (booking, property) = self.load_invoiceable(booking_id).await?;

        let commission_percent = self.commission.resolve(&property).await;
        let amounts = SettlementAmounts::derive(&booking, &property, commission_percent);

        if let Some(existing) = self.invoices.find_by_booking(booking_id).await? {
            let invoice = self.reconcile_existing(existing, &booking, &amounts).await?;
            return Ok(SettlementOutcome {
                invoice,
                created: false,
            });
        }

        let code_id = self.codes.ensure_for_booking(booking_id).await?;
        let new_invoice = NewInvoice::prepare(booking_id, code_id, &property.currency, &amounts, Utc::now());

        let (invoice, created) = match self.invoices.create_once(new_invoice).await {
            Ok(creation) => creation.into_parts(),
            Err(err) if err.is_conflict() => {
                warn!("Invoice insert hit a uniqueness conflict, re-reading");
                let existing = self
                    .invoices
                    .find_by_booking(booking_id)
                    .await?
                    .ok_or_else(|| SettlementError::Conflict(err.to_string()))?;
                (existing, false)
            }
            Err(err) => return Err(err.into()),
        };

        if created {
            info!(
                invoice_id = %invoice.id,
                invoice_number = %invoice.invoice_number,
                total = %amounts.effective_total,
                "Invoice created"
            );
        }
        Ok(SettlementOutcome { invoice, created })
    }

    async fn load_invoiceable(&self, booking_id: BookingId) -> Result<(Booking, Property), SettlementError> {
        let booking = self
            .lodging
            .find_booking(booking_id)
            .await?
            .ok_or(SettlementError::BookingNotFound(booking_id))?;
        let property = self
            .lodging
            .find_property(booking.property_id)
            .await?
            .ok_or(SettlementError::PropertyNotFound(booking.property_id))?;

        if !property.status.is_approved() {
            return Err(SettlementError::PropertyNotApproved {
                status: property.status,
            });
        }
        Ok((booking, property))
    }

    /// Handles a booking that already has an invoice
    ///
    /// Paid-like invoices are never touched and trigger activation of any
    /// waiting trips; a failed status flip is returned to the caller.
    /// Unpaid invoices are refreshed in place when stale.
    async fn reconcile_existing(
        &self,
        existing: Invoice,
        booking: &Booking,
        amounts: &SettlementAmounts,
    ) -> Result<Invoice, SettlementError> {
        if existing.is_paid_like() {
            self.activation
                .activate(
                    booking.id,
                    Some(existing.payment_ref.as_str()),
                    existing.payment_method.as_deref(),
                )
                .await?;
            return Ok(existing);
        }

        if existing.is_stale(booking.total_amount, amounts) {
            info!(invoice_id = %existing.id, "Refreshing stale invoice figures");
            let refreshed = self
                .invoices
                .refresh(existing.id, InvoiceRefresh::from(amounts))
                .await?;
            return Ok(refreshed);
        }

        Ok(existing)
    }
}
