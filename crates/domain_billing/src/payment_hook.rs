//! Entry point for the payment confirmation collaborator
//!
//! Whatever marks an invoice as paid calls [`PaymentConfirmationHook::on_invoice_paid`]
//! afterwards so the booking's trips become assignable.

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::InvoiceId;

use crate::activation::TransportActivationService;
use crate::error::SettlementError;
use crate::ports::InvoicePort;

pub struct PaymentConfirmationHook {
    invoices: Arc<dyn InvoicePort>,
    activation: Arc<TransportActivationService>,
}

impl PaymentConfirmationHook {
    pub fn new(invoices: Arc<dyn InvoicePort>, activation: Arc<TransportActivationService>) -> Self {
        Self {
            invoices,
            activation,
        }
    }

    /// Activates transport for a paid invoice
    ///
    /// Returns `false` without side effects when the stored invoice is not
    /// paid-like; the hook trusts the store, not the caller.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn on_invoice_paid(&self, invoice_id: InvoiceId) -> Result<bool, SettlementError> {
        let invoice = self
            .invoices
            .find_by_id(invoice_id)
            .await?
            .ok_or(SettlementError::InvoiceNotFound(invoice_id))?;

        if !invoice.is_paid_like() {
            info!(status = %invoice.status, "Invoice not paid, skipping activation");
            return Ok(false);
        }

        self.activation
            .activate(
                invoice.booking_id,
                Some(invoice.payment_ref.as_str()),
                invoice.payment_method.as_deref(),
            )
            .await?;
        Ok(true)
    }
}
