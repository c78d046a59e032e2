//! Invoice DTOs
//!
//! Public bodies use camelCase. The read view never carries commission or
//! owner payout figures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{BookingId, InvoiceId};
use domain_billing::{InvoiceBreakdown, InvoiceView, SettlementOutcome};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    #[validate(range(min = 1, message = "bookingId must be a positive integer"))]
    pub booking_id: i64,
}

impl CreateInvoiceRequest {
    pub fn booking_id(&self) -> BookingId {
        BookingId::new(self.booking_id)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceResponse {
    pub ok: bool,
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub payment_ref: String,
    pub status: String,
    pub total: Option<Decimal>,
    pub net_payable: Option<Decimal>,
    pub currency: String,
}

impl From<SettlementOutcome> for CreateInvoiceResponse {
    fn from(outcome: SettlementOutcome) -> Self {
        let invoice = outcome.invoice;
        Self {
            ok: true,
            created: outcome.created,
            message: (!outcome.created).then(|| "Invoice already exists".to_string()),
            invoice_id: invoice.id,
            invoice_number: invoice.invoice_number,
            payment_ref: invoice.payment_ref,
            status: invoice.status.to_string(),
            total: invoice.total,
            net_payable: invoice.net_payable,
            currency: invoice.currency,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceReadResponse {
    pub ok: bool,
    pub invoice: PublicInvoice,
}

/// What the payer may see of an invoice
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicInvoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub booking_id: BookingId,
    pub status: String,
    pub payment_ref: String,
    pub payment_method: Option<String>,
    pub total: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub breakdown: InvoiceBreakdown,
}

impl From<InvoiceView> for InvoiceReadResponse {
    fn from(view: InvoiceView) -> Self {
        let invoice = view.invoice;
        Self {
            ok: true,
            invoice: PublicInvoice {
                id: invoice.id,
                invoice_number: invoice.invoice_number,
                booking_id: invoice.booking_id,
                status: invoice.status.to_string(),
                payment_ref: invoice.payment_ref,
                payment_method: invoice.payment_method,
                total: view.breakdown.total,
                currency: invoice.currency,
                notes: invoice.notes,
                paid_at: invoice.paid_at,
                created_at: invoice.created_at,
                breakdown: view.breakdown,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let valid: CreateInvoiceRequest = serde_json::from_str(r#"{"bookingId": 42}"#).unwrap();
        assert!(valid.validate().is_ok());
        assert_eq!(valid.booking_id(), BookingId::new(42));

        let zero: CreateInvoiceRequest = serde_json::from_str(r#"{"bookingId": 0}"#).unwrap();
        assert!(zero.validate().is_err());

        let negative: CreateInvoiceRequest = serde_json::from_str(r#"{"bookingId": -3}"#).unwrap();
        assert!(negative.validate().is_err());
    }
}
