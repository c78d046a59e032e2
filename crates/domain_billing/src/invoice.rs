//! Invoices produced by settlement
//!
//! An invoice is created once per booking with status `REQUESTED`. Payment
//! confirmation happens elsewhere and advances the status; from then on the
//! financial fields are frozen.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{format_amount, BookingId, CheckinCodeId, InvoiceId};

use crate::pricing::SettlementAmounts;

/// Invoice lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Created by settlement, awaiting payment
    Requested,
    /// Payment proof submitted, under review
    Verifying,
    Approved,
    Processing,
    /// Payment confirmed
    Paid,
    Rejected,
    /// Legacy status set by the customer; counts as paid only with a receipt
    CustomerPaid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Requested => "REQUESTED",
            InvoiceStatus::Verifying => "VERIFYING",
            InvoiceStatus::Approved => "APPROVED",
            InvoiceStatus::Processing => "PROCESSING",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Rejected => "REJECTED",
            InvoiceStatus::CustomerPaid => "CUSTOMER_PAID",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REQUESTED" => Ok(InvoiceStatus::Requested),
            "VERIFYING" => Ok(InvoiceStatus::Verifying),
            "APPROVED" => Ok(InvoiceStatus::Approved),
            "PROCESSING" => Ok(InvoiceStatus::Processing),
            "PAID" => Ok(InvoiceStatus::Paid),
            "REJECTED" => Ok(InvoiceStatus::Rejected),
            "CUSTOMER_PAID" => Ok(InvoiceStatus::CustomerPaid),
            other => Err(format!("Unknown invoice status: {}", other)),
        }
    }
}

/// A persisted invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Human-readable number, `INV-<YYYYMM>-<booking>-<code>`
    pub invoice_number: String,
    pub booking_id: BookingId,
    /// What the customer pays
    pub total: Option<Decimal>,
    /// What the owner receives
    pub net_payable: Option<Decimal>,
    pub commission_percent: Option<Decimal>,
    pub commission_amount: Option<Decimal>,
    pub tax_percent: Decimal,
    pub status: InvoiceStatus,
    /// Opaque token correlating the invoice with its payment
    pub payment_ref: String,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub receipt_number: Option<String>,
    pub receipt_url: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn has_text(value: Option<&str>) -> bool {
    value.map_or(false, |v| !v.trim().is_empty())
}

impl Invoice {
    /// Whether the invoice counts as settled
    ///
    /// `PAID` always does; the legacy `CUSTOMER_PAID` only when a receipt
    /// number or receipt URL backs it.
    pub fn is_paid_like(&self) -> bool {
        match self.status {
            InvoiceStatus::Paid => true,
            InvoiceStatus::CustomerPaid => {
                has_text(self.receipt_number.as_deref()) || has_text(self.receipt_url.as_deref())
            }
            _ => false,
        }
    }

    /// Whether the stored figures predate the current pricing rules
    ///
    /// `booking_total` is the booking's raw total; an invoice whose total still
    /// equals it while a commission is now expected was written before totals
    /// included commission.
    pub fn is_stale(&self, booking_total: Option<Decimal>, expected: &SettlementAmounts) -> bool {
        let total = match self.total {
            Some(total) if !total.is_zero() => total,
            _ => return true,
        };
        if self.net_payable.is_none() {
            return true;
        }
        if expected.expects_commission() {
            if booking_total == Some(total) {
                return true;
            }
            if self.commission_amount.is_none() || self.commission_percent.is_none() {
                return true;
            }
        }
        false
    }
}

/// Figures written onto a stale invoice
///
/// Number, booking link and payment reference are never part of a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRefresh {
    pub total: Decimal,
    pub net_payable: Decimal,
    pub commission_percent: Option<Decimal>,
    pub commission_amount: Option<Decimal>,
}

impl From<&SettlementAmounts> for InvoiceRefresh {
    fn from(amounts: &SettlementAmounts) -> Self {
        Self {
            total: amounts.effective_total,
            net_payable: amounts.net_payable,
            commission_percent: amounts.stored_commission_percent(),
            commission_amount: amounts.stored_commission_amount(),
        }
    }
}

/// An invoice about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub booking_id: BookingId,
    pub checkin_code_id: CheckinCodeId,
    pub total: Decimal,
    pub net_payable: Decimal,
    pub commission_percent: Option<Decimal>,
    pub commission_amount: Option<Decimal>,
    pub tax_percent: Decimal,
    pub status: InvoiceStatus,
    pub payment_ref: String,
    pub notes: String,
    pub currency: String,
}

impl NewInvoice {
    /// Prepares a `REQUESTED` invoice for a booking
    pub fn prepare(
        booking_id: BookingId,
        checkin_code_id: CheckinCodeId,
        currency: &str,
        amounts: &SettlementAmounts,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            invoice_number: invoice_number(now, booking_id, checkin_code_id),
            booking_id,
            checkin_code_id,
            total: amounts.effective_total,
            net_payable: amounts.net_payable,
            commission_percent: amounts.stored_commission_percent(),
            commission_amount: amounts.stored_commission_amount(),
            tax_percent: Decimal::ZERO,
            status: InvoiceStatus::Requested,
            payment_ref: new_payment_ref(),
            notes: charge_summary(currency, amounts),
            currency: currency.to_string(),
        }
    }
}

/// Builds `INV-<YYYYMM>-<bookingId>-<codeId>`
pub fn invoice_number(now: DateTime<Utc>, booking_id: BookingId, code_id: CheckinCodeId) -> String {
    format!("INV-{}-{}-{}", now.format("%Y%m"), booking_id, code_id)
}

/// A fresh `PAY-` reference with 32 uppercase hex digits
pub fn new_payment_ref() -> String {
    format!("PAY-{}", Uuid::new_v4().simple().to_string().to_ascii_uppercase())
}

/// Free-text breakdown written into the invoice notes
pub fn charge_summary(currency: &str, amounts: &SettlementAmounts) -> String {
    let mut parts = vec![format!(
        "Accommodation: {}",
        format_amount(currency, amounts.accommodation_total)
    )];
    if amounts.transport_fare > Decimal::ZERO {
        parts.push(format!("Transport: {}", format_amount(currency, amounts.transport_fare)));
    }
    parts.push(format!("Total: {}", format_amount(currency, amounts.effective_total)));
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::Percentage;
    use rust_decimal_macros::dec;

    fn amounts(subtotal: Decimal, fare: Decimal, pct: Decimal) -> SettlementAmounts {
        let split = crate::pricing::split(subtotal, Percentage::clamped(pct));
        SettlementAmounts {
            nights: 2,
            accommodation_subtotal: subtotal,
            transport_fare: fare,
            commission_percent: Percentage::clamped(pct),
            commission_amount: split.commission,
            accommodation_total: split.total,
            effective_total: split.total + fare,
            net_payable: subtotal,
        }
    }

    fn invoice(status: InvoiceStatus) -> Invoice {
        let now = Utc::now();
        Invoice {
            id: InvoiceId::new(1),
            invoice_number: "INV-202603-5-9".to_string(),
            booking_id: BookingId::new(5),
            total: Some(dec!(128000)),
            net_payable: Some(dec!(100000)),
            commission_percent: Some(dec!(8)),
            commission_amount: Some(dec!(8000)),
            tax_percent: Decimal::ZERO,
            status,
            payment_ref: "PAY-ABC".to_string(),
            payment_method: None,
            notes: None,
            receipt_number: None,
            receipt_url: None,
            paid_at: None,
            currency: "TZS".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_paid_like() {
        assert!(invoice(InvoiceStatus::Paid).is_paid_like());
        assert!(!invoice(InvoiceStatus::Requested).is_paid_like());
        assert!(!invoice(InvoiceStatus::Approved).is_paid_like());

        let mut legacy = invoice(InvoiceStatus::CustomerPaid);
        assert!(!legacy.is_paid_like());
        legacy.receipt_number = Some("  ".to_string());
        assert!(!legacy.is_paid_like());
        legacy.receipt_url = Some("https://receipts.example/r/1".to_string());
        assert!(legacy.is_paid_like());
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("customer_paid".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::CustomerPaid);
        assert_eq!(InvoiceStatus::Requested.to_string(), "REQUESTED");
        assert!("VOID".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn test_current_invoice_is_not_stale() {
        let expected = amounts(dec!(100000), dec!(20000), dec!(8));
        assert!(!invoice(InvoiceStatus::Requested).is_stale(Some(dec!(120000)), &expected));
    }

    #[test]
    fn test_stale_when_total_missing_or_zero() {
        let expected = amounts(dec!(100000), dec!(20000), dec!(8));
        let mut inv = invoice(InvoiceStatus::Requested);
        inv.total = Some(Decimal::ZERO);
        assert!(inv.is_stale(Some(dec!(120000)), &expected));
        inv.total = None;
        assert!(inv.is_stale(Some(dec!(120000)), &expected));
    }

    #[test]
    fn test_stale_when_total_predates_commission() {
        let expected = amounts(dec!(100000), dec!(20000), dec!(8));
        let mut inv = invoice(InvoiceStatus::Requested);
        inv.total = Some(dec!(120000));
        assert!(inv.is_stale(Some(dec!(120000)), &expected));

        let no_commission = amounts(dec!(100000), dec!(20000), Decimal::ZERO);
        inv.commission_amount = None;
        inv.commission_percent = None;
        assert!(!inv.is_stale(Some(dec!(120000)), &no_commission));
    }

    #[test]
    fn test_stale_when_commission_or_net_missing() {
        let expected = amounts(dec!(100000), dec!(20000), dec!(8));
        let mut inv = invoice(InvoiceStatus::Requested);
        inv.commission_amount = None;
        assert!(inv.is_stale(Some(dec!(120000)), &expected));

        let mut inv = invoice(InvoiceStatus::Requested);
        inv.net_payable = None;
        assert!(inv.is_stale(Some(dec!(120000)), &expected));
    }

    #[test]
    fn test_stale_when_commission_percent_missing() {
        let expected = amounts(dec!(100000), dec!(20000), dec!(8));
        let mut inv = invoice(InvoiceStatus::Requested);
        inv.commission_percent = None;
        assert!(inv.is_stale(Some(dec!(120000)), &expected));
    }

    #[test]
    fn test_refresh_nulls_zero_commission() {
        let refresh = InvoiceRefresh::from(&amounts(dec!(5000), Decimal::ZERO, Decimal::ZERO));
        assert_eq!(refresh.total, dec!(5000));
        assert_eq!(refresh.commission_percent, None);
        assert_eq!(refresh.commission_amount, None);
    }

    #[test]
    fn test_invoice_number_format() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        assert_eq!(
            invoice_number(now, BookingId::new(42), CheckinCodeId::new(7)),
            "INV-202603-42-7"
        );
    }

    #[test]
    fn test_payment_ref_shape() {
        let reference = new_payment_ref();
        assert!(reference.starts_with("PAY-"));
        let hex = &reference[4..];
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_ne!(reference, new_payment_ref());
    }

    #[test]
    fn test_charge_summary() {
        let with_transport = amounts(dec!(100000), dec!(20000), dec!(8));
        assert_eq!(
            charge_summary("TZS", &with_transport),
            "Accommodation: TZS 108000.00 | Transport: TZS 20000.00 | Total: TZS 128000.00"
        );

        let lodging_only = amounts(dec!(150000), Decimal::ZERO, dec!(10));
        assert_eq!(
            charge_summary("TZS", &lodging_only),
            "Accommodation: TZS 165000.00 | Total: TZS 165000.00"
        );
    }

    #[test]
    fn test_prepare_new_invoice() {
        let expected = amounts(dec!(150000), Decimal::ZERO, dec!(10));
        let new = NewInvoice::prepare(BookingId::new(3), CheckinCodeId::new(11), "TZS", &expected, Utc::now());
        assert_eq!(new.status, InvoiceStatus::Requested);
        assert_eq!(new.total, dec!(165000));
        assert_eq!(new.net_payable, dec!(150000));
        assert_eq!(new.commission_amount, Some(dec!(15000)));
        assert!(new.invoice_number.ends_with("-3-11"));
    }
}
