//! Custom Test Assertions
//!
//! Assertions over settlement figures with messages that show the numbers
//! involved.

use rust_decimal::Decimal;

use domain_billing::{Invoice, InvoiceBreakdown};

/// Asserts a value carries at most two decimal places
pub fn assert_two_places(value: Decimal) {
    assert!(
        value.round_dp(2) == value,
        "Expected an amount rounded to cents, got {}",
        value
    );
}

/// Asserts that an invoice's owner share plus commission equals its total
///
/// Tolerates one cent of drift from rounding each figure independently.
pub fn assert_invoice_balances(invoice: &Invoice) {
    let total = invoice.total.unwrap_or(Decimal::ZERO);
    let net = invoice.net_payable.unwrap_or(Decimal::ZERO);
    let commission = invoice.commission_amount.unwrap_or(Decimal::ZERO);
    let drift = (total - net - commission).abs();
    assert!(
        drift <= Decimal::new(1, 2),
        "Invoice {} does not balance: total={}, net={}, commission={}",
        invoice.invoice_number,
        total,
        net,
        commission
    );
}

/// Asserts that a public breakdown adds up and shows no commission
pub fn assert_public_breakdown(breakdown: &InvoiceBreakdown) {
    assert!(
        breakdown.commission.is_zero(),
        "Public breakdown exposes commission {}",
        breakdown.commission
    );
    assert_eq!(
        breakdown.accommodation_subtotal + breakdown.transport_fare,
        breakdown.total,
        "Breakdown parts do not sum to the total"
    );
    assert!(breakdown.transport_fare >= Decimal::ZERO);
    assert!(breakdown.accommodation_subtotal >= Decimal::ZERO);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_two_places() {
        assert_two_places(dec!(110000.00));
        assert_two_places(dec!(12.5));
    }

    #[test]
    #[should_panic(expected = "rounded to cents")]
    fn test_three_places_panics() {
        assert_two_places(dec!(1.005));
    }

    #[test]
    fn test_public_breakdown() {
        assert_public_breakdown(&InvoiceBreakdown::from_total(dec!(128000), dec!(20000)));
    }
}
