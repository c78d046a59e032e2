//! Settlement Domain - Booking to Invoice
//!
//! This crate turns a confirmed booking into exactly one invoice and, once
//! that invoice is paid, releases the booking's transport to drivers.
//!
//! # Pipeline
//!
//! 1. **Commission**: a per-property override, else the global percent
//! 2. **Price split**: commission applied to the accommodation subtotal
//! 3. **Check-in code**: allocated once per booking, retried on collision
//! 4. **Settlement**: idempotent create-or-refresh of the invoice
//! 5. **Activation**: paid invoices flip pending trips and notify drivers
//! 6. **Projection**: a public breakdown that never exposes commission
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::SettlementService;
//!
//! let outcome = settlement.settle(BookingId::new(42)).await?;
//! if outcome.created {
//!     println!("created {}", outcome.invoice.invoice_number);
//! }
//! ```

pub mod pricing;
pub mod commission;
pub mod checkin_code;
pub mod invoice;
pub mod events;
pub mod ports;
pub mod settlement;
pub mod activation;
pub mod projection;
pub mod payment_hook;
pub mod error;

pub use pricing::{split, split_raw, PriceSplit, SettlementAmounts};
pub use commission::CommissionResolver;
pub use checkin_code::{CheckinCode, CheckinCodeGenerator, CheckinCodeStatus, NewCheckinCode, MAX_CODE_ATTEMPTS};
pub use invoice::{Invoice, InvoiceRefresh, InvoiceStatus, NewInvoice};
pub use events::{TripAvailableEvent, DRIVERS_AVAILABLE_CHANNEL};
pub use ports::{
    CheckinCodePort, CommissionSettingsPort, DriverNotifier, InvoiceCreation, InvoicePort,
    LodgingPort, TransportPort,
};
pub use settlement::{SettlementOutcome, SettlementService};
pub use activation::{ActivationReport, TransportActivationService};
pub use projection::{InvoiceBreakdown, InvoiceProjector, InvoiceView};
pub use payment_hook::PaymentConfirmationHook;
pub use error::SettlementError;
