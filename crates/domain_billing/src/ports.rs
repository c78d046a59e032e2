//! Settlement Ports
//!
//! The settlement services reach the store and the driver channel only through
//! the traits in this module, so the same pipeline runs against PostgreSQL and
//! Redis in production and against the in-memory [`mock`] adapters in tests.
//!
//! # Adapters
//!
//! - **infra_db**: PostgreSQL implementations of every store port, including
//!   the transactional create-once for invoices
//! - **infra_realtime**: Redis pub/sub implementation of [`DriverNotifier`]
//! - **mock**: in-memory implementations (feature `mock`)
//!
//! # Usage
//!
//! ```rust,ignore
//! let settlement = SettlementService::new(
//!     lodging.clone(),
//!     invoices.clone(),
//!     CheckinCodeGenerator::new(codes),
//!     CommissionResolver::new(settings, Percentage::clamped(dec!(10))),
//!     activation.clone(),
//! );
//! let outcome = settlement.settle(BookingId::new(42)).await?;
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;

use core_kernel::{
    BookingId, DomainPort, InvoiceId, Percentage, PortError, PropertyId, TransportBookingId,
};
use domain_booking::{Booking, Property, TransportBooking, TripBackfill};

use crate::checkin_code::{CheckinCode, NewCheckinCode};
use crate::events::TripAvailableEvent;
use crate::invoice::{Invoice, InvoiceRefresh, NewInvoice};

/// Read access to bookings and their properties
#[async_trait]
pub trait LodgingPort: DomainPort {
    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, PortError>;

    async fn find_property(&self, id: PropertyId) -> Result<Option<Property>, PortError>;
}

/// Outcome of a create-once insert
#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceCreation {
    /// This call inserted the invoice
    Created(Invoice),
    /// Another request got there first
    Existing(Invoice),
}

impl InvoiceCreation {
    /// The invoice, and whether this call created it
    pub fn into_parts(self) -> (Invoice, bool) {
        match self {
            InvoiceCreation::Created(invoice) => (invoice, true),
            InvoiceCreation::Existing(invoice) => (invoice, false),
        }
    }
}

/// Invoice storage
#[async_trait]
pub trait InvoicePort: DomainPort {
    async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, PortError>;

    async fn find_by_booking(&self, booking_id: BookingId) -> Result<Option<Invoice>, PortError>;

    /// Inserts the invoice unless the booking already has one
    ///
    /// Implementations re-check for an existing invoice inside the same
    /// transaction as the insert and return [`InvoiceCreation::Existing`]
    /// when one is found. A uniqueness violation that slips past the re-check
    /// surfaces as `PortError::Conflict`.
    async fn create_once(&self, invoice: NewInvoice) -> Result<InvoiceCreation, PortError>;

    /// Rewrites the financial figures of an unpaid invoice
    ///
    /// Paid-like invoices are returned unchanged.
    async fn refresh(&self, id: InvoiceId, refresh: InvoiceRefresh) -> Result<Invoice, PortError>;
}

/// Check-in code storage
#[async_trait]
pub trait CheckinCodePort: DomainPort {
    async fn find_by_booking(&self, booking_id: BookingId) -> Result<Option<CheckinCode>, PortError>;

    /// Inserts a code; `PortError::Conflict` when the code or the booking is taken
    async fn insert(&self, code: NewCheckinCode) -> Result<CheckinCode, PortError>;
}

/// Transport booking storage
#[async_trait]
pub trait TransportPort: DomainPort {
    /// All trips carrying the correlation key, oldest first
    async fn find_by_correlation(&self, correlation_key: &str) -> Result<Vec<TransportBooking>, PortError>;

    /// Atomically flips pre-assignment trips to awaiting assignment and paid
    ///
    /// Trips already awaiting assignment and paid are left alone. Returns the
    /// trips this call flipped.
    async fn mark_paid(
        &self,
        correlation_key: &str,
        payment_ref: &str,
        payment_method: &str,
    ) -> Result<Vec<TransportBooking>, PortError>;

    /// Writes backfilled fields without overwriting existing values
    async fn apply_backfill(
        &self,
        id: TransportBookingId,
        backfill: &TripBackfill,
    ) -> Result<TransportBooking, PortError>;
}

/// The system-wide settings record
#[async_trait]
pub trait CommissionSettingsPort: DomainPort {
    /// Reads the global commission percent, creating the record with
    /// `default` when it does not exist yet
    async fn global_commission_percent(&self, default: Percentage) -> Result<Decimal, PortError>;
}

/// Real-time channel to drivers
#[async_trait]
pub trait DriverNotifier: DomainPort {
    async fn publish(&self, channel: &str, event: &TripAvailableEvent) -> Result<(), PortError>;
}

/// In-memory adapters for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, CheckinCodeId, HealthCheckResult, HealthCheckable};
    use domain_booking::{TripPaymentStatus, TripStatus};

    use crate::invoice::InvoiceStatus;

    fn unavailable() -> PortError {
        PortError::connection("mock adapter configured to fail")
    }

    /// In-memory bookings and properties
    #[derive(Debug, Default)]
    pub struct MockLodgingPort {
        bookings: Arc<RwLock<HashMap<BookingId, Booking>>>,
        properties: Arc<RwLock<HashMap<PropertyId, Property>>>,
    }

    impl MockLodgingPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn insert_booking(&self, booking: Booking) {
            self.bookings.write().await.insert(booking.id, booking);
        }

        pub async fn insert_property(&self, property: Property) {
            self.properties.write().await.insert(property.id, property);
        }
    }

    impl DomainPort for MockLodgingPort {}

    #[async_trait]
    impl HealthCheckable for MockLodgingPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-lodging-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl LodgingPort for MockLodgingPort {
        async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, PortError> {
            Ok(self.bookings.read().await.get(&id).cloned())
        }

        async fn find_property(&self, id: PropertyId) -> Result<Option<Property>, PortError> {
            Ok(self.properties.read().await.get(&id).cloned())
        }
    }

    /// In-memory invoices
    ///
    /// `create_once` holds the write lock across the re-check and the insert,
    /// standing in for the store transaction.
    #[derive(Debug, Default)]
    pub struct MockInvoicePort {
        invoices: Arc<RwLock<HashMap<InvoiceId, Invoice>>>,
        next_id: AtomicI64,
        conflict_on_create: AtomicBool,
    }

    impl MockInvoicePort {
        pub fn new() -> Self {
            Self::default()
        }

        fn allocate_id(&self) -> InvoiceId {
            InvoiceId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
        }

        fn materialize(&self, new: NewInvoice) -> Invoice {
            let now = Utc::now();
            Invoice {
                id: self.allocate_id(),
                invoice_number: new.invoice_number,
                booking_id: new.booking_id,
                total: Some(new.total),
                net_payable: Some(new.net_payable),
                commission_percent: new.commission_percent,
                commission_amount: new.commission_amount,
                tax_percent: new.tax_percent,
                status: new.status,
                payment_ref: new.payment_ref,
                payment_method: None,
                notes: Some(new.notes),
                receipt_number: None,
                receipt_url: None,
                paid_at: None,
                currency: new.currency,
                created_at: now,
                updated_at: now,
            }
        }

        /// Seeds an invoice, keeping its id
        pub async fn insert(&self, invoice: Invoice) {
            self.next_id.fetch_max(invoice.id.value(), Ordering::SeqCst);
            self.invoices.write().await.insert(invoice.id, invoice);
        }

        /// Simulates the payment collaborator confirming an invoice
        pub async fn mark_paid(&self, id: InvoiceId, payment_method: &str) -> Option<Invoice> {
            let mut invoices = self.invoices.write().await;
            let invoice = invoices.get_mut(&id)?;
            invoice.status = InvoiceStatus::Paid;
            invoice.payment_method = Some(payment_method.to_string());
            invoice.paid_at = Some(Utc::now());
            invoice.updated_at = Utc::now();
            Some(invoice.clone())
        }

        /// Makes the next `create_once` behave as if a concurrent insert won
        /// after the in-transaction re-check
        pub fn conflict_on_next_create(&self) {
            self.conflict_on_create.store(true, Ordering::SeqCst);
        }

        pub async fn count_for_booking(&self, booking_id: BookingId) -> usize {
            self.invoices
                .read()
                .await
                .values()
                .filter(|i| i.booking_id == booking_id)
                .count()
        }

        pub async fn get(&self, id: InvoiceId) -> Option<Invoice> {
            self.invoices.read().await.get(&id).cloned()
        }
    }

    impl DomainPort for MockInvoicePort {}

    #[async_trait]
    impl InvoicePort for MockInvoicePort {
        async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, PortError> {
            Ok(self.invoices.read().await.get(&id).cloned())
        }

        async fn find_by_booking(&self, booking_id: BookingId) -> Result<Option<Invoice>, PortError> {
            Ok(self
                .invoices
                .read()
                .await
                .values()
                .find(|i| i.booking_id == booking_id)
                .cloned())
        }

        async fn create_once(&self, invoice: NewInvoice) -> Result<InvoiceCreation, PortError> {
            let mut invoices = self.invoices.write().await;
            if let Some(existing) = invoices.values().find(|i| i.booking_id == invoice.booking_id) {
                return Ok(InvoiceCreation::Existing(existing.clone()));
            }

            let created = self.materialize(invoice);
            if self.conflict_on_create.swap(false, Ordering::SeqCst) {
                invoices.insert(created.id, created);
                return Err(PortError::conflict("duplicate key value violates unique constraint"));
            }
            invoices.insert(created.id, created.clone());
            Ok(InvoiceCreation::Created(created))
        }

        async fn refresh(&self, id: InvoiceId, refresh: InvoiceRefresh) -> Result<Invoice, PortError> {
            let mut invoices = self.invoices.write().await;
            let invoice = invoices
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Invoice", id))?;
            if !invoice.is_paid_like() {
                invoice.total = Some(refresh.total);
                invoice.net_payable = Some(refresh.net_payable);
                invoice.commission_percent = refresh.commission_percent;
                invoice.commission_amount = refresh.commission_amount;
                invoice.updated_at = Utc::now();
            }
            Ok(invoice.clone())
        }
    }

    /// In-memory check-in codes with injectable collisions
    #[derive(Debug, Default)]
    pub struct MockCheckinCodePort {
        codes: Arc<RwLock<Vec<CheckinCode>>>,
        next_id: AtomicI64,
        forced_conflicts: AtomicU32,
        attempts: AtomicU32,
        fail: AtomicBool,
    }

    impl MockCheckinCodePort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes the next `n` inserts report a uniqueness conflict
        pub fn force_conflicts(&self, n: u32) {
            self.forced_conflicts.store(n, Ordering::SeqCst);
        }

        /// Makes every insert fail with a connection error
        pub fn fail_inserts(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        pub fn insert_attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }

        pub async fn count_for_booking(&self, booking_id: BookingId) -> usize {
            self.codes
                .read()
                .await
                .iter()
                .filter(|c| c.booking_id == booking_id)
                .count()
        }
    }

    impl DomainPort for MockCheckinCodePort {}

    #[async_trait]
    impl CheckinCodePort for MockCheckinCodePort {
        async fn find_by_booking(&self, booking_id: BookingId) -> Result<Option<CheckinCode>, PortError> {
            Ok(self
                .codes
                .read()
                .await
                .iter()
                .find(|c| c.booking_id == booking_id)
                .cloned())
        }

        async fn insert(&self, code: NewCheckinCode) -> Result<CheckinCode, PortError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let forced = self
                .forced_conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if forced {
                return Err(PortError::conflict("check-in code already exists"));
            }

            let mut codes = self.codes.write().await;
            if codes
                .iter()
                .any(|c| c.code == code.code || c.booking_id == code.booking_id)
            {
                return Err(PortError::conflict("check-in code already exists"));
            }
            let stored = CheckinCode {
                id: CheckinCodeId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
                booking_id: code.booking_id,
                code: code.code,
                code_hash: code.code_hash,
                status: code.status,
                generated_at: code.generated_at,
            };
            codes.push(stored.clone());
            Ok(stored)
        }
    }

    /// In-memory transport bookings
    #[derive(Debug, Default)]
    pub struct MockTransportPort {
        trips: Arc<RwLock<HashMap<TransportBookingId, TransportBooking>>>,
        fail_backfill: Arc<RwLock<Vec<TransportBookingId>>>,
        fail_mark_paid: AtomicBool,
    }

    impl MockTransportPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn insert(&self, trip: TransportBooking) {
            self.trips.write().await.insert(trip.id, trip);
        }

        pub async fn get(&self, id: TransportBookingId) -> Option<TransportBooking> {
            self.trips.read().await.get(&id).cloned()
        }

        /// Makes backfill writes for one trip fail
        pub async fn fail_backfill_for(&self, id: TransportBookingId) {
            self.fail_backfill.write().await.push(id);
        }

        /// Makes every payment flip fail
        pub fn fail_mark_paid(&self) {
            self.fail_mark_paid.store(true, Ordering::SeqCst);
        }
    }

    impl DomainPort for MockTransportPort {}

    #[async_trait]
    impl TransportPort for MockTransportPort {
        async fn find_by_correlation(&self, correlation_key: &str) -> Result<Vec<TransportBooking>, PortError> {
            let mut trips: Vec<_> = self
                .trips
                .read()
                .await
                .values()
                .filter(|t| t.correlation_key == correlation_key)
                .cloned()
                .collect();
            trips.sort_by_key(|t| (t.created_at, t.id));
            Ok(trips)
        }

        async fn mark_paid(
            &self,
            correlation_key: &str,
            payment_ref: &str,
            payment_method: &str,
        ) -> Result<Vec<TransportBooking>, PortError> {
            if self.fail_mark_paid.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let mut trips = self.trips.write().await;
            let mut flipped: Vec<TransportBooking> = Vec::new();
            for trip in trips.values_mut() {
                if trip.correlation_key != correlation_key || !trip.awaits_activation() {
                    continue;
                }
                trip.status = TripStatus::AwaitingAssignment;
                trip.payment_status = TripPaymentStatus::Paid;
                trip.payment_ref = Some(payment_ref.to_string());
                trip.payment_method = Some(payment_method.to_string());
                trip.updated_at = Utc::now();
                flipped.push(trip.clone());
            }
            flipped.sort_by_key(|t| (t.created_at, t.id));
            Ok(flipped)
        }

        async fn apply_backfill(
            &self,
            id: TransportBookingId,
            backfill: &TripBackfill,
        ) -> Result<TransportBooking, PortError> {
            if self.fail_backfill.read().await.contains(&id) {
                return Err(unavailable());
            }
            let mut trips = self.trips.write().await;
            let trip = trips
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("TransportBooking", id))?;
            backfill.apply_to(trip);
            trip.updated_at = Utc::now();
            Ok(trip.clone())
        }
    }

    /// In-memory settings record
    #[derive(Debug, Default)]
    pub struct MockCommissionSettings {
        stored: Arc<RwLock<Option<Decimal>>>,
        fail: AtomicBool,
    }

    impl MockCommissionSettings {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_percent(percent: Decimal) -> Self {
            Self {
                stored: Arc::new(RwLock::new(Some(percent))),
                fail: AtomicBool::new(false),
            }
        }

        pub fn failing() -> Self {
            Self {
                stored: Arc::default(),
                fail: AtomicBool::new(true),
            }
        }

        pub async fn stored(&self) -> Option<Decimal> {
            *self.stored.read().await
        }
    }

    impl DomainPort for MockCommissionSettings {}

    #[async_trait]
    impl CommissionSettingsPort for MockCommissionSettings {
        async fn global_commission_percent(&self, default: Percentage) -> Result<Decimal, PortError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let mut stored = self.stored.write().await;
            Ok(*stored.get_or_insert(default.value()))
        }
    }

    /// Records published events
    #[derive(Debug, Default)]
    pub struct MockDriverNotifier {
        published: Arc<RwLock<Vec<(String, TripAvailableEvent)>>>,
        fail: AtomicBool,
    }

    impl MockDriverNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                published: Arc::default(),
                fail: AtomicBool::new(true),
            }
        }

        pub async fn published(&self) -> Vec<(String, TripAvailableEvent)> {
            self.published.read().await.clone()
        }
    }

    impl DomainPort for MockDriverNotifier {}

    #[async_trait]
    impl DriverNotifier for MockDriverNotifier {
        async fn publish(&self, channel: &str, event: &TripAvailableEvent) -> Result<(), PortError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.published
                .write()
                .await
                .push((channel.to_string(), event.clone()));
            Ok(())
        }
    }
}
