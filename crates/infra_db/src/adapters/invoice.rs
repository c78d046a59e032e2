//! PostgreSQL invoice adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use core_kernel::{
    BookingId, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, PortError,
};
use domain_billing::{Invoice, InvoiceCreation, InvoicePort, InvoiceRefresh, InvoiceStatus, NewInvoice};

use crate::repositories::invoice::{
    InvoiceFigures, InvoiceRepository, InvoiceRow, InvoiceStatus as DbInvoiceStatus, NewInvoiceRow,
};

#[derive(Debug, Clone)]
pub struct PostgresInvoiceAdapter {
    repository: InvoiceRepository,
    pool: PgPool,
}

impl PostgresInvoiceAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: InvoiceRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresInvoiceAdapter {}

#[async_trait]
impl HealthCheckable for PostgresInvoiceAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-invoice-adapter").await
    }
}

#[async_trait]
impl InvoicePort for PostgresInvoiceAdapter {
    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, PortError> {
        debug!("Fetching invoice");
        let row = self.repository.find_by_id(id.value()).await?;
        Ok(row.map(row_to_invoice))
    }

    #[instrument(skip(self), fields(booking_id = %booking_id))]
    async fn find_by_booking(&self, booking_id: BookingId) -> Result<Option<Invoice>, PortError> {
        debug!("Fetching invoice by booking");
        let row = self.repository.find_by_booking(booking_id.value()).await?;
        Ok(row.map(row_to_invoice))
    }

    #[instrument(skip(self, invoice), fields(booking_id = %invoice.booking_id))]
    async fn create_once(&self, invoice: NewInvoice) -> Result<InvoiceCreation, PortError> {
        let (row, inserted) = self.repository.create_once(new_invoice_row(invoice)).await?;
        let invoice = row_to_invoice(row);
        if inserted {
            info!(invoice_id = %invoice.id, "Invoice row inserted");
            Ok(InvoiceCreation::Created(invoice))
        } else {
            Ok(InvoiceCreation::Existing(invoice))
        }
    }

    #[instrument(skip(self, refresh), fields(invoice_id = %id))]
    async fn refresh(&self, id: InvoiceId, refresh: InvoiceRefresh) -> Result<Invoice, PortError> {
        let figures = InvoiceFigures {
            total: refresh.total,
            net_payable: refresh.net_payable,
            commission_percent: refresh.commission_percent,
            commission_amount: refresh.commission_amount,
        };
        let row = self.repository.refresh(id.value(), figures).await?;
        Ok(row_to_invoice(row))
    }
}

fn new_invoice_row(invoice: NewInvoice) -> NewInvoiceRow {
    NewInvoiceRow {
        invoice_number: invoice.invoice_number,
        booking_id: invoice.booking_id.value(),
        checkin_code_id: invoice.checkin_code_id.value(),
        total: invoice.total,
        net_payable: invoice.net_payable,
        commission_percent: invoice.commission_percent,
        commission_amount: invoice.commission_amount,
        tax_percent: invoice.tax_percent,
        status: invoice.status.into(),
        payment_ref: invoice.payment_ref,
        notes: invoice.notes,
        currency: invoice.currency,
    }
}

fn row_to_invoice(row: InvoiceRow) -> Invoice {
    Invoice {
        id: InvoiceId::new(row.id),
        invoice_number: row.invoice_number,
        booking_id: BookingId::new(row.booking_id),
        total: row.total,
        net_payable: row.net_payable,
        commission_percent: row.commission_percent,
        commission_amount: row.commission_amount,
        tax_percent: row.tax_percent,
        status: row.status.into(),
        payment_ref: row.payment_ref,
        payment_method: row.payment_method,
        notes: row.notes,
        receipt_number: row.receipt_number,
        receipt_url: row.receipt_url,
        paid_at: row.paid_at,
        currency: row.currency,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

impl From<DbInvoiceStatus> for InvoiceStatus {
    fn from(status: DbInvoiceStatus) -> Self {
        match status {
            DbInvoiceStatus::Requested => InvoiceStatus::Requested,
            DbInvoiceStatus::Verifying => InvoiceStatus::Verifying,
            DbInvoiceStatus::Approved => InvoiceStatus::Approved,
            DbInvoiceStatus::Processing => InvoiceStatus::Processing,
            DbInvoiceStatus::Paid => InvoiceStatus::Paid,
            DbInvoiceStatus::Rejected => InvoiceStatus::Rejected,
            DbInvoiceStatus::CustomerPaid => InvoiceStatus::CustomerPaid,
        }
    }
}

impl From<InvoiceStatus> for DbInvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Requested => DbInvoiceStatus::Requested,
            InvoiceStatus::Verifying => DbInvoiceStatus::Verifying,
            InvoiceStatus::Approved => DbInvoiceStatus::Approved,
            InvoiceStatus::Processing => DbInvoiceStatus::Processing,
            InvoiceStatus::Paid => DbInvoiceStatus::Paid,
            InvoiceStatus::Rejected => DbInvoiceStatus::Rejected,
            InvoiceStatus::CustomerPaid => DbInvoiceStatus::CustomerPaid,
        }
    }
}
