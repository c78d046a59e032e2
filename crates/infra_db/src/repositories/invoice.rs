//! Invoice repository
//!
//! `invoices.booking_id` is unique. Creation additionally locks the booking
//! row so that two settlements of the same booking queue up instead of
//! racing to the constraint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

use crate::error::DatabaseError;

const INVOICE_COLUMNS: &str = r#"
    id, invoice_number, booking_id, checkin_code_id, total, net_payable,
    commission_percent, commission_amount, tax_percent, status, payment_ref,
    payment_method, notes, receipt_number, receipt_url, paid_at, currency,
    created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<InvoiceRow>, DatabaseError> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1");
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_booking(&self, booking_id: i64) -> Result<Option<InvoiceRow>, DatabaseError> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE booking_id = $1");
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Inserts the booking's invoice unless one already exists
    ///
    /// Runs in one transaction: lock the booking row, look for an invoice,
    /// insert only if none was found. Returns the row and whether it was
    /// inserted by this call.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` when the booking row does not exist
    /// - `DatabaseError::DuplicateEntry` if a unique constraint still fires
    pub async fn create_once(&self, invoice: NewInvoiceRow) -> Result<(InvoiceRow, bool), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(invoice.booking_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(DatabaseError::not_found("Booking", invoice.booking_id));
        }

        let select = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE booking_id = $1");
        let existing = sqlx::query_as::<_, InvoiceRow>(&select)
            .bind(invoice.booking_id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(existing) = existing {
            tx.commit().await?;
            debug!(booking_id = invoice.booking_id, "Invoice already present under lock");
            return Ok((existing, false));
        }

        let insert = format!(
            r#"
            INSERT INTO invoices (
                invoice_number, booking_id, checkin_code_id, total, net_payable,
                commission_percent, commission_amount, tax_percent, status,
                payment_ref, notes, currency, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING {INVOICE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, InvoiceRow>(&insert)
            .bind(&invoice.invoice_number)
            .bind(invoice.booking_id)
            .bind(invoice.checkin_code_id)
            .bind(invoice.total)
            .bind(invoice.net_payable)
            .bind(invoice.commission_percent)
            .bind(invoice.commission_amount)
            .bind(invoice.tax_percent)
            .bind(invoice.status)
            .bind(&invoice.payment_ref)
            .bind(&invoice.notes)
            .bind(&invoice.currency)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((row, true))
    }

    /// Overwrites the figures of an unpaid invoice
    ///
    /// Paid invoices, and customer-paid ones backed by a receipt, are
    /// excluded by the `WHERE` clause; the current row is returned either way.
    pub async fn refresh(&self, id: i64, figures: InvoiceFigures) -> Result<InvoiceRow, DatabaseError> {
        let update = format!(
            r#"
            UPDATE invoices
            SET total = $2,
                net_payable = $3,
                commission_percent = $4,
                commission_amount = $5,
                updated_at = NOW()
            WHERE id = $1
              AND status <> 'PAID'
              AND NOT (
                  status = 'CUSTOMER_PAID'
                  AND (NULLIF(BTRIM(receipt_number), '') IS NOT NULL
                       OR NULLIF(BTRIM(receipt_url), '') IS NOT NULL)
              )
            RETURNING {INVOICE_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, InvoiceRow>(&update)
            .bind(id)
            .bind(figures.total)
            .bind(figures.net_payable)
            .bind(figures.commission_percent)
            .bind(figures.commission_amount)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(row),
            None => self
                .find_by_id(id)
                .await?
                .ok_or_else(|| DatabaseError::not_found("Invoice", id)),
        }
    }
}

/// Row of the `invoices` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: i64,
    pub invoice_number: String,
    pub booking_id: i64,
    pub checkin_code_id: Option<i64>,
    pub total: Option<Decimal>,
    pub net_payable: Option<Decimal>,
    pub commission_percent: Option<Decimal>,
    pub commission_amount: Option<Decimal>,
    pub tax_percent: Decimal,
    pub status: InvoiceStatus,
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

/// Insert payload for [`InvoiceRepository::create_once`]
#[derive(Debug, Clone)]
pub struct NewInvoiceRow {
    pub invoice_number: String,
    pub booking_id: i64,
    pub checkin_code_id: i64,
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

/// Recomputed money columns
#[derive(Debug, Clone, Copy)]
pub struct InvoiceFigures {
    pub total: Decimal,
    pub net_payable: Decimal,
    pub commission_percent: Option<Decimal>,
    pub commission_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invoice_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Requested,
    Verifying,
    Approved,
    Processing,
    Paid,
    Rejected,
    CustomerPaid,
}
