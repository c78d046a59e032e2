//! Invoice handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use validator::Validate;

use core_kernel::InvoiceId;

use crate::dto::invoice::{CreateInvoiceRequest, CreateInvoiceResponse, InvoiceReadResponse};
use crate::{error::ApiError, AppState};

/// Creates the invoice for a booking, or returns the existing one
///
/// 201 when the invoice was created by this request, 200 when it already
/// existed.
#[instrument(skip(state, payload))]
pub async fn create_invoice(
    State(state): State<AppState>,
    payload: Result<Json<CreateInvoiceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateInvoiceResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    request.validate()?;

    let outcome = state
        .settlement
        .settle(request.booking_id())
        .await
        .map_err(|e| ApiError::from(e).for_environment(&state.config))?;

    let status = if outcome.created {
        info!(invoice_id = %outcome.invoice.id, "Invoice created");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into())))
}

/// Returns the public view of an invoice
#[instrument(skip(state))]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceReadResponse>, ApiError> {
    let id = parse_invoice_id(&id)?;

    let view = state
        .projector
        .project(id)
        .await
        .map_err(|e| ApiError::from(e).for_environment(&state.config))?;

    Ok(Json(view.into()))
}

fn parse_invoice_id(raw: &str) -> Result<InvoiceId, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(InvoiceId::positive)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid invoice id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invoice_id() {
        assert_eq!(parse_invoice_id("17").unwrap(), InvoiceId::new(17));
        assert!(parse_invoice_id("abc").is_err());
        assert!(parse_invoice_id("0").is_err());
        assert!(parse_invoice_id("-4").is_err());
    }
}
