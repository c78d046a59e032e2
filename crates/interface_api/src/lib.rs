//! HTTP API Layer
//!
//! Public REST surface of the settlement pipeline, built on Axum.
//!
//! # Routes
//!
//! - `POST /api/v1/invoices`: settle a booking into its invoice
//! - `GET /api/v1/invoices/:id`: public invoice view with price breakdown
//! - `GET /health`, `GET /health/ready`: liveness and readiness probes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, SettlementPorts};
//!
//! let state = AppState::from_ports(ports, probes, config);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_billing::pricing::percentage_or_zero;
use domain_billing::{
    CheckinCodeGenerator, CheckinCodePort, CommissionResolver, CommissionSettingsPort,
    DriverNotifier, InvoicePort, InvoiceProjector, LodgingPort, SettlementService,
    TransportActivationService, TransportPort,
};

use crate::config::ApiConfig;
use crate::handlers::{health, invoices};
use crate::middleware::audit_middleware;

/// The adapters the settlement services run on
#[derive(Clone)]
pub struct SettlementPorts {
    pub lodging: Arc<dyn LodgingPort>,
    pub invoices: Arc<dyn InvoicePort>,
    pub codes: Arc<dyn CheckinCodePort>,
    pub transport: Arc<dyn TransportPort>,
    pub settings: Arc<dyn CommissionSettingsPort>,
    pub notifier: Arc<dyn DriverNotifier>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settlement: Arc<SettlementService>,
    pub projector: Arc<InvoiceProjector>,
    /// Checked by the readiness probe
    pub probes: Arc<Vec<Arc<dyn HealthCheckable>>>,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the settlement services over the given adapters
    pub fn from_ports(
        ports: SettlementPorts,
        probes: Vec<Arc<dyn HealthCheckable>>,
        config: ApiConfig,
    ) -> Self {
        let default_commission = percentage_or_zero(config.default_commission_percent);

        let activation = Arc::new(TransportActivationService::new(
            ports.lodging.clone(),
            ports.transport.clone(),
            ports.notifier,
        ));
        let settlement = SettlementService::new(
            ports.lodging.clone(),
            ports.invoices.clone(),
            CheckinCodeGenerator::new(ports.codes),
            CommissionResolver::new(ports.settings, default_commission),
            activation.clone(),
        );
        let projector = InvoiceProjector::new(ports.invoices, ports.lodging, ports.transport, activation);

        Self {
            settlement: Arc::new(settlement),
            projector: Arc::new(projector),
            probes: Arc::new(probes),
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let invoice_routes = Router::new()
        .route("/", post(invoices::create_invoice))
        .route("/:id", get(invoices::get_invoice));

    let api_routes = Router::new()
        .nest("/invoices", invoice_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
