//! HTTP API tests over the in-memory adapters

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

use core_kernel::{AdapterHealth, BookingId, HealthCheckResult, HealthCheckable};
use domain_billing::ports::mock::{
    MockCheckinCodePort, MockCommissionSettings, MockDriverNotifier, MockInvoicePort,
    MockLodgingPort, MockTransportPort,
};
use domain_booking::PropertyStatus;
use interface_api::{config::ApiConfig, create_router, AppState, SettlementPorts};
use test_utils::{AmountFixtures, BookingBuilder, PropertyBuilder};

/// Adapter stub that always reports the same status
struct FixedHealth(AdapterHealth);

#[async_trait]
impl HealthCheckable for FixedHealth {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "fixed-health".to_string(),
            status: self.0,
            latency_ms: 0,
            message: Some("connection refused".to_string()),
            checked_at: Utc::now(),
        }
    }
}

struct TestApp {
    server: TestServer,
    lodging: Arc<MockLodgingPort>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_probes(|lodging| vec![lodging])
    }

    fn with_probes(
        probes: impl FnOnce(Arc<dyn HealthCheckable>) -> Vec<Arc<dyn HealthCheckable>>,
    ) -> Self {
        let lodging = Arc::new(MockLodgingPort::new());
        let ports = SettlementPorts {
            lodging: lodging.clone(),
            invoices: Arc::new(MockInvoicePort::new()),
            codes: Arc::new(MockCheckinCodePort::new()),
            transport: Arc::new(MockTransportPort::new()),
            settings: Arc::new(MockCommissionSettings::with_percent(dec!(10))),
            notifier: Arc::new(MockDriverNotifier::new()),
        };
        let probe: Arc<dyn HealthCheckable> = lodging.clone();
        let state = AppState::from_ports(ports, probes(probe), ApiConfig::default());
        let server = TestServer::new(create_router(state)).unwrap();

        Self { server, lodging }
    }

    async fn seed_stay(&self, booking_id: i64, status: PropertyStatus, fare: Option<Decimal>) {
        let property = PropertyBuilder::new().with_id(7).with_status(status).build();
        let mut booking = BookingBuilder::new().with_id(booking_id).for_property(7);
        if let Some(fare) = fare {
            booking = booking.with_transport(fare);
        }
        self.lodging.insert_property(property).await;
        self.lodging.insert_booking(booking.build()).await;
    }
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

mod create_invoice {
    use super::*;

    #[tokio::test]
    async fn test_created_then_existing() {
        let app = TestApp::new();
        app.seed_stay(1, PropertyStatus::Approved, None).await;

        let first = app.server.post("/api/v1/invoices").json(&json!({ "bookingId": 1 })).await;
        assert_eq!(first.status_code(), StatusCode::CREATED);
        let body: Value = first.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["created"], true);
        assert!(body.get("message").is_none());
        assert_eq!(body["status"], "REQUESTED");
        assert_eq!(body["currency"], "TZS");
        assert_eq!(decimal(&body["total"]), dec!(110000));
        assert_eq!(decimal(&body["netPayable"]), AmountFixtures::stay_subtotal());
        assert!(body["paymentRef"].as_str().unwrap().starts_with("PAY-"));
        assert!(body["invoiceNumber"].as_str().unwrap().starts_with("INV-"));

        let second = app.server.post("/api/v1/invoices").json(&json!({ "bookingId": 1 })).await;
        assert_eq!(second.status_code(), StatusCode::OK);
        let again: Value = second.json();
        assert_eq!(again["created"], false);
        assert_eq!(again["message"], "Invoice already exists");
        assert_eq!(again["invoiceId"], body["invoiceId"]);
        assert_eq!(again["paymentRef"], body["paymentRef"]);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_booking_id() {
        let app = TestApp::new();

        let response = app.server.post("/api/v1/invoices").json(&json!({ "bookingId": 0 })).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_rejects_missing_booking_id() {
        let app = TestApp::new();

        let response = app.server.post("/api/v1/invoices").json(&json!({})).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_unknown_booking() {
        let app = TestApp::new();

        let response = app.server.post("/api/v1/invoices").json(&json!({ "bookingId": 404 })).await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_suspended_property_names_its_status() {
        let app = TestApp::new();
        app.seed_stay(2, PropertyStatus::Suspended, None).await;

        let response = app.server.post("/api/v1/invoices").json(&json!({ "bookingId": 2 })).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("SUSPENDED"));
    }
}

mod read_invoice {
    use super::*;

    #[tokio::test]
    async fn test_public_breakdown_hides_commission() {
        let app = TestApp::new();
        app.seed_stay(3, PropertyStatus::Approved, Some(AmountFixtures::transport_fare())).await;
        let created: Value = app
            .server
            .post("/api/v1/invoices")
            .json(&json!({ "bookingId": 3 }))
            .await
            .json();
        let id = created["invoiceId"].as_i64().unwrap();

        let response = app.server.get(&format!("/api/v1/invoices/{}", id)).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        let invoice = &body["invoice"];
        assert_eq!(invoice["bookingId"], json!(BookingId::new(3)));
        assert_eq!(decimal(&invoice["total"]), dec!(130000));

        let breakdown = &invoice["breakdown"];
        assert_eq!(decimal(&breakdown["transportFare"]), dec!(20000));
        assert_eq!(decimal(&breakdown["accommodationSubtotal"]), dec!(110000));
        assert_eq!(decimal(&breakdown["commission"]), Decimal::ZERO);
        assert!(invoice.get("commissionPercent").is_none());
        assert!(invoice.get("netPayable").is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_id() {
        let app = TestApp::new();

        let response = app.server.get("/api/v1/invoices/abc").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_invoice() {
        let app = TestApp::new();

        let response = app.server.get("/api/v1/invoices/99").await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let app = TestApp::new();

        let response = app.server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_when_adapters_healthy() {
        let app = TestApp::new();

        let response = app.server.get("/health/ready").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"][0]["adapter_id"], "mock-lodging-port");
    }

    #[tokio::test]
    async fn test_unavailable_when_an_adapter_is_down() {
        let app = TestApp::with_probes(|lodging| {
            let down: Arc<dyn HealthCheckable> = Arc::new(FixedHealth(AdapterHealth::Unhealthy));
            vec![lodging, down]
        });

        let response = app.server.get("/health/ready").await;

        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_ready_when_notifier_degraded() {
        let app = TestApp::with_probes(|lodging| {
            let degraded: Arc<dyn HealthCheckable> = Arc::new(FixedHealth(AdapterHealth::Degraded));
            vec![lodging, degraded]
        });

        let response = app.server.get("/health/ready").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"][1]["status"], "degraded");
    }
}
