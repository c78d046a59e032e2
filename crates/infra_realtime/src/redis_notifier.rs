//! Redis-backed driver notifier

use async_trait::async_trait;
use chrono::Utc;
use redis::{aio::ConnectionManager, Client};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_billing::{DriverNotifier, TripAvailableEvent};

use crate::error::RealtimeError;

/// Connection attempts per open, backing off from 200ms
const CONNECT_RETRIES: usize = 2;

/// Publishes trip events as JSON to a Redis channel
///
/// The connection is opened on first use, so the notifier can be built
/// while Redis is down. Once established, the connection manager
/// reconnects on its own.
#[derive(Clone)]
pub struct RedisDriverNotifier {
    client: Client,
    manager: Arc<OnceCell<ConnectionManager>>,
}

impl RedisDriverNotifier {
    /// Validates the URL without touching the network
    pub fn new(url: &str) -> Result<Self, RealtimeError> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            manager: Arc::new(OnceCell::new()),
        })
    }

    /// Builds the notifier and tries to connect straight away
    ///
    /// A failed first connection is logged and retried on the next
    /// publish or health check.
    pub async fn connect(url: &str) -> Result<Self, RealtimeError> {
        let notifier = Self::new(url)?;
        match notifier.connection().await {
            Ok(_) => info!("Connected to Redis"),
            Err(e) => warn!(error = %e, "Redis unavailable, trip fan-out degraded"),
        }
        Ok(notifier)
    }

    pub fn is_connected(&self) -> bool {
        self.manager.initialized()
    }

    async fn connection(&self) -> Result<ConnectionManager, RealtimeError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                debug!("Opening Redis connection");
                self.client
                    .get_connection_manager_with_backoff(2, 100, CONNECT_RETRIES)
                    .await
            })
            .await?;
        Ok(manager.clone())
    }

    async fn publish_json(&self, channel: &str, payload: String) -> Result<i64, RealtimeError> {
        let mut conn = self.connection().await?;
        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(channel)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(receivers)
    }

    async fn ping(&self) -> Result<(), RealtimeError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Encodes an event for the wire
pub fn encode_event(event: &TripAvailableEvent) -> Result<String, RealtimeError> {
    Ok(serde_json::to_string(event)?)
}

impl DomainPort for RedisDriverNotifier {}

#[async_trait]
impl DriverNotifier for RedisDriverNotifier {
    #[instrument(skip(self, event), fields(trip_id = %event.trip_id))]
    async fn publish(&self, channel: &str, event: &TripAvailableEvent) -> Result<(), PortError> {
        let payload = encode_event(event)?;
        let receivers = self.publish_json(channel, payload).await?;
        debug!(receivers, "Trip event published");
        Ok(())
    }
}

/// Redis only carries best-effort fan-out, so an outage reports
/// `Degraded` rather than taking the service out of rotation.
#[async_trait]
impl HealthCheckable for RedisDriverNotifier {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = self.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(()) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Degraded, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: "redis-driver-notifier".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}
