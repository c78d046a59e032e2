//! Commission resolution
//!
//! A property may override the platform commission through its services
//! object. Without an override the global settings record applies. Resolution
//! never fails: a broken settings read yields zero commission so invoicing is
//! never blocked by it.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use core_kernel::Percentage;
use domain_booking::Property;

use crate::ports::CommissionSettingsPort;

/// Resolves the commission percent for a property
pub struct CommissionResolver {
    settings: Arc<dyn CommissionSettingsPort>,
    default_percent: Percentage,
}

impl CommissionResolver {
    /// `default_percent` seeds the settings record the first time it is read
    pub fn new(settings: Arc<dyn CommissionSettingsPort>, default_percent: Percentage) -> Self {
        Self {
            settings,
            default_percent,
        }
    }

    /// Per-property override, else the global percent, else zero
    #[instrument(skip(self, property), fields(property_id = %property.id))]
    pub async fn resolve(&self, property: &Property) -> Percentage {
        if let Some(percent) = property.services.commission_override() {
            debug!(%percent, "Using property commission override");
            return percent;
        }

        match self.settings.global_commission_percent(self.default_percent).await {
            Ok(raw) => Percentage::clamped(raw),
            Err(err) => {
                warn!(error = %err, "Global commission unavailable, applying none");
                Percentage::ZERO
            }
        }
    }
}
