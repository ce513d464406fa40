//! Last known device position.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use devlink_config::LocationFix;
use devlink_protocol::{Payload, Permission};

use super::{CAPABILITY_TARGET, CapabilityError};
use crate::dispatch::RegistryBuilder;

const MODULE: &str = "location";

/// A source of position fixes.
pub trait LocationProvider: Send + Sync {
    /// Provider name for diagnostics.
    fn name(&self) -> &str;

    /// Returns `true` if the provider is switched on.
    fn is_enabled(&self) -> bool;

    /// Most recent fix the provider knows of.
    fn last_known_fix(&self) -> Option<LocationFix>;
}

/// Provider that reports a fixed, configured position.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationProvider {
    fix: Option<LocationFix>,
}

impl FixedLocationProvider {
    /// Reports `fix`, or nothing when it is `None`.
    #[must_use]
    pub fn new(fix: Option<LocationFix>) -> Self {
        Self { fix }
    }
}

impl LocationProvider for FixedLocationProvider {
    fn name(&self) -> &str {
        "configured"
    }

    fn is_enabled(&self) -> bool {
        self.fix.is_some()
    }

    fn last_known_fix(&self) -> Option<LocationFix> {
        self.fix
    }
}

/// Location providers consulted in priority order.
#[derive(Clone, Default)]
pub struct LocationService {
    providers: Vec<Arc<dyn LocationProvider>>,
}

impl LocationService {
    /// Consults `providers` in the given order.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn LocationProvider>>) -> Self {
        Self { providers }
    }

    /// First fix reported by an enabled provider.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Unavailable`] when no enabled provider has a
    /// fix.
    pub fn current_fix(&self) -> Result<LocationFix, CapabilityError> {
        self.providers
            .iter()
            .filter(|provider| provider.is_enabled())
            .find_map(|provider| {
                let fix = provider.last_known_fix()?;
                debug!(
                    target: CAPABILITY_TARGET,
                    provider = provider.name(),
                    "using location fix"
                );
                Some(fix)
            })
            .ok_or_else(|| CapabilityError::unavailable("no location fix available"))
    }
}

pub(crate) fn register(
    builder: RegistryBuilder,
    service: Arc<LocationService>,
) -> RegistryBuilder {
    builder.register(MODULE, "get", Some(Permission::Location), move |_| {
        let fix = service.current_fix()?;
        Ok(Payload::new().with(
            "location",
            json!({
                "lat": fix.lat,
                "lon": fix.lon,
                "accuracy": f64::from(fix.accuracy),
            }),
        ))
    })
}
