//! Battery charge reporting.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use devlink_protocol::Payload;

use super::CapabilityError;
use crate::dispatch::RegistryBuilder;

const MODULE: &str = "battery";
const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Reports the battery charge.
pub trait BatteryGauge: Send + Sync {
    /// Charge as a percentage in `0..=100`.
    fn level(&self) -> Result<u8, CapabilityError>;
}

/// Reads the first battery listed under the Linux power supply class.
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    root: PathBuf,
}

impl Default for SysfsBattery {
    fn default() -> Self {
        Self::new(POWER_SUPPLY_ROOT)
    }
}

impl SysfsBattery {
    /// Reads supplies beneath `root` instead of the system location.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BatteryGauge for SysfsBattery {
    fn level(&self) -> Result<u8, CapabilityError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|_| CapabilityError::unavailable("no power supply information"))?;
        let mut supplies: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect();
        supplies.sort();

        supplies
            .iter()
            .filter(|supply| {
                fs::read_to_string(supply.join("type"))
                    .is_ok_and(|kind| kind.trim().eq_ignore_ascii_case("battery"))
            })
            .find_map(|supply| {
                fs::read_to_string(supply.join("capacity"))
                    .ok()
                    .and_then(|capacity| capacity.trim().parse::<u8>().ok())
            })
            .map(|level| level.min(100))
            .ok_or_else(|| CapabilityError::unavailable("no battery reported by the host"))
    }
}

pub(crate) fn register(builder: RegistryBuilder, gauge: Arc<dyn BatteryGauge>) -> RegistryBuilder {
    builder.register(MODULE, "level", None, move |_| {
        let level = gauge.level()?.min(100);
        Ok(Payload::new().with("level", level))
    })
}
