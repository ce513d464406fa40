//! Vibration motor control.

use std::sync::Arc;
use std::time::Duration;

use devlink_protocol::Payload;

use super::CapabilityError;
use crate::dispatch::RegistryBuilder;
use crate::dispatch::params::ParamReader;

const MODULE: &str = "vibrate";
const DEFAULT_DURATION_MS: u64 = 200;
const DEFAULT_PATTERN_STEP_MS: u64 = 100;

/// Drives the device's vibration motor.
pub trait Vibrator: Send + Sync {
    /// Vibrates once for `duration`.
    fn vibrate(&self, duration: Duration) -> Result<(), CapabilityError>;

    /// Plays alternating off/on durations, starting with a delay.
    fn play_pattern(&self, pattern: &[Duration]) -> Result<(), CapabilityError>;

    /// Stops any ongoing vibration.
    fn cancel(&self) -> Result<(), CapabilityError>;
}

pub(crate) fn register(builder: RegistryBuilder, vibrator: Arc<dyn Vibrator>) -> RegistryBuilder {
    let single = Arc::clone(&vibrator);
    let pattern = Arc::clone(&vibrator);
    builder
        .register(MODULE, "vibrate", None, move |params| {
            let millis = params.millis_or("duration", DEFAULT_DURATION_MS)?;
            single.vibrate(Duration::from_millis(millis))?;
            Ok(Payload::new())
        })
        .register(MODULE, "pattern", None, move |params| {
            let steps: Vec<Duration> = params
                .millis_list("pattern", DEFAULT_PATTERN_STEP_MS)?
                .into_iter()
                .map(Duration::from_millis)
                .collect();
            pattern.play_pattern(&steps)?;
            Ok(Payload::new())
        })
        .register(MODULE, "cancel", None, move |_| {
            vibrator.cancel()?;
            Ok(Payload::new())
        })
}
