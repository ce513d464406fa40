//! A fake device implementing every provider and recording each call.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use camino::Utf8Path;

use devlink_config::LocationFix;

use crate::capabilities::{
    AudioRecorder, BatteryGauge, Capabilities, CapabilityError, DeviceInfo, DeviceInfoSource,
    LocationProvider, LocationService, Notifier, RecorderSlot, SandboxFileStore, SmsSender,
    Toaster, Torch, Vibrator,
};

/// Records provider calls as `module.action:arguments` strings.
#[derive(Debug)]
pub struct FakeDevice {
    calls: Mutex<Vec<String>>,
    battery_level: u8,
    fix: Option<LocationFix>,
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            battery_level: 87,
            fix: Some(LocationFix {
                lat: 51.5,
                lon: -0.12,
                accuracy: 12.0,
            }),
        }
    }
}

impl FakeDevice {
    /// Calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("device mutex poisoned").clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls
            .lock()
            .expect("device mutex poisoned")
            .push(call.into());
    }

    /// Capability set backed by this device and a sandbox rooted at
    /// `sandbox`.
    pub fn capabilities(self: &Arc<Self>, sandbox: &Utf8Path) -> Capabilities {
        let files = SandboxFileStore::open(sandbox).expect("open sandbox");
        let recordings = files.root().to_path_buf();
        Capabilities {
            vibrator: self.clone(),
            toaster: self.clone(),
            notifier: self.clone(),
            files: Arc::new(files),
            battery: self.clone(),
            location: Arc::new(LocationService::new(vec![self.clone()])),
            sms: self.clone(),
            torch: self.clone(),
            recorder: Arc::new(RecorderSlot::new(self.clone(), recordings)),
            device: self.clone(),
        }
    }
}

fn millis(durations: &[Duration]) -> String {
    durations
        .iter()
        .map(|duration| duration.as_millis().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl Vibrator for FakeDevice {
    fn vibrate(&self, duration: Duration) -> Result<(), CapabilityError> {
        self.record(format!("vibrate.vibrate:{}", duration.as_millis()));
        Ok(())
    }

    fn play_pattern(&self, pattern: &[Duration]) -> Result<(), CapabilityError> {
        self.record(format!("vibrate.pattern:{}", millis(pattern)));
        Ok(())
    }

    fn cancel(&self) -> Result<(), CapabilityError> {
        self.record("vibrate.cancel");
        Ok(())
    }
}

impl Toaster for FakeDevice {
    fn show(&self, message: &str) -> Result<(), CapabilityError> {
        self.record(format!("toast.show:{message}"));
        Ok(())
    }
}

impl Notifier for FakeDevice {
    fn show(&self, title: &str, message: &str) -> Result<u32, CapabilityError> {
        self.record(format!("notify.show:{title}:{message}"));
        Ok(1)
    }

    fn clear_all(&self) -> Result<(), CapabilityError> {
        self.record("notify.clear");
        Ok(())
    }
}

impl BatteryGauge for FakeDevice {
    fn level(&self) -> Result<u8, CapabilityError> {
        Ok(self.battery_level)
    }
}

impl LocationProvider for FakeDevice {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn last_known_fix(&self) -> Option<LocationFix> {
        self.fix
    }
}

impl SmsSender for FakeDevice {
    fn send(&self, to: &str, body: &str) -> Result<(), CapabilityError> {
        self.record(format!("sms.send:{to}:{body}"));
        Ok(())
    }
}

impl Torch for FakeDevice {
    fn set_enabled(&self, enabled: bool) -> Result<(), CapabilityError> {
        self.record(format!("torch.set:{enabled}"));
        Ok(())
    }
}

impl AudioRecorder for FakeDevice {
    fn start(&self, _output: &Path) -> Result<(), CapabilityError> {
        self.record("recorder.start");
        Ok(())
    }

    fn stop(&self) -> Result<(), CapabilityError> {
        self.record("recorder.stop");
        Ok(())
    }
}

impl DeviceInfoSource for FakeDevice {
    fn info(&self) -> Result<DeviceInfo, CapabilityError> {
        Ok(DeviceInfo {
            model: "Fake".into(),
            manufacturer: "Test".into(),
            os: "test".into(),
            os_version: "1.0".into(),
            sdk_int: 1,
            app_name: "devlink".into(),
        })
    }
}
