//! Workstation implementations of the device providers.
//!
//! A desktop host has no vibration motor, SMS modem or camera flash, so
//! those providers log the request and report success. Files, battery,
//! location and device identity are backed by real host data.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use tracing::info;

use devlink_config::Config;

use super::{
    AudioRecorder, CAPABILITY_TARGET, Capabilities, CapabilityError, DeviceInfo,
    DeviceInfoSource, FixedLocationProvider, LocationService, Notifier, RecorderSlot,
    SandboxFileStore, SmsSender, SysfsBattery, Toaster, Torch, Vibrator,
};

/// Builds the capability set for the local workstation.
///
/// # Errors
///
/// Returns [`CapabilityError::Io`] when the data directory cannot be opened.
pub fn workstation(config: &Config) -> Result<Capabilities, CapabilityError> {
    let files = SandboxFileStore::open(config.data_dir())?;
    let recordings = files.root().to_path_buf();
    let logged = Arc::new(LoggedPeripherals::default());
    let location = LocationService::new(vec![Arc::new(FixedLocationProvider::new(
        config.location,
    ))]);

    Ok(Capabilities {
        vibrator: logged.clone(),
        toaster: logged.clone(),
        notifier: logged.clone(),
        files: Arc::new(files),
        battery: Arc::new(SysfsBattery::default()),
        location: Arc::new(location),
        sms: logged.clone(),
        torch: logged,
        recorder: Arc::new(RecorderSlot::new(Arc::new(PlaceholderRecorder), recordings)),
        device: Arc::new(HostDeviceInfo::new(config.app_id())),
    })
}

/// Peripherals the workstation lacks; requests are logged.
#[derive(Debug, Default)]
pub struct LoggedPeripherals {
    next_notification: AtomicU32,
    torch_on: AtomicBool,
}

impl Vibrator for LoggedPeripherals {
    fn vibrate(&self, duration: Duration) -> Result<(), CapabilityError> {
        info!(target: CAPABILITY_TARGET, duration = ?duration, "vibrate");
        Ok(())
    }

    fn play_pattern(&self, pattern: &[Duration]) -> Result<(), CapabilityError> {
        let steps: Vec<u128> = pattern.iter().map(Duration::as_millis).collect();
        info!(target: CAPABILITY_TARGET, pattern = ?steps, "vibration pattern");
        Ok(())
    }

    fn cancel(&self) -> Result<(), CapabilityError> {
        info!(target: CAPABILITY_TARGET, "vibration cancelled");
        Ok(())
    }
}

impl Toaster for LoggedPeripherals {
    fn show(&self, message: &str) -> Result<(), CapabilityError> {
        info!(target: CAPABILITY_TARGET, text = message, "toast");
        Ok(())
    }
}

impl Notifier for LoggedPeripherals {
    fn show(&self, title: &str, message: &str) -> Result<u32, CapabilityError> {
        let id = self.next_notification.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        info!(target: CAPABILITY_TARGET, id, title, body = message, "notification");
        Ok(id)
    }

    fn clear_all(&self) -> Result<(), CapabilityError> {
        info!(target: CAPABILITY_TARGET, "notifications cleared");
        Ok(())
    }
}

impl SmsSender for LoggedPeripherals {
    fn send(&self, to: &str, body: &str) -> Result<(), CapabilityError> {
        info!(target: CAPABILITY_TARGET, to, bytes = body.len(), "sms");
        Ok(())
    }
}

impl Torch for LoggedPeripherals {
    fn set_enabled(&self, enabled: bool) -> Result<(), CapabilityError> {
        let previous = self.torch_on.swap(enabled, Ordering::Relaxed);
        info!(target: CAPABILITY_TARGET, enabled, previous, "torch");
        Ok(())
    }
}

/// Recorder that allocates the output file without capturing audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderRecorder;

impl AudioRecorder for PlaceholderRecorder {
    fn start(&self, output: &Path) -> Result<(), CapabilityError> {
        fs::write(output, b"").map_err(|error| CapabilityError::io(&error))
    }

    fn stop(&self) -> Result<(), CapabilityError> {
        Ok(())
    }
}

/// Device identity gathered from DMI and kernel data.
#[derive(Debug, Clone)]
pub struct HostDeviceInfo {
    app_name: String,
    dmi_root: PathBuf,
    os_release: PathBuf,
}

impl HostDeviceInfo {
    /// Reports `app_name` alongside the host's identity.
    #[must_use]
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            dmi_root: PathBuf::from("/sys/class/dmi/id"),
            os_release: PathBuf::from("/proc/sys/kernel/osrelease"),
        }
    }

    fn dmi(&self, field: &str) -> String {
        read_trimmed(&self.dmi_root.join(field)).unwrap_or_else(|| "unknown".to_owned())
    }
}

impl DeviceInfoSource for HostDeviceInfo {
    fn info(&self) -> Result<DeviceInfo, CapabilityError> {
        let os_version = read_trimmed(&self.os_release).unwrap_or_default();
        let sdk_int = os_version
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .and_then(|major| major.parse().ok())
            .unwrap_or(0);
        Ok(DeviceInfo {
            model: self.dmi("product_name"),
            manufacturer: self.dmi("sys_vendor"),
            os: std::env::consts::OS.to_owned(),
            os_version,
            sdk_int,
            app_name: self.app_name.clone(),
        })
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn notification_ids_increase() {
        let peripherals = LoggedPeripherals::default();
        let first = Notifier::show(&peripherals, "a", "b").expect("show");
        let second = Notifier::show(&peripherals, "a", "b").expect("show");
        assert!(second > first);
    }

    #[test]
    fn kernel_major_version_becomes_sdk_level() {
        let temp = TempDir::new().expect("temporary directory");
        let release = temp.path().join("osrelease");
        fs::write(&release, "6.8.0-45-generic\n").expect("write release");
        let source = HostDeviceInfo {
            app_name: "devlink".into(),
            dmi_root: temp.path().join("absent"),
            os_release: release,
        };
        let info = source.info().expect("info");
        assert_eq!(info.sdk_int, 6);
        assert_eq!(info.os_version, "6.8.0-45-generic");
        assert_eq!(info.model, "unknown");
    }

    #[test]
    fn workstation_capabilities_register_every_module() {
        let temp = TempDir::new().expect("temporary directory");
        let data_dir = Utf8PathBuf::from_path_buf(temp.path().join("data"))
            .expect("temporary path is UTF-8");
        let config = Config {
            data_dir,
            ..Config::default()
        };
        let registry = workstation(&config)
            .expect("workstation capabilities")
            .registry()
            .expect("registry");
        for (module, action) in [
            ("vibrate", "pattern"),
            ("toast", "show"),
            ("notify", "clear"),
            ("filesystem", "read"),
            ("battery", "level"),
            ("location", "get"),
            ("sms", "send"),
            ("torch", "off"),
            ("recorder", "stop"),
            ("device", "info"),
        ] {
            assert!(registry.lookup(module, action).is_ok(), "{module}.{action}");
        }
        assert_eq!(registry.len(), 16);
    }
}
