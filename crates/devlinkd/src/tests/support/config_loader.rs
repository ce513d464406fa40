//! Configuration loaders and host doubles for bootstrap tests.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use devlink_config::{Config, ConfigError};

use crate::bootstrap::{BridgeHost, ConfigLoader};
use crate::capabilities::{Capabilities, CapabilityError};
use crate::dispatch::PermissionAuthority;

use super::{FakeDevice, ScriptedAuthority};

/// Loader that points the data directory at a temporary directory.
pub struct TestConfigLoader {
    data_dir: TempDir,
    address: Option<String>,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().expect("failed to create temporary data directory"),
            address: None,
        }
    }

    /// Configures the controller address.
    #[must_use]
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_owned());
        self
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        let data_dir = Utf8PathBuf::from_path_buf(self.data_dir.path().to_path_buf())
            .expect("temporary data directory was not valid UTF-8");
        Ok(Config {
            address: self.address.clone(),
            data_dir,
            ..Config::default()
        })
    }
}

/// Loader that fails by passing an unknown permission on the command line.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        let args = vec![
            OsString::from("devlinkd"),
            OsString::from("--grant"),
            OsString::from("telepathy"),
        ];
        Config::load_from_iter(args)
    }
}

/// Host whose providers are a [`FakeDevice`] and a [`ScriptedAuthority`].
#[derive(Default)]
pub struct TestHost {
    pub device: Arc<FakeDevice>,
    pub authority: Arc<ScriptedAuthority>,
}

impl BridgeHost for TestHost {
    fn capabilities(&self, config: &Config) -> Result<Capabilities, CapabilityError> {
        Ok(self.device.capabilities(config.data_dir()))
    }

    fn authority(&self, _config: &Config) -> Arc<dyn PermissionAuthority> {
        self.authority.clone()
    }
}
