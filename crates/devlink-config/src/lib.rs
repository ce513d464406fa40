//! Layered configuration for the device bridge.
//!
//! Values are resolved in increasing precedence: built-in defaults, a TOML
//! file, `DEVLINK_*` environment variables, and command-line flags. The file
//! is chosen with `--config-path` (or `DEVLINK_CONFIG_PATH`); without it the
//! bridge reads `devlink/devlink.toml` from the user configuration directory
//! when that file exists.
//!
//! ```toml
//! address = "ws://192.168.0.105:3000"
//! app_id = "com.example.devlink"
//! granted_permissions = ["location", "camera"]
//! prompt_policy = "deny"
//!
//! [location]
//! lat = 51.5
//! lon = -0.12
//! accuracy = 12.0
//! ```

mod args;
mod defaults;
mod errors;
mod file;
mod logging;
mod policy;

use std::ffi::OsString;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use serde::{Deserialize, Serialize};

pub use defaults::{
    CONFIG_FILE_NAME, DEFAULT_APP_ID, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_LOG_FILTER,
    DEFAULT_PERMISSION_TIMEOUT_SECS, default_config_path, default_data_dir, default_log_filter,
    default_log_format,
};
pub use devlink_protocol::Permission;
pub use errors::ConfigError;
pub use logging::LogFormat;
pub use policy::{LocationFix, PromptPolicy};

use args::ConfigArgs;
use file::FileConfig;

/// Resolved bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Controller address to connect to.
    pub address: Option<String>,
    /// Application identity advertised in the hello message.
    pub app_id: String,
    /// Sandbox directory for filesystem commands and recordings.
    pub data_dir: Utf8PathBuf,
    /// Tracing filter expression.
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Seconds allowed for the connection handshake.
    pub connect_timeout_secs: u64,
    /// Seconds before an unanswered permission ask resolves as denied.
    pub permission_timeout_secs: u64,
    /// Permissions treated as granted from startup.
    pub granted_permissions: Vec<Permission>,
    /// Answer for asks about permissions not granted up front.
    pub prompt_policy: PromptPolicy,
    /// Position reported by the configured location provider.
    pub location: Option<LocationFix>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: None,
            app_id: DEFAULT_APP_ID.to_owned(),
            data_dir: default_data_dir(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            permission_timeout_secs: DEFAULT_PERMISSION_TIMEOUT_SECS,
            granted_permissions: Vec::new(),
            prompt_policy: PromptPolicy::default(),
            location: None,
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when flags cannot be parsed or the selected
    /// configuration file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is the program name, as with [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when flags cannot be parsed or the selected
    /// configuration file cannot be read or parsed.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = ConfigArgs::try_parse_from(args)?;
        let mut config = Self::default();
        if let Some(file) = FileConfig::discover(args.config_path.as_deref())? {
            file.apply(&mut config);
        }
        args.apply(&mut config);
        Ok(config)
    }

    /// Controller address, if configured.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Application identity advertised to controllers.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Sandbox directory for files and recordings.
    #[must_use]
    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Handshake budget.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Lifetime of an unanswered permission ask.
    #[must_use]
    pub fn permission_timeout(&self) -> Duration {
        Duration::from_secs(self.permission_timeout_secs)
    }
}
