//! TOML file layer.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use devlink_protocol::Permission;
use serde::Deserialize;

use crate::defaults::default_config_path;
use crate::errors::ConfigError;
use crate::logging::LogFormat;
use crate::policy::{LocationFix, PromptPolicy};
use crate::Config;

/// Values read from a configuration file. Absent keys keep the lower layer.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    address: Option<String>,
    app_id: Option<String>,
    data_dir: Option<Utf8PathBuf>,
    log_filter: Option<String>,
    log_format: Option<LogFormat>,
    connect_timeout_secs: Option<u64>,
    permission_timeout_secs: Option<u64>,
    granted_permissions: Option<Vec<Permission>>,
    prompt_policy: Option<PromptPolicy>,
    location: Option<LocationFix>,
}

impl FileConfig {
    /// Loads the explicitly named file, or the default file when it exists.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub(crate) fn discover(explicit: Option<&Utf8Path>) -> Result<Option<Self>, ConfigError> {
        match explicit {
            Some(path) => Self::read(path).map(Some),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::read(&path).map(Some),
                _ => Ok(None),
            },
        }
    }

    fn read(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn apply(self, config: &mut Config) {
        if self.address.is_some() {
            config.address = self.address;
        }
        if let Some(app_id) = self.app_id {
            config.app_id = app_id;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(log_filter) = self.log_filter {
            config.log_filter = log_filter;
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout_secs = secs;
        }
        if let Some(secs) = self.permission_timeout_secs {
            config.permission_timeout_secs = secs;
        }
        if let Some(granted) = self.granted_permissions {
            config.granted_permissions = granted;
        }
        if let Some(policy) = self.prompt_policy {
            config.prompt_policy = policy;
        }
        if self.location.is_some() {
            config.location = self.location;
        }
    }
}
