use camino::Utf8PathBuf;
use std::env;

use dirs::{config_dir, data_dir};

/// Application identity advertised to controllers by default.
pub const DEFAULT_APP_ID: &str = "devlink";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Seconds allowed for the transport handshake.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Seconds a permission ask may stay unanswered before it resolves as denied.
pub const DEFAULT_PERMISSION_TIMEOUT_SECS: u64 = 60;

/// File name looked up in the user configuration directory.
pub const CONFIG_FILE_NAME: &str = "devlink.toml";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Computes the default sandbox directory for files and recordings.
#[must_use]
pub fn default_data_dir() -> Utf8PathBuf {
    let mut base = data_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .unwrap_or_else(fallback_base_directory);
    base.push("devlink");
    base
}

/// Location of the configuration file consulted when no path is given.
#[must_use]
pub fn default_config_path() -> Option<Utf8PathBuf> {
    let mut base = config_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok())?;
    base.push("devlink");
    base.push(CONFIG_FILE_NAME);
    Some(base)
}

fn fallback_base_directory() -> Utf8PathBuf {
    let candidate = env::temp_dir();
    Utf8PathBuf::from_path_buf(candidate).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}
