//! Command-line and environment layer.
//!
//! Every flag can also be supplied through a `DEVLINK_*` environment
//! variable. Flags win over environment values, and both win over the file.

use camino::Utf8PathBuf;
use clap::Parser;
use devlink_protocol::Permission;

use crate::Config;
use crate::logging::LogFormat;
use crate::policy::PromptPolicy;

#[derive(Debug, Parser)]
#[command(
    name = "devlinkd",
    version,
    about = "Expose local device capabilities to a remote controller"
)]
pub(crate) struct ConfigArgs {
    /// Path to a TOML configuration file.
    #[arg(long, env = "DEVLINK_CONFIG_PATH", value_name = "PATH")]
    pub(crate) config_path: Option<Utf8PathBuf>,
    /// Controller address (ws, wss, http, https, xps or xpss URL).
    #[arg(long, env = "DEVLINK_ADDRESS", value_name = "URL")]
    address: Option<String>,
    /// Application identity sent in the hello message.
    #[arg(long, env = "DEVLINK_APP_ID")]
    app_id: Option<String>,
    /// Sandbox directory for files and recordings.
    #[arg(long, env = "DEVLINK_DATA_DIR", value_name = "DIR")]
    data_dir: Option<Utf8PathBuf>,
    /// Tracing filter expression.
    #[arg(long, env = "DEVLINK_LOG_FILTER", value_name = "FILTER")]
    log_filter: Option<String>,
    /// Log output format (json or compact).
    #[arg(long, env = "DEVLINK_LOG_FORMAT", value_name = "FORMAT")]
    log_format: Option<LogFormat>,
    /// Seconds allowed for the connection handshake.
    #[arg(long, env = "DEVLINK_CONNECT_TIMEOUT_SECS", value_name = "SECS")]
    connect_timeout_secs: Option<u64>,
    /// Seconds before an unanswered permission ask resolves as denied.
    #[arg(long, env = "DEVLINK_PERMISSION_TIMEOUT_SECS", value_name = "SECS")]
    permission_timeout_secs: Option<u64>,
    /// Permissions granted up front (comma separated). A bare `--grant`
    /// clears the list from the file.
    #[arg(
        long = "grant",
        env = "DEVLINK_GRANT",
        value_delimiter = ',',
        num_args = 0..,
        value_name = "PERMISSION"
    )]
    granted_permissions: Option<Vec<Permission>>,
    /// Answer for permission asks that were not granted up front.
    #[arg(long, env = "DEVLINK_PROMPT_POLICY", value_name = "POLICY")]
    prompt_policy: Option<PromptPolicy>,
}

impl ConfigArgs {
    /// Overlays the explicitly supplied values onto `config`.
    pub(crate) fn apply(self, config: &mut Config) {
        if let Some(address) = self.address {
            config.address = Some(address);
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
    }
}
