//! Binary entry point for the device bridge.

use std::process::ExitCode;

use devlink_config::ConfigError;
use devlinkd::session::SessionEnd;
use devlinkd::{BootstrapError, BridgeError};

#[tokio::main]
async fn main() -> ExitCode {
    match devlinkd::run_bridge().await {
        Ok(SessionEnd::TransportFailed(reason)) => {
            eprintln!("devlinkd: connection lost: {reason}");
            ExitCode::FAILURE
        }
        Ok(SessionEnd::RemoteClosed(_) | SessionEnd::Shutdown) => ExitCode::SUCCESS,
        Err(BridgeError::Bootstrap(BootstrapError::Configuration {
            source: ConfigError::Cli(error),
        })) => error.exit(),
        Err(error) => {
            eprintln!("devlinkd: {error}");
            ExitCode::FAILURE
        }
    }
}
