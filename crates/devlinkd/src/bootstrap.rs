//! Bridge bootstrap orchestration.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use devlink_config::{Config, ConfigError};
use devlink_protocol::{Hello, ResponseEnvelope};

use crate::authority::PolicyAuthority;
use crate::capabilities::{self, Capabilities, CapabilityError, Toaster};
use crate::dispatch::{DispatchError, Dispatcher, PermissionAuthority, PermissionGate};
use crate::health::HealthReporter;
use crate::session::{Connector, Session};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the bridge configuration.
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load()
    }
}

/// Loader that always yields the same configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.config.clone())
    }
}

/// Supplies the device-specific collaborators.
pub trait BridgeHost: Send + Sync {
    /// Builds the capability providers.
    fn capabilities(&self, config: &Config) -> Result<Capabilities, CapabilityError>;

    /// Builds the permission authority.
    fn authority(&self, config: &Config) -> Arc<dyn PermissionAuthority>;
}

/// Host backed by the local workstation and configured permission policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkstationHost;

impl BridgeHost for WorkstationHost {
    fn capabilities(&self, config: &Config) -> Result<Capabilities, CapabilityError> {
        capabilities::host::workstation(config)
    }

    fn authority(&self, config: &Config) -> Arc<dyn PermissionAuthority> {
        Arc::new(PolicyAuthority::from_config(config))
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Capability providers could not be created.
    #[error("failed to prepare capabilities: {source}")]
    Capabilities {
        /// Provider error.
        #[source]
        source: CapabilityError,
    },
    /// The capability catalogue is inconsistent.
    #[error("failed to build capability registry: {source}")]
    Registry {
        /// Registry error.
        #[source]
        source: DispatchError,
    },
}

/// Result of a successful bootstrap: everything needed to open a session.
pub struct Bridge {
    config: Config,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
    dispatcher: Dispatcher,
    deferred: UnboundedReceiver<ResponseEnvelope>,
    toaster: Arc<dyn Toaster>,
}

impl Bridge {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// The dispatcher that will serve the session.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Identification sent when a session opens.
    #[must_use]
    pub fn identity(&self) -> Hello {
        Hello::new(std::env::consts::OS, self.config.app_id())
    }

    /// Hands the bridge to a session that dials through `connector`.
    #[must_use]
    pub fn into_session<C: Connector>(self, connector: C) -> Session<C> {
        let identity = self.identity();
        let timeout = self.config.connect_timeout();
        Session::new(connector, self.dispatcher, self.deferred, identity)
            .with_toaster(self.toaster)
            .with_reporter(self.reporter)
            .with_connect_timeout(timeout)
    }
}

/// Bootstraps the bridge using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration, telemetry, providers or the
/// registry cannot be prepared. The failure is also reported to `reporter`.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    host: &dyn BridgeHost,
) -> Result<Bridge, BootstrapError> {
    reporter.bootstrap_starting();
    match assemble(loader, host) {
        Ok((config, telemetry, dispatcher, deferred, toaster)) => {
            reporter.bootstrap_succeeded(&config);
            Ok(Bridge {
                config,
                telemetry,
                reporter,
                dispatcher,
                deferred,
                toaster,
            })
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

type Assembled = (
    Config,
    TelemetryHandle,
    Dispatcher,
    UnboundedReceiver<ResponseEnvelope>,
    Arc<dyn Toaster>,
);

fn assemble(loader: &dyn ConfigLoader, host: &dyn BridgeHost) -> Result<Assembled, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    let capabilities = host
        .capabilities(&config)
        .map_err(|source| BootstrapError::Capabilities { source })?;
    let registry = capabilities
        .registry()
        .map_err(|source| BootstrapError::Registry { source })?;

    let (sink, deferred) = mpsc::unbounded_channel();
    let gate = PermissionGate::new(
        host.authority(&config),
        Arc::new(sink),
        config.permission_timeout(),
    );
    let dispatcher = Dispatcher::new(registry, gate);
    Ok((
        config,
        telemetry,
        dispatcher,
        deferred,
        capabilities.toaster,
    ))
}
