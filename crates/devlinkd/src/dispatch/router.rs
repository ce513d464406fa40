//! Routing of decoded commands to capability handlers.
//!
//! The dispatcher looks the command up in the registry, sends gated commands
//! through the permission gate and runs the handler. Lookup failures, handler
//! faults and handler panics all become error responses here, so nothing a
//! controller sends can abort the session.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};

use devlink_protocol::{CommandEnvelope, Permission, ResponseEnvelope};

use super::errors::DispatchError;
use super::gate::{Gated, PermissionGate};
use super::registry::{CapabilityRegistry, Registration};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Result of routing one command.
#[derive(Debug)]
pub enum Routed {
    /// The command finished and this is its response.
    Immediate(ResponseEnvelope),
    /// The command waits for a permission; its response will arrive through
    /// the gate's response sink.
    Deferred {
        /// Permission being waited on.
        permission: Permission,
    },
}

/// Routes commands through the registry and the permission gate.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    gate: PermissionGate,
}

impl Dispatcher {
    /// Builds a dispatcher over a frozen registry.
    #[must_use]
    pub fn new(registry: CapabilityRegistry, gate: PermissionGate) -> Self {
        Self {
            registry: Arc::new(registry),
            gate,
        }
    }

    /// Routes a command and runs its handler at most once.
    pub fn route(&self, command: CommandEnvelope) -> Routed {
        let registration = match self.registry.lookup(command.module(), command.action()) {
            Ok(registration) => registration.clone(),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    id = command.id(),
                    module = command.module(),
                    action = command.action(),
                    error = %error,
                    "rejecting unroutable command"
                );
                return Routed::Immediate(ResponseEnvelope::failure(&command, error.to_string()));
            }
        };

        debug!(
            target: DISPATCH_TARGET,
            id = command.id(),
            module = command.module(),
            action = command.action(),
            "routing command"
        );

        let Some(permission) = registration.permission() else {
            return Routed::Immediate(execute(&registration, &command));
        };

        match self
            .gate
            .ensure(permission, command, move |command| execute(&registration, command))
        {
            Gated::Ready(response) => Routed::Immediate(response),
            Gated::Deferred => Routed::Deferred { permission },
        }
    }

    /// Settles permission asks that have outlived the gate's timeout.
    pub fn expire_pending(&self, now: Instant) -> usize {
        self.gate.expire_pending(now)
    }

    /// The permission gate used for guarded commands.
    #[must_use]
    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// The command catalogue.
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }
}

fn execute(registration: &Registration, command: &CommandEnvelope) -> ResponseEnvelope {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| registration.invoke(command.params())));
    match outcome {
        Ok(Ok(payload)) => ResponseEnvelope::success(command, payload),
        Ok(Err(fault)) => {
            let error = DispatchError::from(fault);
            warn!(
                target: DISPATCH_TARGET,
                id = command.id(),
                module = command.module(),
                action = command.action(),
                error = %error,
                "handler failed"
            );
            ResponseEnvelope::failure(command, error.to_string())
        }
        Err(_) => {
            let error = DispatchError::handler_panicked(command.module(), command.action());
            error!(
                target: DISPATCH_TARGET,
                id = command.id(),
                error = %error,
                "handler panicked"
            );
            ResponseEnvelope::failure(command, error.to_string())
        }
    }
}
