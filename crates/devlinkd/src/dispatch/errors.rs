//! Error types for command routing and permission handling.
//!
//! Every variant is rendered into the `error` field of a response; none of
//! them terminates the session.

use thiserror::Error;

use devlink_protocol::Permission;

use crate::capabilities::CapabilityError;

/// Errors surfaced while routing a command to its handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No capability group is registered under the module name.
    #[error("unknown module: {module}")]
    UnknownModule {
        /// Module requested by the controller.
        module: String,
    },

    /// The module exists but does not offer the action.
    #[error("unknown action '{action}' for module '{module}'")]
    UnknownAction {
        /// Module requested by the controller.
        module: String,
        /// Action requested by the controller.
        action: String,
    },

    /// Two handlers were registered for the same module and action.
    #[error("duplicate registration for {module}.{action}")]
    DuplicateRegistration {
        /// Module of the clashing registration.
        module: String,
        /// Action of the clashing registration.
        action: String,
    },

    /// The permission authority refused the request.
    #[error("permission denied: {permission}")]
    PermissionDenied {
        /// Permission that was refused.
        permission: Permission,
    },

    /// The permission authority never answered.
    #[error("permission request timed out: {permission}")]
    PermissionTimedOut {
        /// Permission whose ask expired.
        permission: Permission,
    },

    /// The handler reported a fault.
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// The handler panicked.
    #[error("handler for {module}.{action} panicked")]
    HandlerPanicked {
        /// Module of the failed handler.
        module: String,
        /// Action of the failed handler.
        action: String,
    },
}

impl DispatchError {
    /// Creates an unknown module error.
    pub fn unknown_module(module: impl Into<String>) -> Self {
        Self::UnknownModule {
            module: module.into(),
        }
    }

    /// Creates an unknown action error.
    pub fn unknown_action(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnknownAction {
            module: module.into(),
            action: action.into(),
        }
    }

    /// Creates a duplicate registration error.
    pub fn duplicate_registration(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            module: module.into(),
            action: action.into(),
        }
    }

    /// Creates a permission denied error.
    pub fn permission_denied(permission: Permission) -> Self {
        Self::PermissionDenied { permission }
    }

    /// Creates a permission timeout error.
    pub fn permission_timed_out(permission: Permission) -> Self {
        Self::PermissionTimedOut { permission }
    }

    /// Creates a handler panic error.
    pub fn handler_panicked(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self::HandlerPanicked {
            module: module.into(),
            action: action.into(),
        }
    }
}
