//! Permission decisions for a headless host.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use devlink_config::{Config, Permission, PromptPolicy};

use crate::dispatch::{GATE_TARGET, PermissionAuthority, PermissionResponder};

/// Answers permission asks from configuration instead of prompting a user.
///
/// Permissions listed in `granted_permissions` start granted. Other asks are
/// answered according to the prompt policy and grants are remembered for the
/// rest of the process.
#[derive(Debug)]
pub struct PolicyAuthority {
    granted: Mutex<HashSet<Permission>>,
    policy: PromptPolicy,
}

impl PolicyAuthority {
    /// Starts with `granted` and answers other asks with `policy`.
    #[must_use]
    pub fn new(granted: impl IntoIterator<Item = Permission>, policy: PromptPolicy) -> Self {
        Self {
            granted: Mutex::new(granted.into_iter().collect()),
            policy,
        }
    }

    /// Builds the authority described by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.granted_permissions.iter().copied(),
            config.prompt_policy,
        )
    }

    fn granted(&self) -> MutexGuard<'_, HashSet<Permission>> {
        self.granted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PermissionAuthority for PolicyAuthority {
    fn is_granted(&self, permission: Permission) -> bool {
        self.granted().contains(&permission)
    }

    fn request(&self, permission: Permission, responder: PermissionResponder) {
        info!(
            target: GATE_TARGET,
            permission = %permission,
            policy = %self.policy,
            "answering permission ask from policy"
        );
        match self.policy {
            PromptPolicy::Grant => {
                self.granted().insert(permission);
                responder.grant();
            }
            PromptPolicy::Deny => responder.deny(),
        }
    }
}
