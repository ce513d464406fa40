//! Static two-level lookup table from module and action to handler.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use devlink_protocol::{Params, Payload, Permission};

use super::errors::DispatchError;
use crate::capabilities::CapabilityError;

/// Outcome of a capability handler.
pub type HandlerResult = Result<Payload, CapabilityError>;

type Handler = Arc<dyn Fn(&Params) -> HandlerResult + Send + Sync>;

/// A handler together with the permission that guards it.
#[derive(Clone)]
pub struct Registration {
    permission: Option<Permission>,
    handler: Handler,
}

impl Registration {
    /// Permission that must be granted before the handler runs.
    #[must_use]
    pub fn permission(&self) -> Option<Permission> {
        self.permission
    }

    /// Runs the handler.
    pub fn invoke(&self, params: &Params) -> HandlerResult {
        (self.handler)(params)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

/// Immutable catalogue of supported commands.
///
/// Lookups are case-sensitive. The registry is never modified after
/// [`RegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    modules: HashMap<String, HashMap<String, Registration>>,
}

impl CapabilityRegistry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Finds the registration for `module` and `action`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownModule`] or
    /// [`DispatchError::UnknownAction`] when nothing matches.
    pub fn lookup(&self, module: &str, action: &str) -> Result<&Registration, DispatchError> {
        let actions = self
            .modules
            .get(module)
            .ok_or_else(|| DispatchError::unknown_module(module))?;
        actions
            .get(action)
            .ok_or_else(|| DispatchError::unknown_action(module, action))
    }

    /// Number of registered module and action pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Collects registrations before freezing them into a [`CapabilityRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    modules: HashMap<String, HashMap<String, Registration>>,
    duplicate: Option<(String, String)>,
}

impl RegistryBuilder {
    /// Registers `handler` for `module` and `action`.
    #[must_use]
    pub fn register<F>(
        mut self,
        module: &str,
        action: &str,
        permission: Option<Permission>,
        handler: F,
    ) -> Self
    where
        F: Fn(&Params) -> HandlerResult + Send + Sync + 'static,
    {
        let registration = Registration {
            permission,
            handler: Arc::new(handler),
        };
        match self
            .modules
            .entry(module.to_owned())
            .or_default()
            .entry(action.to_owned())
        {
            Entry::Vacant(slot) => {
                slot.insert(registration);
            }
            Entry::Occupied(_) => {
                self.duplicate
                    .get_or_insert_with(|| (module.to_owned(), action.to_owned()));
            }
        }
        self
    }

    /// Freezes the registrations.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateRegistration`] naming the first pair
    /// that was registered twice.
    pub fn build(self) -> Result<CapabilityRegistry, DispatchError> {
        if let Some((module, action)) = self.duplicate {
            return Err(DispatchError::duplicate_registration(module, action));
        }
        Ok(CapabilityRegistry {
            modules: self.modules,
        })
    }
}
