//! Permission gate for commands that need runtime authorization.
//!
//! A command whose permission is not yet granted is parked as a waiter under
//! the permission's pending request and the authority is asked once. Further
//! commands for the same permission join the queue instead of asking again.
//! When the authority answers through its [`PermissionResponder`], every
//! waiter is settled in arrival order and each response is handed to the
//! [`ResponseSink`]. Asks that stay unanswered for longer than the gate's
//! timeout are settled as timeouts by [`PermissionGate::expire_pending`].
//!
//! The gate never blocks and never holds its lock while calling the
//! authority or running a deferred action, so authorities may answer from
//! inside [`PermissionAuthority::request`].

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use devlink_protocol::{CommandEnvelope, Permission, ResponseEnvelope};

use super::errors::DispatchError;
use super::sink::ResponseSink;

/// Tracing target for permission handling.
pub(crate) const GATE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::gate");

/// Host-side source of permission decisions.
pub trait PermissionAuthority: Send + Sync {
    /// Returns `true` if `permission` is currently granted.
    fn is_granted(&self, permission: Permission) -> bool;

    /// Asks for `permission`. The answer is given through `responder`, either
    /// before returning or later from any thread.
    fn request(&self, permission: Permission, responder: PermissionResponder);
}

/// The authority's answer to an ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// The permission was granted.
    Granted,
    /// The permission was refused.
    Denied,
}

/// Result of passing a command through the gate.
#[derive(Debug)]
pub enum Gated {
    /// The permission was already granted and the action ran.
    Ready(ResponseEnvelope),
    /// The command is waiting for the authority.
    Deferred,
}

/// One-shot handle for answering a permission ask.
///
/// Dropping the responder without answering counts as a denial. Answers for
/// an ask that already timed out are ignored.
pub struct PermissionResponder {
    permission: Permission,
    ticket: u64,
    gate: Weak<GateShared>,
    settled: bool,
}

impl PermissionResponder {
    /// Permission being asked for.
    #[must_use]
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Grants the permission.
    pub fn grant(self) {
        self.resolve(PermissionOutcome::Granted);
    }

    /// Denies the permission.
    pub fn deny(self) {
        self.resolve(PermissionOutcome::Denied);
    }

    /// Answers the ask with `outcome`.
    pub fn resolve(mut self, outcome: PermissionOutcome) {
        self.settled = true;
        self.settle(Resolution::from(outcome));
    }

    fn settle(&self, resolution: Resolution) {
        match self.gate.upgrade() {
            Some(shared) => shared.answer(self.permission, self.ticket, resolution),
            None => debug!(
                target: GATE_TARGET,
                permission = %self.permission,
                "gate gone; ignoring permission answer"
            ),
        }
    }
}

impl Drop for PermissionResponder {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                target: GATE_TARGET,
                permission = %self.permission,
                "permission responder dropped without an answer; denying"
            );
            self.settle(Resolution::Denied);
        }
    }
}

impl fmt::Debug for PermissionResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionResponder")
            .field("permission", &self.permission)
            .field("ticket", &self.ticket)
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}

type DeferredAction = Box<dyn FnOnce(&CommandEnvelope) -> ResponseEnvelope + Send>;

struct Waiter {
    command: CommandEnvelope,
    action: DeferredAction,
}

struct PendingPermission {
    ticket: u64,
    requested_at: Instant,
    waiters: VecDeque<Waiter>,
}

#[derive(Default)]
struct GateState {
    pending: HashMap<Permission, PendingPermission>,
    next_ticket: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Granted,
    Denied,
    TimedOut,
}

impl From<PermissionOutcome> for Resolution {
    fn from(outcome: PermissionOutcome) -> Self {
        match outcome {
            PermissionOutcome::Granted => Self::Granted,
            PermissionOutcome::Denied => Self::Denied,
        }
    }
}

struct GateShared {
    state: Mutex<GateState>,
    sink: Arc<dyn ResponseSink>,
}

impl GateShared {
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer(&self, permission: Permission, ticket: u64, resolution: Resolution) {
        let waiters = {
            let mut state = self.lock();
            let current = state.pending.get(&permission).map(|pending| pending.ticket);
            if current != Some(ticket) {
                debug!(
                    target: GATE_TARGET,
                    permission = %permission,
                    ticket,
                    "ignoring answer for a stale permission request"
                );
                return;
            }
            state
                .pending
                .remove(&permission)
                .map(|pending| pending.waiters)
                .unwrap_or_default()
        };
        self.settle(permission, waiters, resolution);
    }

    fn settle(&self, permission: Permission, waiters: VecDeque<Waiter>, resolution: Resolution) {
        info!(
            target: GATE_TARGET,
            permission = %permission,
            outcome = ?resolution,
            waiters = waiters.len(),
            "permission request settled"
        );
        for Waiter { command, action } in waiters {
            let response = match resolution {
                Resolution::Granted => action(&command),
                Resolution::Denied => ResponseEnvelope::failure(
                    &command,
                    DispatchError::permission_denied(permission).to_string(),
                ),
                Resolution::TimedOut => ResponseEnvelope::failure(
                    &command,
                    DispatchError::permission_timed_out(permission).to_string(),
                ),
            };
            self.sink.deliver(response);
        }
    }
}

/// Parks commands until their permission is granted.
pub struct PermissionGate {
    authority: Arc<dyn PermissionAuthority>,
    shared: Arc<GateShared>,
    timeout: Duration,
}

impl PermissionGate {
    /// Builds a gate that asks `authority` and delivers deferred responses to
    /// `sink`. Asks unanswered after `timeout` are settled as timeouts.
    #[must_use]
    pub fn new(
        authority: Arc<dyn PermissionAuthority>,
        sink: Arc<dyn ResponseSink>,
        timeout: Duration,
    ) -> Self {
        Self {
            authority,
            shared: Arc::new(GateShared {
                state: Mutex::new(GateState::default()),
                sink,
            }),
            timeout,
        }
    }

    /// Runs `on_granted` now if `permission` is granted, otherwise parks the
    /// command until the authority answers.
    ///
    /// A command never overtakes earlier commands still waiting on the same
    /// permission.
    pub fn ensure<F>(&self, permission: Permission, command: CommandEnvelope, on_granted: F) -> Gated
    where
        F: FnOnce(&CommandEnvelope) -> ResponseEnvelope + Send + 'static,
    {
        let mut state = self.shared.lock();
        if let Some(pending) = state.pending.get_mut(&permission) {
            pending.waiters.push_back(Waiter {
                command,
                action: Box::new(on_granted),
            });
            debug!(
                target: GATE_TARGET,
                permission = %permission,
                waiters = pending.waiters.len(),
                "joined pending permission request"
            );
            return Gated::Deferred;
        }
        drop(state);

        if self.authority.is_granted(permission) {
            return Gated::Ready(on_granted(&command));
        }

        let waiter = Waiter {
            command,
            action: Box::new(on_granted),
        };
        let ticket = {
            let mut state = self.shared.lock();
            let ticket = state.next_ticket;
            match state.pending.entry(permission) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().waiters.push_back(waiter);
                    return Gated::Deferred;
                }
                Entry::Vacant(slot) => {
                    slot.insert(PendingPermission {
                        ticket,
                        requested_at: Instant::now(),
                        waiters: VecDeque::from([waiter]),
                    });
                }
            }
            state.next_ticket = ticket.wrapping_add(1);
            ticket
        };

        info!(
            target: GATE_TARGET,
            permission = %permission,
            "asking for permission"
        );
        let responder = PermissionResponder {
            permission,
            ticket,
            gate: Arc::downgrade(&self.shared),
            settled: false,
        };
        self.authority.request(permission, responder);
        Gated::Deferred
    }

    /// Settles every ask older than the timeout as timed out and returns how
    /// many requests expired.
    pub fn expire_pending(&self, now: Instant) -> usize {
        let expired: Vec<(Permission, VecDeque<Waiter>)> = {
            let mut state = self.shared.lock();
            let stale: Vec<Permission> = state
                .pending
                .iter()
                .filter(|(_, pending)| {
                    now.saturating_duration_since(pending.requested_at) >= self.timeout
                })
                .map(|(permission, _)| *permission)
                .collect();
            stale
                .into_iter()
                .filter_map(|permission| {
                    state
                        .pending
                        .remove(&permission)
                        .map(|pending| (permission, pending.waiters))
                })
                .collect()
        };

        let count = expired.len();
        for (permission, waiters) in expired {
            warn!(
                target: GATE_TARGET,
                permission = %permission,
                "permission request timed out"
            );
            self.shared.settle(permission, waiters, Resolution::TimedOut);
        }
        count
    }

    /// Number of commands waiting on `permission`.
    #[must_use]
    pub fn waiting(&self, permission: Permission) -> usize {
        self.shared
            .lock()
            .pending
            .get(&permission)
            .map_or(0, |pending| pending.waiters.len())
    }
}

impl fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionGate")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
