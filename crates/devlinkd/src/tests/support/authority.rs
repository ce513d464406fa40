//! Permission authority and response sink doubles.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use devlink_protocol::{Permission, ResponseEnvelope};

use crate::dispatch::{PermissionAuthority, PermissionOutcome, PermissionResponder, ResponseSink};

/// Authority whose asks are answered explicitly by the test.
#[derive(Debug, Default)]
pub struct ScriptedAuthority {
    granted: Mutex<HashSet<Permission>>,
    asked: Mutex<Vec<Permission>>,
    pending: Mutex<VecDeque<PermissionResponder>>,
    answer: Option<PermissionOutcome>,
}

impl ScriptedAuthority {
    /// Authority that answers every ask with `outcome` before returning.
    #[must_use]
    pub fn answering(outcome: PermissionOutcome) -> Self {
        Self {
            answer: Some(outcome),
            ..Self::default()
        }
    }

    /// Marks `permission` granted without an ask.
    pub fn grant_up_front(&self, permission: Permission) {
        self.granted
            .lock()
            .expect("authority mutex poisoned")
            .insert(permission);
    }

    /// Permissions asked for so far, in order.
    #[must_use]
    pub fn asked(&self) -> Vec<Permission> {
        self.asked.lock().expect("authority mutex poisoned").clone()
    }

    /// Answers the oldest outstanding ask. Returns `false` if none is open.
    pub fn resolve_next(&self, outcome: PermissionOutcome) -> bool {
        let responder = self
            .pending
            .lock()
            .expect("authority mutex poisoned")
            .pop_front();
        let Some(responder) = responder else {
            return false;
        };
        if outcome == PermissionOutcome::Granted {
            self.grant_up_front(responder.permission());
        }
        responder.resolve(outcome);
        true
    }

    /// Drops the oldest outstanding responder without answering it.
    pub fn drop_next(&self) -> bool {
        let responder = self
            .pending
            .lock()
            .expect("authority mutex poisoned")
            .pop_front();
        responder.is_some()
    }
}

impl PermissionAuthority for ScriptedAuthority {
    fn is_granted(&self, permission: Permission) -> bool {
        self.granted
            .lock()
            .expect("authority mutex poisoned")
            .contains(&permission)
    }

    fn request(&self, permission: Permission, responder: PermissionResponder) {
        self.asked
            .lock()
            .expect("authority mutex poisoned")
            .push(permission);
        match self.answer {
            Some(outcome) => {
                if outcome == PermissionOutcome::Granted {
                    self.grant_up_front(permission);
                }
                responder.resolve(outcome);
            }
            None => self
                .pending
                .lock()
                .expect("authority mutex poisoned")
                .push_back(responder),
        }
    }
}

/// Sink that keeps every delivered response.
#[derive(Debug, Default)]
pub struct RecordingSink {
    responses: Mutex<Vec<ResponseEnvelope>>,
}

impl RecordingSink {
    /// Responses delivered so far, in order.
    #[must_use]
    pub fn responses(&self) -> Vec<ResponseEnvelope> {
        self.responses.lock().expect("sink mutex poisoned").clone()
    }
}

impl ResponseSink for RecordingSink {
    fn deliver(&self, response: ResponseEnvelope) {
        self.responses
            .lock()
            .expect("sink mutex poisoned")
            .push(response);
    }
}
