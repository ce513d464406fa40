//! Dispatcher wired to fakes, for router and behaviour tests.

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8Path;
use tempfile::TempDir;

use devlink_protocol::CommandEnvelope;

use crate::dispatch::{Dispatcher, PermissionGate, Routed};

use super::{FakeDevice, RecordingSink, ScriptedAuthority};

/// A dispatcher over a [`FakeDevice`] with a sandbox in a temporary
/// directory.
pub struct DispatchHarness {
    pub device: Arc<FakeDevice>,
    pub authority: Arc<ScriptedAuthority>,
    pub sink: Arc<RecordingSink>,
    pub dispatcher: Dispatcher,
    _sandbox: TempDir,
}

impl DispatchHarness {
    #[must_use]
    pub fn new() -> Self {
        let sandbox = TempDir::new().expect("create sandbox directory");
        let root = Utf8Path::from_path(sandbox.path()).expect("sandbox path was not valid UTF-8");
        let device = Arc::new(FakeDevice::default());
        let authority = Arc::new(ScriptedAuthority::default());
        let sink = Arc::new(RecordingSink::default());
        let registry = device
            .capabilities(root)
            .registry()
            .expect("build capability registry");
        let gate = PermissionGate::new(authority.clone(), sink.clone(), Duration::from_secs(60));
        Self {
            device,
            authority,
            sink,
            dispatcher: Dispatcher::new(registry, gate),
            _sandbox: sandbox,
        }
    }

    /// Decodes `frame` and routes it.
    pub fn send(&self, frame: &str) -> Routed {
        let command = CommandEnvelope::decode(frame.as_bytes()).expect("valid command frame");
        self.dispatcher.route(command)
    }
}
