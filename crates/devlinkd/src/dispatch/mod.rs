//! Command dispatch for the device bridge.
//!
//! The controller sends one JSON command per frame:
//!
//! ```json
//! {"id":"42","module":"battery","action":"level","params":{}}
//! ```
//!
//! The dispatcher finds the handler registered for the `module` and
//! `action`, passes permission-guarded commands through the
//! [`PermissionGate`], and produces exactly one response per command:
//!
//! ```json
//! {"id":"42","module":"battery","action":"level","status":"ok","level":87}
//! ```
//!
//! Commands that wait for a permission answer are completed later through
//! the gate's [`ResponseSink`].

mod errors;
mod gate;
pub(crate) mod params;
mod registry;
mod router;
mod sink;

pub use errors::DispatchError;
pub use gate::{Gated, PermissionAuthority, PermissionGate, PermissionOutcome, PermissionResponder};
pub use registry::{CapabilityRegistry, HandlerResult, Registration, RegistryBuilder};
pub use router::{Dispatcher, Routed};
pub use sink::ResponseSink;

pub(crate) use gate::GATE_TARGET;
