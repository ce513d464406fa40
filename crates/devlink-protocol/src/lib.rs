//! Wire envelopes exchanged between a remote controller and the device bridge.
//!
//! The controller sends one JSON object per transport frame:
//!
//! ```json
//! {"id":"42","module":"battery","action":"level","params":{}}
//! ```
//!
//! and the bridge answers every command with exactly one response envelope
//! that echoes the correlation id, module and action:
//!
//! ```json
//! {"id":"42","module":"battery","action":"level","status":"ok","level":87}
//! ```
//!
//! Failures replace the success fields with an `error` message. Immediately
//! after a connection opens the bridge also pushes an unsolicited
//! [`Hello`] identification message that carries no `id`.
//!
//! This crate only knows shapes. Routing, permission handling and transport
//! ownership live in `devlinkd`.

mod command;
mod errors;
mod frame;
mod hello;
mod permission;
mod response;

pub use command::{CommandEnvelope, Params};
pub use errors::DecodeError;
pub use frame::{ControlFrame, InboundFrame};
pub use hello::Hello;
pub use permission::{Permission, PermissionParseError};
pub use response::{Payload, RESERVED_FIELDS, ResponseEnvelope, Status};
