//! Out-of-band delivery of responses produced after a deferred permission
//! request resolves.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use devlink_protocol::ResponseEnvelope;

use super::router::DISPATCH_TARGET;

/// Destination for responses that complete outside the inbound call.
pub trait ResponseSink: Send + Sync {
    /// Hands a response to the transport owner.
    fn deliver(&self, response: ResponseEnvelope);
}

impl ResponseSink for UnboundedSender<ResponseEnvelope> {
    fn deliver(&self, response: ResponseEnvelope) {
        if let Err(error) = self.send(response) {
            debug!(
                target: DISPATCH_TARGET,
                id = ?error.0.id(),
                "session gone; dropping deferred response"
            );
        }
    }
}
