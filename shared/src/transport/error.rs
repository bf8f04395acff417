use thiserror::Error;

use crate::ClientId;

/// Errors reported by the message transport. The allocation protocol never
/// translates these, they reach the caller exactly as the transport raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection to the peer is gone
    #[error("Transport is disconnected. The message could not be delivered")]
    Disconnected,

    /// No connection exists for the addressed client
    #[error("Unknown client {client_id}. No connection is registered for this client id")]
    UnknownClient {
        client_id: ClientId,
    },

    /// The transport refused or failed to send the payload
    #[error("Failed to send message: {reason}")]
    SendFailed {
        reason: String,
    },
}
