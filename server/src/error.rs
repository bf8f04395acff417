use thiserror::Error;

use synckey_shared::{ClientId, MessageError, TransportError};

/// Errors the host could not answer on the wire. They are queued as
/// `ErrorEvent`s rather than returned, the offending request is simply left
/// for the expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynckeyServerError {
    /// The transport failed to deliver a response
    #[error("Failed to send {message} to client {client_id}: {source}")]
    Transport {
        client_id: ClientId,
        message: &'static str,
        source: TransportError,
    },

    /// A response could not be encoded
    #[error("Failed to encode {message} for client {client_id}: {source}")]
    Encode {
        client_id: ClientId,
        message: &'static str,
        source: MessageError,
    },
}
