use thiserror::Error;

use synckey_shared::{MessageError, NamespaceFilter, TransportError};

/// Why a key request did not produce keys
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// The host has fewer free keys in the namespace than were requested
    #[error("Host rejected the request for {requested} keys in {namespace}: not enough free keys")]
    Exhausted {
        namespace: NamespaceFilter,
        requested: u8,
    },

    /// The confirmation reached the host after the reservation had expired.
    /// The request may be started again from scratch.
    #[error("Reservation of keys in {namespace} expired before the host received the confirmation")]
    ReservationExpired {
        namespace: NamespaceFilter,
    },

    /// The caller cancelled the request before it completed
    #[error("Key request was cancelled")]
    Cancelled,

    /// The client was shut down, or dropped, while the request was pending
    #[error("Key client shut down before the request completed")]
    Disconnected,

    /// An outgoing message could not be encoded
    #[error("Failed to encode allocation message: {0}")]
    Encode(#[from] MessageError),

    /// The transport failed, reported as-is
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
